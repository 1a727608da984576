//! Plain-text rendering of a `Report`

use std::fmt::Write;

use crate::package::Package;
use crate::reconcile::Report;

/// Render the report as sections of sorted items
///
/// Empty sections are left out. `current` is only listed when `all` is set.
pub fn render(report: &Report, all: bool) -> String {
    let mut out = String::new();

    if all {
        print_set(&mut out, "Current packages:", package_lines(&report.current, label));
    }
    print_set(
        &mut out,
        "Outdated package files:",
        package_lines(&report.outdated, |p| p.basename()),
    );
    print_set(
        &mut out,
        "Pending database additions:",
        package_lines(&report.pending, label),
    );
    print_set(&mut out, "Missing package files:", report.missing.clone());
    print_set(
        &mut out,
        "Upstream updates available:",
        package_lines(&report.updates_available, |p| match report.upstream.get(&p.name) {
            Some(upstream) => format!("{} {} -> {}", p.name, p.version, upstream),
            None => label(p),
        }),
    );
    print_set(
        &mut out,
        "Not found upstream:",
        report.not_found_upstream.clone(),
    );

    if out.is_empty() {
        out.push_str("Repository is up to date.\n");
    }
    out
}

fn label(p: &Package) -> String {
    format!("{} {}", p.name, p.version)
}

fn package_lines(packages: &[Package], f: impl Fn(&Package) -> String) -> Vec<String> {
    packages.iter().map(f).collect()
}

fn print_set(out: &mut String, header: &str, mut items: Vec<String>) {
    if items.is_empty() {
        return;
    }
    items.sort();
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{}", header);
    for item in items {
        let _ = writeln!(out, "  {}", item);
    }
}
