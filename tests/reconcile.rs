//! End-to-end reconciliation over real directories and databases

mod helper;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use helper::{Reply, ScriptedLookup, TestRepo};
use repodiff::error::{FetchError, ReconcileError};
use repodiff::local::{DirLister, PacmanDatabase, ScanWarning};
use repodiff::package::Version;
use repodiff::reconcile::{ReconcileConfig, Reconciler, Report};

fn reconciler(config: ReconcileConfig, lookup: ScriptedLookup) -> Reconciler {
    Reconciler::new(
        config,
        Arc::new(DirLister),
        Arc::new(PacmanDatabase),
        Arc::new(lookup),
    )
}

async fn run(repo: &TestRepo, config: ReconcileConfig, lookup: ScriptedLookup) -> Report {
    reconciler(config, lookup)
        .reconcile(repo.dir(), &repo.db_path(), None)
        .await
        .unwrap()
}

fn labels(packages: &[repodiff::package::Package]) -> Vec<String> {
    packages
        .iter()
        .map(|p| format!("{} {}", p.name, p.version))
        .collect()
}

#[tokio::test]
async fn outdated_file_and_pending_newer_version() {
    let repo = TestRepo::new()
        .with_file("foo-1.0-1-x86_64.pkg.tar.zst")
        .with_file("foo-1.1-1-x86_64.pkg.tar.zst")
        .with_record("foo", "1.0-1", "foo-1.0-1-x86_64.pkg.tar.zst")
        .build();

    let report = run(&repo, ReconcileConfig::default(), ScriptedLookup::new()).await;

    assert_eq!(labels(&report.current), vec!["foo 1.1-1"]);
    assert_eq!(labels(&report.outdated), vec!["foo 1.0-1"]);
    assert_eq!(labels(&report.pending), vec!["foo 1.1-1"]);
    assert!(report.missing.is_empty());
}

#[tokio::test]
async fn database_entry_without_file_is_missing() {
    let repo = TestRepo::new()
        .with_record("bar", "2.0-1", "bar-2.0-1-x86_64.pkg.tar.zst")
        .build();

    let report = run(&repo, ReconcileConfig::default(), ScriptedLookup::new()).await;

    assert_eq!(report.missing, vec!["bar".to_string()]);
    assert!(report.current.is_empty());
}

#[tokio::test]
async fn newer_upstream_version_is_an_update() {
    let repo = TestRepo::new()
        .with_file("baz-2.5-1-any.pkg.tar.zst")
        .with_record("baz", "2.5-1", "baz-2.5-1-any.pkg.tar.zst")
        .build();
    let lookup = ScriptedLookup::new().with_reply("baz", Reply::Found("3.0-1"));

    let report = run(&repo, ReconcileConfig::default(), lookup).await;

    assert_eq!(labels(&report.updates_available), vec!["baz 2.5-1"]);
    assert_eq!(
        report.upstream.get("baz"),
        Some(&Version::parse("3.0-1").unwrap())
    );
    assert!(report.pending.is_empty());
    assert!(!report.is_clean());
}

#[tokio::test]
async fn timed_out_lookup_is_a_fetch_error_not_an_update() {
    let repo = TestRepo::new()
        .with_file("qux-1.0-1-any.pkg.tar.zst")
        .with_file("baz-2.5-1-any.pkg.tar.zst")
        .build();
    let lookup = ScriptedLookup::new()
        .with_reply("qux", Reply::Hang)
        .with_reply("baz", Reply::Found("3.0-1"));
    let config = ReconcileConfig {
        timeout: Duration::from_millis(100),
        ..Default::default()
    };

    let report = run(&repo, config, lookup).await;

    assert_eq!(report.fetch_errors.len(), 1);
    assert_eq!(report.fetch_errors[0].name, "qux");
    assert!(matches!(report.fetch_errors[0].error, FetchError::Timeout(_)));
    assert_eq!(labels(&report.updates_available), vec!["baz 2.5-1"]);
    assert!(report.not_found_upstream.is_empty());
}

#[tokio::test]
async fn not_found_upstream_is_reported_separately_from_errors() {
    let repo = TestRepo::new()
        .with_file("local-1.0-1-any.pkg.tar.zst")
        .with_file("broken-1.0-1-any.pkg.tar.zst")
        .build();
    let lookup = ScriptedLookup::new()
        .with_reply("local", Reply::NotFound)
        .with_reply("broken", Reply::Fail("service unavailable"));

    let report = run(&repo, ReconcileConfig::default(), lookup).await;

    assert_eq!(report.not_found_upstream, vec!["local".to_string()]);
    assert_eq!(report.fetch_errors.len(), 1);
    assert_eq!(report.fetch_errors[0].name, "broken");
    assert!(report.updates_available.is_empty());
}

#[tokio::test]
async fn ignored_packages_are_neither_pending_nor_queried() {
    let repo = TestRepo::new()
        .with_file("foo-1.1-1-any.pkg.tar.zst")
        .with_file("bar-1.0-1-any.pkg.tar.zst")
        .build();
    let lookup = Arc::new(
        ScriptedLookup::new()
            .with_reply("foo", Reply::Found("9.0-1"))
            .with_reply("bar", Reply::Found("9.0-1")),
    );
    let config = ReconcileConfig {
        ignore: BTreeSet::from(["foo".to_string()]),
        ..Default::default()
    };
    let reconciler = Reconciler::new(
        config,
        Arc::new(DirLister),
        Arc::new(PacmanDatabase),
        lookup.clone(),
    );

    let report = reconciler
        .reconcile(repo.dir(), &repo.db_path(), None)
        .await
        .unwrap();

    assert_eq!(labels(&report.current), vec!["bar 1.0-1", "foo 1.1-1"]);
    assert_eq!(labels(&report.pending), vec!["bar 1.0-1"]);
    assert_eq!(labels(&report.updates_available), vec!["bar 1.0-1"]);
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn caller_supplied_names_limit_upstream_queries() {
    let repo = TestRepo::new()
        .with_file("foo-1.0-1-any.pkg.tar.zst")
        .with_file("bar-1.0-1-any.pkg.tar.zst")
        .build();
    let lookup = Arc::new(
        ScriptedLookup::new()
            .with_reply("foo", Reply::Found("2.0-1"))
            .with_reply("bar", Reply::Found("2.0-1")),
    );
    let reconciler = Reconciler::new(
        ReconcileConfig::default(),
        Arc::new(DirLister),
        Arc::new(PacmanDatabase),
        lookup.clone(),
    );

    let names = vec!["foo".to_string()];
    let report = reconciler
        .reconcile(repo.dir(), &repo.db_path(), Some(&names))
        .await
        .unwrap();

    assert_eq!(labels(&report.updates_available), vec!["foo 1.0-1"]);
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn disabled_upstream_skips_fetch_phase() {
    let repo = TestRepo::new().with_file("foo-1.0-1-any.pkg.tar.zst").build();
    let lookup = Arc::new(ScriptedLookup::new().with_reply("foo", Reply::Found("2.0-1")));
    let config = ReconcileConfig {
        check_upstream: false,
        ..Default::default()
    };
    let reconciler = Reconciler::new(
        config,
        Arc::new(DirLister),
        Arc::new(PacmanDatabase),
        lookup.clone(),
    );

    let report = reconciler
        .reconcile(repo.dir(), &repo.db_path(), None)
        .await
        .unwrap();

    assert!(report.updates_available.is_empty());
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn duplicate_versions_pick_smallest_filename_and_warn() {
    let repo = TestRepo::new()
        .with_file("foo-1.0-1-x86_64.pkg.tar.zst")
        .with_file("foo-1.0-1-any.pkg.tar.xz")
        .with_file("not-a-package.pkg.tar.zst")
        .build();

    for _ in 0..3 {
        let report = run(&repo, ReconcileConfig::default(), ScriptedLookup::new()).await;

        assert_eq!(report.current.len(), 1);
        assert_eq!(report.current[0].basename(), "foo-1.0-1-any.pkg.tar.xz");
        assert_eq!(report.outdated.len(), 1);
        assert_eq!(report.outdated[0].basename(), "foo-1.0-1-x86_64.pkg.tar.zst");
        assert_eq!(report.warnings.len(), 2);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| matches!(w, ScanWarning::DuplicateVersion { name, .. } if name == "foo"))
        );
        assert!(
            report
                .warnings
                .iter()
                .any(|w| matches!(w, ScanWarning::UnparsableFilename { .. }))
        );
    }
}

#[tokio::test]
async fn corrupt_database_aborts_the_run() {
    let repo = TestRepo::new().with_file("foo-1.0-1-any.pkg.tar.zst");
    std::fs::write(repo.db_path(), b"this is not a tar archive at all").unwrap();

    let result = reconciler(ReconcileConfig::default(), ScriptedLookup::new())
        .reconcile(repo.dir(), &repo.db_path(), None)
        .await;

    assert!(matches!(result, Err(ReconcileError::Database(_))));
}

#[tokio::test]
async fn unreadable_directory_aborts_the_run() {
    let repo = TestRepo::new().build();

    let result = reconciler(ReconcileConfig::default(), ScriptedLookup::new())
        .reconcile(&repo.dir().join("missing"), &repo.db_path(), None)
        .await;

    assert!(matches!(result, Err(ReconcileError::Scan(_))));
}

#[tokio::test]
async fn report_serializes_to_json() {
    let repo = TestRepo::new()
        .with_file("baz-2.5-1-any.pkg.tar.zst")
        .build();
    let lookup = ScriptedLookup::new().with_reply("baz", Reply::Found("1:3.0-1"));

    let report = run(&repo, ReconcileConfig::default(), lookup).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["updates_available"][0]["name"], "baz");
    assert_eq!(json["updates_available"][0]["version"], "2.5-1");
    assert_eq!(json["upstream"]["baz"], "1:3.0-1");
}

#[tokio::test]
async fn empty_database_file_aborts_the_run() {
    let repo = TestRepo::new().with_file("foo-1.0-1-any.pkg.tar.zst");
    std::fs::write(repo.db_path(), b"").unwrap();

    let result = reconciler(ReconcileConfig::default(), ScriptedLookup::new())
        .reconcile(repo.dir(), &repo.db_path(), None)
        .await;

    assert!(matches!(result, Err(ReconcileError::Database(_))));
}
