//! Reconciliation report

use std::collections::BTreeMap;

use serde::Serialize;

use crate::local::ScanWarning;
use crate::package::{Package, Version};
use crate::remote::FetchFailure;

/// Snapshot of the repository's drift across directory, database, and upstream
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Newest local file per package name
    pub current: Vec<Package>,
    /// Older local files shadowed by a current one
    pub outdated: Vec<Package>,
    /// Current packages the database lacks or holds at an older version
    pub pending: Vec<Package>,
    /// Database entries whose file is gone
    pub missing: Vec<String>,
    /// Current packages with a newer upstream version
    pub updates_available: Vec<Package>,
    /// Upstream version for each entry of `updates_available`
    pub upstream: BTreeMap<String, Version>,
    /// Names the upstream service does not know
    pub not_found_upstream: Vec<String>,
    pub fetch_errors: Vec<FetchFailure>,
    pub warnings: Vec<ScanWarning>,
}

impl Report {
    /// True if the directory, database, and upstream all agree
    pub fn is_clean(&self) -> bool {
        self.outdated.is_empty()
            && self.pending.is_empty()
            && self.missing.is_empty()
            && self.updates_available.is_empty()
    }

    /// One human-readable line per recoverable problem
    pub fn warning_lines(&self) -> Vec<String> {
        self.warnings
            .iter()
            .map(ToString::to_string)
            .chain(self.fetch_errors.iter().map(ToString::to_string))
            .collect()
    }
}
