//! Orchestrates scanning, database reading, and upstream fetching into a report

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::ReconcileError;
use crate::local::{DatabaseReader, DatabaseSource, FileLister, PackageScanner};
use crate::package::Package;
use crate::reconcile::filter;
use crate::reconcile::report::Report;
use crate::remote::fetcher::{DEFAULT_PARALLELISM, DEFAULT_TIMEOUT};
use crate::remote::{FetchOutcome, RemoteFetcher, RemoteLookup};

/// Settings for one `Reconciler`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Maximum number of concurrent upstream lookups
    pub parallelism: usize,
    /// Timeout for each upstream lookup
    pub timeout: Duration,
    /// Names excluded from pending and update computation
    pub ignore: BTreeSet<String>,
    /// Skip the upstream fetch phase entirely when false
    pub check_upstream: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            timeout: DEFAULT_TIMEOUT,
            ignore: BTreeSet::new(),
            check_upstream: true,
        }
    }
}

pub struct Reconciler {
    config: ReconcileConfig,
    scanner: PackageScanner,
    database: DatabaseReader,
    fetcher: RemoteFetcher,
}

impl Reconciler {
    pub fn new(
        config: ReconcileConfig,
        lister: Arc<dyn FileLister>,
        source: Arc<dyn DatabaseSource>,
        lookup: Arc<dyn RemoteLookup>,
    ) -> Self {
        let fetcher = RemoteFetcher::new(lookup, config.parallelism, config.timeout);
        Self {
            config,
            scanner: PackageScanner::new(lister),
            database: DatabaseReader::new(source),
            fetcher,
        }
    }

    /// Reconcile the package directory `repo_dir` against the database at `db_path`
    ///
    /// Upstream is queried for `names` if given, otherwise for every current
    /// local package. Ignored names are never queried.
    pub async fn reconcile(
        &self,
        repo_dir: &Path,
        db_path: &Path,
        names: Option<&[String]>,
    ) -> Result<Report, ReconcileError> {
        let scan = self.scanner.scan(repo_dir)?;
        let db = self.database.read(db_path)?;
        debug!(
            "Local state: {} current, {} outdated, {} database entries",
            scan.current.len(),
            scan.outdated.len(),
            db.entries.len()
        );

        let considered: Vec<Package> = scan
            .current
            .iter()
            .filter(|p| !self.config.ignore.contains(&p.name))
            .cloned()
            .collect();

        let pending = filter::pending(&considered, &db.entries);
        let missing = filter::missing(&db.entries);

        let outcome = if self.config.check_upstream {
            let wanted: Vec<String> = match names {
                Some(names) => names.to_vec(),
                None => considered.iter().map(|p| p.name.clone()).collect(),
            };
            let wanted: Vec<String> = wanted
                .into_iter()
                .filter(|name| !self.config.ignore.contains(name))
                .collect();
            self.fetcher.fetch(wanted).await
        } else {
            debug!("Upstream check disabled");
            FetchOutcome::default()
        };

        let updates_available = filter::updates_available(&considered, &outcome.records);
        let upstream = updates_available
            .iter()
            .filter_map(|p| {
                let record = outcome.records.get(&p.name)?;
                Some((p.name.clone(), record.version.clone()?))
            })
            .collect();

        let mut not_found_upstream: Vec<String> = outcome
            .records
            .values()
            .filter(|record| !record.is_found())
            .map(|record| record.name.clone())
            .collect();
        not_found_upstream.sort();

        let mut fetch_errors = outcome.failures;
        fetch_errors.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Report {
            current: scan.current,
            outdated: scan.outdated,
            pending,
            missing,
            updates_available,
            upstream,
            not_found_upstream,
            fetch_errors,
            warnings: scan.warnings,
        })
    }
}
