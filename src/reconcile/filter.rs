//! Set comparisons between package collections
//!
//! Output order follows the input order; sorting is left to the caller.

use std::collections::HashMap;

use crate::local::DatabaseEntry;
use crate::package::{Package, RemoteRecord};

/// Local packages not yet in the database, or newer than the database entry
pub fn pending(local: &[Package], db: &HashMap<String, DatabaseEntry>) -> Vec<Package> {
    local
        .iter()
        .filter(|p| match db.get(&p.name) {
            Some(entry) => entry.package.older_than(p),
            None => true,
        })
        .cloned()
        .collect()
}

/// Local packages for which upstream has a strictly newer version
///
/// Names that were not found upstream, or not fetched at all, never qualify.
pub fn updates_available(
    local: &[Package],
    remote: &HashMap<String, RemoteRecord>,
) -> Vec<Package> {
    local
        .iter()
        .filter(|p| {
            remote
                .get(&p.name)
                .and_then(|record| record.version.as_ref())
                .is_some_and(|upstream| upstream.newer_than(&p.version))
        })
        .cloned()
        .collect()
}

/// Names of database entries whose backing file is absent, sorted
pub fn missing(db: &HashMap<String, DatabaseEntry>) -> Vec<String> {
    let mut names: Vec<String> = db
        .values()
        .filter(|entry| !entry.file_exists)
        .map(|entry| entry.package.name.clone())
        .collect();
    names.sort();
    names
}
