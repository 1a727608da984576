//! Local repository state: the package directory and the repository database
//!
//! Both are read synchronously.

pub mod database;
pub mod lister;
pub mod scanner;

pub use database::{DatabaseContents, DatabaseEntry, DatabaseReader, DatabaseSource, PacmanDatabase};
pub use lister::{DirLister, FileLister};
pub use scanner::{PackageGroup, PackageScanner, ScanResult, ScanWarning};
