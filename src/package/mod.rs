//! Package model shared by every source
//!
//! # Modules
//!
//! - [`version`]: `(epoch, pkgver, pkgrel)` versions and their total order
//! - [`types`]: `Package` and `RemoteRecord`
//! - [`filename`]: package file name grammar

pub mod filename;
pub mod types;
pub mod version;

pub use types::{Package, RemoteRecord};
pub use version::Version;
