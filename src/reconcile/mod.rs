//! Reconciliation of local and upstream package state
//!
//! # Modules
//!
//! - [`filter`]: pure set comparisons (pending, updates, missing)
//! - [`reconciler`]: sequencing of scan, database read, and upstream fetch
//! - [`report`]: the resulting `Report`

pub mod filter;
pub mod reconciler;
pub mod report;

pub use reconciler::{ReconcileConfig, Reconciler};
pub use report::Report;
