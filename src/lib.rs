//! Reconcile a pacman package repository across its three sources of truth:
//! the package files in the repository directory, the repository database,
//! and upstream version metadata from the AUR.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌───────────────┐
//! │PackageScanner│   │ DatabaseReader │   │ RemoteFetcher │
//! │ (directory)  │   │ (repo.db.tar)  │   │    (AUR)      │
//! └──────┬───────┘   └───────┬────────┘   └───────┬───────┘
//!        │                   │                    │
//!        └─────────┬─────────┴────────────────────┘
//!                  ▼
//!           ┌─────────────┐     ┌──────────┐
//!           │ Reconciler  │────▶│  Report  │
//!           │  (filter)   │     └──────────┘
//!           └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`package`]: package model, version ordering, file name grammar
//! - [`local`]: directory scanning and database reading
//! - [`remote`]: upstream lookups and bounded-concurrency fetching
//! - [`reconcile`]: set comparisons, orchestration, and the report
//! - [`config`]: TOML configuration
//! - [`logging`]: tracing subscriber setup for the binary
//! - [`output`]: plain-text report rendering
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod local;
pub mod logging;
pub mod output;
pub mod package;
pub mod reconcile;
pub mod remote;
