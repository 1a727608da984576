//! Upstream version metadata
//!
//! # Modules
//!
//! - [`lookup`]: `RemoteLookup` trait for resolving one name upstream
//! - [`aur`]: AUR RPC implementation of `RemoteLookup`
//! - [`fetcher`]: bounded-concurrency fan-out over many names

pub mod aur;
pub mod fetcher;
pub mod lookup;

pub use aur::AurClient;
pub use fetcher::{FetchFailure, FetchOutcome, RemoteFetcher};
pub use lookup::RemoteLookup;
