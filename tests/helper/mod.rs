//! Shared test utilities

#![allow(dead_code)]

mod lookup;
mod repo;

pub use lookup::{Reply, ScriptedLookup};
pub use repo::TestRepo;
