//! Shared test utilities for the tasksync workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each grow their own. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`records`]: task record builders pinned to a fixed creation time
//! - [`vault`]: [`TestVault`] temporary directory holding a note, a task
//!   file, a state directory and a config file

pub mod records;
pub mod vault;

pub use records::{child_of, fixed_time, records_json, tagged, task};
pub use vault::TestVault;
