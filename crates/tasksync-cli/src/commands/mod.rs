//! Command implementations for tasksync-cli

pub mod add;
pub mod sync;

pub use add::run_add;
pub use sync::{run_cycle, run_show};
