//! Workflow entry points shared by the binary and the library

pub mod orchestration;

pub use orchestration::{run_retention, RunSummary};
