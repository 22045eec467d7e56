//! User interface module - terminal output for the retention run.

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_rules, display_status, display_success, display_summary,
    format_outcome, format_rules, format_selection,
};
