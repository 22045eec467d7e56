pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod exceptions;
pub mod executor;
pub mod logging;
pub mod registry;
pub mod rules;
pub mod ui;
pub mod warnings;
pub mod window;

pub use error::{RetentionError, Result};
