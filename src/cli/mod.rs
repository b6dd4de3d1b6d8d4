//! Command-line interface for annotarff.

mod commands;
pub mod helpers;

pub use commands::{is_verbose, run, Cli};
