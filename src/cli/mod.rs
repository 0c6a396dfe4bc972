//! Command line interface
//!
//! Argument parsing, routing and the `show`, `eval` and `validate` handlers.

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;
