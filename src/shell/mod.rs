//! Child process execution.

pub mod command;

pub use command::{execute, CommandOptions, CommandResult, OutputTarget, TIMEOUT_EXIT_CODE};
