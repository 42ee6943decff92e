//! Script execution.
//!
//! - [`ScriptRunner`] - the seam the orchestrator drives
//! - [`ScriptExecutor`] - spawns scripts through an interpreter
//! - [`ScriptOutcome`] - exit code and duration after retries
//! - [`ScriptResult`] / [`ScriptState`] - what a run records per script
//!
//! # Example
//!
//! ```no_run
//! use omniforge::steps::{ScriptExecutor, ScriptRunner};
//! use std::collections::HashMap;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let mut executor = ScriptExecutor::new("bash", ".");
//! let outcome = executor
//!     .run(Path::new("scripts/setup.sh"), Duration::from_secs(600), 0, &HashMap::new())
//!     .unwrap();
//!
//! if !outcome.success() {
//!     eprintln!("setup.sh exited with {}", outcome.exit_code);
//! }
//! ```

pub mod executor;

pub use executor::{ScriptExecutor, ScriptOutcome, ScriptResult, ScriptRunner, ScriptState};
