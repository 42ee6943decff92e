//! OmniForge - phased project bootstrap runner.
//!
//! OmniForge executes an ordered catalog of shell scripts grouped into
//! numbered phases. Each phase declares its scripts, the commands it needs
//! on `PATH`, and how it reacts to failures. Successful scripts are recorded
//! so an interrupted bootstrap resumes where it stopped.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, merging, and validation
//! - [`error`] - Error types and result aliases
//! - [`registry`] - Phase catalog built from configuration
//! - [`requirements`] - Dependency checks against `PATH`
//! - [`runner`] - Phase orchestration and run reporting
//! - [`shell`] - Process execution with timeouts
//! - [`state`] - Persistent per-script execution state
//! - [`steps`] - Script execution and results
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use omniforge::registry::PhaseRegistry;
//!
//! let mapping: serde_yaml::Mapping = serde_yaml::from_str(
//!     "1: { name: database, scripts: [db.sh] }\n0: { name: base, scripts: [init.sh] }",
//! )
//! .unwrap();
//! let registry = PhaseRegistry::from_mapping(&mapping, 600);
//! assert_eq!(registry.discover(), vec![0, 1]);
//! assert_eq!(registry.scripts(1), ["db.sh"]);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod requirements;
pub mod runner;
pub mod shell;
pub mod state;
pub mod steps;
pub mod ui;

pub use error::{OmniforgeError, Result};
