//! Dependency checking for phase prerequisites.
//!
//! Each phase declares the commands it needs. The checker resolves them
//! on `PATH` and applies the phase's strict/warn mode.
//!
//! # Modules
//!
//! - [`checker`] - Per-phase dependency evaluation
//! - [`path`] - `PATH` parsing and executable lookup

pub mod checker;
pub mod path;

pub use checker::{DependencyChecker, DependencyReport, DependencyResult, DependencyStatus};
pub use path::{is_executable, parse_system_path, resolve_tool_path};
