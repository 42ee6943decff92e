//! Error types for OmniForge operations.
//!
//! This module defines [`OmniforgeError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `OmniforgeError` for conditions callers need to tell apart
//! - Script and dependency outcomes that only affect the run verdict are
//!   recorded in the [`ExecutionRun`](crate::runner::ExecutionRun), not raised

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for OmniForge operations.
#[derive(Debug, Error)]
pub enum OmniforgeError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Requested phase id is not part of the discovered catalog.
    #[error("Unknown phase: {id}")]
    UnknownPhase { id: u32 },

    /// A strict prerequisite command is not available.
    #[error("Phase {phase} is missing required commands: {commands}")]
    MissingDependency { phase: u32, commands: String },

    /// A cataloged script has no backing file.
    #[error("Script not found: {key} (expected at {path})")]
    ScriptNotFound { key: String, path: PathBuf },

    /// A script exited non-zero, timed out, or could not be spawned.
    #[error("Script '{key}' failed: {message}")]
    ScriptExecutionFailure { key: String, message: String },

    /// Another process holds the state lock.
    #[error("State file is locked by another run: {path}")]
    StateLocked { path: PathBuf },

    /// A write was attempted on a read-only state snapshot.
    #[error("State store opened read-only: {path}")]
    StateReadOnly { path: PathBuf },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for OmniForge operations.
pub type Result<T> = std::result::Result<T, OmniforgeError>;
