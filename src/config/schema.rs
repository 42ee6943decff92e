//! Configuration schema definitions for OmniForge.
//!
//! This module contains the struct definitions that map to the
//! `.omniforge/config.yml` file format. Global settings are strictly
//! typed; the `phases` catalog is kept as raw YAML and read leniently by
//! the [`registry`](crate::registry) so a malformed phase field falls back
//! to its default instead of failing the whole load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Root configuration structure for `config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Application name (for display purposes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Global settings
    pub settings: Settings,

    /// Phase catalog keyed by integer id
    #[serde(default)]
    pub phases: serde_yaml::Mapping,
}

/// Global settings that apply to every phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory that script keys are resolved against (relative to project root)
    pub scripts_dir: PathBuf,

    /// State file path (relative to project root)
    pub state_file: PathBuf,

    /// Directory for run-scoped script logs; output is inherited when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// What to do when a script fails
    pub policy: ExecutionPolicy,

    /// Whether previously successful scripts are skipped
    pub resume: ResumeMode,

    /// Program used to run each script
    pub interpreter: String,

    /// Timeout for phases that do not set one
    pub default_timeout: u64,

    /// Whether dry runs write `success` entries to the state store
    pub dry_run_records_state: bool,

    /// Environment variables exported to every script
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("scripts"),
            state_file: PathBuf::from(".omniforge").join("state.jsonl"),
            log_dir: None,
            policy: ExecutionPolicy::default(),
            resume: ResumeMode::default(),
            interpreter: "bash".to_string(),
            default_timeout: DEFAULT_TIMEOUT_SECS,
            dry_run_records_state: true,
            env: HashMap::new(),
        }
    }
}

/// Timeout applied when neither the phase nor the settings name one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Run-wide failure policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPolicy {
    /// Abort the run at the first failure.
    #[default]
    #[serde(alias = "fail-fast")]
    FailFast,
    /// Attempt every enabled phase and report all failures at the end.
    Continue,
}

impl ExecutionPolicy {
    /// Whether a failure should stop the run.
    pub fn stops_on_failure(&self) -> bool {
        matches!(self, Self::FailFast)
    }
}

impl FromStr for ExecutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail-fast" | "fail_fast" | "failfast" => Ok(Self::FailFast),
            "continue" => Ok(Self::Continue),
            _ => Err(format!(
                "unknown policy: {} (expected fail-fast or continue)",
                s
            )),
        }
    }
}

impl fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::Continue => write!(f, "continue"),
        }
    }
}

/// How recorded state affects script selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeMode {
    /// Skip scripts whose latest entry is `success`.
    #[default]
    Skip,
    /// Ignore recorded state and run everything.
    Rerun,
}
