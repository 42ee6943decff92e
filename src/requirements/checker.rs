//! Dependency checker for phase prerequisites.
//!
//! The `DependencyChecker` resolves each declared command on `PATH`,
//! caching results within a run so a command shared by several phases is
//! only looked up once.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::{OmniforgeError, Result};
use crate::registry::{DependencySpec, PhaseId, PrereqMode};

use super::path::{parse_system_path, resolve_tool_path};

/// Outcome of checking one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyStatus {
    /// Marked `builtin`; no lookup performed.
    Builtin,
    /// Resolved on `PATH`.
    Found(PathBuf),
    /// Not resolvable on `PATH`.
    Missing,
}

impl DependencyStatus {
    pub fn is_satisfied(&self) -> bool {
        !matches!(self, DependencyStatus::Missing)
    }
}

/// One checked dependency.
#[derive(Debug, Clone)]
pub struct DependencyResult {
    pub spec: DependencySpec,
    pub status: DependencyStatus,
}

/// All dependency results for a phase.
#[derive(Debug, Clone)]
pub struct DependencyReport {
    /// Mode actually applied (dry runs downgrade strict to warn).
    pub mode: PrereqMode,
    pub results: Vec<DependencyResult>,
}

impl DependencyReport {
    pub fn all_satisfied(&self) -> bool {
        self.results.iter().all(|r| r.status.is_satisfied())
    }

    pub fn missing(&self) -> impl Iterator<Item = &DependencyResult> {
        self.results.iter().filter(|r| !r.status.is_satisfied())
    }

    /// Comma-separated names of missing commands.
    pub fn missing_commands(&self) -> String {
        self.missing()
            .map(|r| r.spec.command.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Checks whether phase dependencies are available.
#[derive(Debug, Clone)]
pub struct DependencyChecker {
    path_entries: Vec<PathBuf>,
    cache: HashMap<String, DependencyStatus>,
}

impl DependencyChecker {
    /// Create a checker that searches the given directories.
    pub fn new(path_entries: Vec<PathBuf>) -> Self {
        Self {
            path_entries,
            cache: HashMap::new(),
        }
    }

    /// Create a checker over the process `PATH`.
    pub fn from_system_path() -> Self {
        Self::new(parse_system_path())
    }

    /// Check a single dependency, using the cache when available.
    pub fn check_one(&mut self, spec: &DependencySpec) -> DependencyStatus {
        if spec.is_builtin() {
            return DependencyStatus::Builtin;
        }
        if let Some(cached) = self.cache.get(&spec.command) {
            return cached.clone();
        }

        let status = match resolve_tool_path(&spec.command, &self.path_entries) {
            Some(path) => DependencyStatus::Found(path),
            None => DependencyStatus::Missing,
        };
        self.cache.insert(spec.command.clone(), status.clone());
        status
    }

    /// Check every dependency of a phase.
    ///
    /// Logs one line per dependency. In dry-run mode strict checks are
    /// downgraded to warnings so previews never abort on missing tooling.
    ///
    /// # Errors
    ///
    /// Returns `MissingDependency` when the effective mode is strict and at
    /// least one command is missing.
    pub fn check(
        &mut self,
        phase: PhaseId,
        specs: &[DependencySpec],
        mode: PrereqMode,
        dry_run: bool,
    ) -> Result<DependencyReport> {
        let mode = if dry_run { PrereqMode::Warn } else { mode };

        let results: Vec<_> = specs
            .iter()
            .map(|spec| {
                let status = self.check_one(spec);
                match &status {
                    DependencyStatus::Builtin => {
                        info!("Phase {}: {} (builtin)", phase, spec.command)
                    }
                    DependencyStatus::Found(path) => {
                        info!("Phase {}: {} found at {}", phase, spec.command, path.display())
                    }
                    DependencyStatus::Missing if spec.hint.is_empty() => {
                        warn!("Phase {}: {} is missing", phase, spec.command)
                    }
                    DependencyStatus::Missing => {
                        warn!("Phase {}: {} is missing ({})", phase, spec.command, spec.hint)
                    }
                }
                DependencyResult {
                    spec: spec.clone(),
                    status,
                }
            })
            .collect();

        let report = DependencyReport { mode, results };

        if mode == PrereqMode::Strict && !report.all_satisfied() {
            return Err(OmniforgeError::MissingDependency {
                phase,
                commands: report.missing_commands(),
            });
        }

        Ok(report)
    }
}
