//! Per-invocation execution record.
//!
//! An [`ExecutionRun`] is built up from [`RunEvent`]s as the orchestrator
//! works and is handed back to the caller. It is never persisted; the state
//! store is what survives between runs.

use std::time::{Duration, Instant};

use crate::config::ExecutionPolicy;
use crate::registry::PhaseId;
use crate::steps::{ScriptResult, ScriptState};

/// Whether scripts are actually spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Live,
    DryRun,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, RunMode::DryRun)
    }
}

/// Lifecycle of a phase within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    /// `enabled: false`; treated as trivially successful.
    Disabled,
    Running,
    Completed,
    CompletedWithErrors,
}

impl PhaseStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, PhaseStatus::CompletedWithErrors)
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PhaseStatus::Disabled => "disabled",
            PhaseStatus::Running => "running",
            PhaseStatus::Completed => "completed",
            PhaseStatus::CompletedWithErrors => "completed with errors",
        };
        write!(f, "{}", s)
    }
}

/// Progress events emitted while phases execute.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A phase is about to run its dependency check and scripts.
    PhaseStarting {
        id: PhaseId,
        name: String,
        scripts: usize,
    },
    /// A phase was skipped because it is disabled.
    PhaseDisabled { id: PhaseId, name: String },
    /// Dependencies were missing but the phase runs anyway (warn mode).
    DependencyWarning { phase: PhaseId, message: String },
    /// A strict dependency check failed; no scripts ran.
    PhaseBlocked { id: PhaseId, message: String },
    /// A script is about to be spawned.
    ScriptStarting { phase: PhaseId, key: String },
    /// A script finished (success or failure).
    ScriptFinished { phase: PhaseId, result: ScriptResult },
    /// A script was skipped because it already succeeded.
    ScriptSkipped { phase: PhaseId, key: String },
    /// All scripts of a phase were processed.
    PhaseFinished { id: PhaseId, status: PhaseStatus },
    /// Fail-fast stopped the run.
    Aborted { phase: PhaseId, key: Option<String> },
}

/// Counters for one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTally {
    pub id: PhaseId,
    pub name: String,
    pub ok: usize,
    pub fail: usize,
    pub skip: usize,
    pub status: PhaseStatus,
}

impl PhaseTally {
    fn new(id: PhaseId, name: String, status: PhaseStatus) -> Self {
        Self {
            id,
            name,
            ok: 0,
            fail: 0,
            skip: 0,
            status,
        }
    }
}

/// A failed script with the phase it belongs to.
#[derive(Debug, Clone)]
pub struct FailedScript {
    pub phase: PhaseId,
    pub result: ScriptResult,
}

/// Error line recorded for a failed script.
pub fn script_error(phase: PhaseId, result: &ScriptResult) -> String {
    let error = result.error.as_deref().unwrap_or("unknown error");
    format!("Phase {}: {}: {}", phase, result.key, error)
}

/// Ephemeral record of one invocation.
#[derive(Debug)]
pub struct ExecutionRun {
    mode: RunMode,
    policy: ExecutionPolicy,
    started: Instant,
    duration: Option<Duration>,
    phases: Vec<PhaseTally>,
    scripts: Vec<(PhaseId, ScriptResult)>,
    errors: Vec<String>,
    warnings: Vec<String>,
    aborted: bool,
}

/// Computed view of a run for reporting.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: RunMode,
    pub policy: ExecutionPolicy,
    pub duration: Duration,
    pub per_phase: Vec<PhaseTally>,
    pub failed_scripts: Vec<FailedScript>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: bool,
    pub success: bool,
}

impl ExecutionRun {
    pub fn new(mode: RunMode, policy: ExecutionPolicy) -> Self {
        Self {
            mode,
            policy,
            started: Instant::now(),
            duration: None,
            phases: Vec::new(),
            scripts: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            aborted: false,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn policy(&self) -> ExecutionPolicy {
        self.policy
    }

    /// Fold an event into the counters.
    pub fn record(&mut self, event: RunEvent) {
        match event {
            RunEvent::PhaseStarting { id, name, .. } => {
                self.phases
                    .push(PhaseTally::new(id, name, PhaseStatus::Running));
            }
            RunEvent::PhaseDisabled { id, name } => {
                self.phases
                    .push(PhaseTally::new(id, name, PhaseStatus::Disabled));
            }
            RunEvent::DependencyWarning { message, .. } => {
                self.warnings.push(message);
            }
            RunEvent::PhaseBlocked { id, message } => {
                self.errors.push(message);
                if let Some(tally) = self.tally_mut(id) {
                    tally.status = PhaseStatus::CompletedWithErrors;
                }
            }
            RunEvent::ScriptStarting { .. } => {}
            RunEvent::ScriptSkipped { phase, key } => {
                if let Some(tally) = self.tally_mut(phase) {
                    tally.skip += 1;
                }
                self.scripts.push((phase, ScriptResult::skipped(&key)));
            }
            RunEvent::ScriptFinished { phase, result } => {
                let failed = result.is_failure();
                if let Some(tally) = self.tally_mut(phase) {
                    if failed {
                        tally.fail += 1;
                    } else {
                        tally.ok += 1;
                    }
                }
                if failed {
                    self.errors.push(script_error(phase, &result));
                }
                self.scripts.push((phase, result));
            }
            RunEvent::PhaseFinished { id, status } => {
                if let Some(tally) = self.tally_mut(id) {
                    if tally.status != PhaseStatus::CompletedWithErrors {
                        tally.status = status;
                    }
                }
            }
            RunEvent::Aborted { .. } => {
                self.aborted = true;
            }
        }
    }

    /// Freeze the duration. Later calls keep the first value.
    pub fn finish(&mut self) {
        if self.duration.is_none() {
            self.duration = Some(self.started.elapsed());
        }
    }

    pub fn phase(&self, id: PhaseId) -> Option<&PhaseTally> {
        self.phases.iter().find(|t| t.id == id)
    }

    pub fn phases(&self) -> &[PhaseTally] {
        &self.phases
    }

    /// Every script result in execution order.
    pub fn scripts(&self) -> impl Iterator<Item = (PhaseId, &ScriptResult)> {
        self.scripts.iter().map(|(p, r)| (*p, r))
    }

    /// Keys that ended in the given state, in execution order.
    pub fn keys_in_state(&self, state: ScriptState) -> Vec<&str> {
        self.scripts
            .iter()
            .filter(|(_, r)| r.state == state)
            .map(|(_, r)| r.key.as_str())
            .collect()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// True when no script failed and no phase was blocked.
    pub fn success(&self) -> bool {
        self.errors.is_empty() && !self.phases.iter().any(|t| t.status.is_failure())
    }

    pub fn summary(&self) -> RunSummary {
        let count = |state: ScriptState| {
            self.scripts
                .iter()
                .filter(|(_, r)| r.state == state)
                .count()
        };

        RunSummary {
            mode: self.mode,
            policy: self.policy,
            duration: self.duration.unwrap_or_else(|| self.started.elapsed()),
            per_phase: self.phases.clone(),
            failed_scripts: self
                .scripts
                .iter()
                .filter(|(_, r)| r.is_failure())
                .map(|(phase, r)| FailedScript {
                    phase: *phase,
                    result: r.clone(),
                })
                .collect(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            completed: count(ScriptState::Succeeded),
            failed: count(ScriptState::Failed),
            skipped: count(ScriptState::Skipped),
            aborted: self.aborted,
            success: self.success(),
        }
    }

    fn tally_mut(&mut self, id: PhaseId) -> Option<&mut PhaseTally> {
        self.phases.iter_mut().rev().find(|t| t.id == id)
    }
}
