//! Phase execution orchestration and reporting.

pub mod orchestrator;
pub mod report;
pub mod run;

pub use orchestrator::{PhaseOrchestrator, RunOptions};
pub use report::{print_recap, RECOVERY_STEPS};
pub use run::{
    ExecutionRun, FailedScript, PhaseStatus, PhaseTally, RunEvent, RunMode, RunSummary,
};
