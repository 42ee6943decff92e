//! Phase orchestration.
//!
//! Walks the catalog in ascending phase order, gates each phase on its
//! dependencies, skips scripts the state store already marks successful and
//! hands the rest to a [`ScriptRunner`]. Every decision is reported as a
//! [`RunEvent`] and folded into the returned [`ExecutionRun`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{ExecutionPolicy, ResumeMode, Settings};
use crate::error::{OmniforgeError, Result};
use crate::registry::{Phase, PhaseId, PhaseRegistry};
use crate::requirements::DependencyChecker;
use crate::state::ExecutionStateStore;
use crate::steps::{ScriptOutcome, ScriptResult, ScriptRunner};

use super::run::{ExecutionRun, PhaseStatus, RunEvent, RunMode};

/// Options for a single invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Run only this phase.
    pub phase_filter: Option<PhaseId>,
    /// Ignore recorded successes and run every script.
    pub force: bool,
    /// Resolve and report without spawning anything.
    pub dry_run: bool,
    pub policy: ExecutionPolicy,
    pub resume: ResumeMode,
    /// Whether a dry run writes synthesized successes to the state store.
    pub dry_run_records_state: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            phase_filter: None,
            force: false,
            dry_run: false,
            policy: ExecutionPolicy::default(),
            resume: ResumeMode::default(),
            dry_run_records_state: true,
        }
    }
}

impl RunOptions {
    /// Options seeded from the configured settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            policy: settings.policy,
            resume: settings.resume,
            dry_run_records_state: settings.dry_run_records_state,
            ..Default::default()
        }
    }

    fn should_skip(&self, already_succeeded: bool) -> bool {
        !self.force && self.resume == ResumeMode::Skip && already_succeeded
    }
}

/// Drives phases through dependency checks and script execution.
pub struct PhaseOrchestrator<R: ScriptRunner> {
    registry: PhaseRegistry,
    state: ExecutionStateStore,
    runner: R,
    checker: DependencyChecker,
    project_root: PathBuf,
    scripts_dir: PathBuf,
}

impl<R: ScriptRunner> PhaseOrchestrator<R> {
    /// Create an orchestrator. `scripts_dir` is resolved against
    /// `project_root` when relative.
    pub fn new(
        registry: PhaseRegistry,
        state: ExecutionStateStore,
        runner: R,
        project_root: impl Into<PathBuf>,
        scripts_dir: impl AsRef<Path>,
    ) -> Self {
        let project_root = project_root.into();
        let scripts_dir = project_root.join(scripts_dir);
        Self {
            registry,
            state,
            runner,
            checker: DependencyChecker::from_system_path(),
            project_root,
            scripts_dir,
        }
    }

    /// Replace the dependency checker (e.g. with injected PATH entries).
    pub fn with_checker(mut self, checker: DependencyChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn registry(&self) -> &PhaseRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ExecutionStateStore {
        &self.state
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run the whole catalog, or one phase when `phase_filter` is set.
    pub fn run(&mut self, options: &RunOptions) -> Result<ExecutionRun> {
        self.run_with_progress(options, |_| {})
    }

    /// Like [`run`](Self::run), reporting each event as it happens.
    ///
    /// # Errors
    ///
    /// `UnknownPhase` when the filter names an id that was not discovered;
    /// state store I/O failures. Script and dependency failures are recorded
    /// in the returned run instead.
    pub fn run_with_progress(
        &mut self,
        options: &RunOptions,
        mut on_progress: impl FnMut(&RunEvent),
    ) -> Result<ExecutionRun> {
        match options.phase_filter {
            Some(id) => {
                if !self.registry.discover().contains(&id) {
                    return Err(OmniforgeError::UnknownPhase { id });
                }
                let mut run = new_run(options);
                self.execute_phase(id, options, &mut run, &mut on_progress)?;
                run.finish();
                Ok(run)
            }
            None => self.execute_all(options, on_progress),
        }
    }

    /// Execute every discovered phase in ascending order.
    ///
    /// Fail-fast stops at the first failed phase; continue attempts them all.
    pub fn execute_all(
        &mut self,
        options: &RunOptions,
        mut on_progress: impl FnMut(&RunEvent),
    ) -> Result<ExecutionRun> {
        let mut run = new_run(options);

        for id in self.registry.discover() {
            let ok = self.execute_phase(id, options, &mut run, &mut on_progress)?;
            if !ok && options.policy.stops_on_failure() {
                info!("Stopping after phase {} (fail-fast)", id);
                break;
            }
        }

        run.finish();
        Ok(run)
    }

    /// Execute one phase. Returns whether it completed without failures.
    pub fn execute_phase<F: FnMut(&RunEvent)>(
        &mut self,
        id: PhaseId,
        options: &RunOptions,
        run: &mut ExecutionRun,
        on_progress: &mut F,
    ) -> Result<bool> {
        let phase = self
            .registry
            .phase(id)
            .cloned()
            .ok_or(OmniforgeError::UnknownPhase { id })?;

        if !phase.config.enabled {
            info!("Phase {} ({}) is disabled; skipping", id, phase.name());
            emit(
                run,
                on_progress,
                RunEvent::PhaseDisabled {
                    id,
                    name: phase.name().to_string(),
                },
            );
            return Ok(true);
        }

        info!("Starting phase {} ({})", id, phase.name());
        emit(
            run,
            on_progress,
            RunEvent::PhaseStarting {
                id,
                name: phase.name().to_string(),
                scripts: phase.scripts.len(),
            },
        );

        let dependencies = phase.config.effective_dependencies();
        match self
            .checker
            .check(id, &dependencies, phase.config.prereq_mode, options.dry_run)
        {
            Ok(report) if !report.all_satisfied() => {
                emit(
                    run,
                    on_progress,
                    RunEvent::DependencyWarning {
                        phase: id,
                        message: format!(
                            "Phase {}: missing {} (continuing)",
                            id,
                            report.missing_commands()
                        ),
                    },
                );
            }
            Ok(_) => {}
            Err(e @ OmniforgeError::MissingDependency { .. }) => {
                error!("{}", e);
                emit(
                    run,
                    on_progress,
                    RunEvent::PhaseBlocked {
                        id,
                        message: e.to_string(),
                    },
                );
                emit(
                    run,
                    on_progress,
                    RunEvent::PhaseFinished {
                        id,
                        status: PhaseStatus::CompletedWithErrors,
                    },
                );
                if options.policy.stops_on_failure() {
                    emit(run, on_progress, RunEvent::Aborted { phase: id, key: None });
                }
                return Ok(false);
            }
            Err(e) => return Err(e),
        }

        let env = self.phase_env(&phase);
        let mut failed = false;
        let mut aborted_at = None;

        for key in &phase.scripts {
            if options.should_skip(self.state.has_succeeded(key)) {
                debug!("Skipping {} (already succeeded)", key);
                emit(
                    run,
                    on_progress,
                    RunEvent::ScriptSkipped {
                        phase: id,
                        key: key.clone(),
                    },
                );
                continue;
            }

            emit(
                run,
                on_progress,
                RunEvent::ScriptStarting {
                    phase: id,
                    key: key.clone(),
                },
            );
            let result = self.run_script(&phase, key, options, &env)?;
            let is_failure = result.is_failure();
            emit(
                run,
                on_progress,
                RunEvent::ScriptFinished { phase: id, result },
            );

            if is_failure {
                failed = true;
                if options.policy.stops_on_failure() {
                    aborted_at = Some(key.clone());
                    break;
                }
            }
        }

        let status = if failed {
            PhaseStatus::CompletedWithErrors
        } else {
            PhaseStatus::Completed
        };
        info!("Phase {} {}", id, status);
        emit(run, on_progress, RunEvent::PhaseFinished { id, status });

        if let Some(key) = aborted_at {
            emit(
                run,
                on_progress,
                RunEvent::Aborted {
                    phase: id,
                    key: Some(key),
                },
            );
        }

        Ok(!failed)
    }

    fn run_script(
        &mut self,
        phase: &Phase,
        key: &str,
        options: &RunOptions,
        env: &HashMap<String, String>,
    ) -> Result<ScriptResult> {
        let path = self.scripts_dir.join(key);

        if !path.is_file() {
            let err = OmniforgeError::ScriptNotFound {
                key: key.to_string(),
                path,
            };
            error!("{}", err);
            if !options.dry_run {
                self.state.mark_failed(key)?;
            }
            return Ok(ScriptResult::failure(
                key,
                Duration::ZERO,
                None,
                err.to_string(),
            ));
        }

        if options.dry_run {
            info!("[dry-run] Would run {}", path.display());
            if options.dry_run_records_state {
                self.state.mark_success(key)?;
            }
            return Ok(ScriptResult::success(key, &ScriptOutcome::dry_run()));
        }

        let mut env = env.clone();
        env.insert("OMNIFORGE_SCRIPT".to_string(), key.to_string());

        let outcome = match self.runner.run(
            &path,
            phase.config.timeout(),
            phase.config.retries,
            &env,
        ) {
            Ok(outcome) => outcome,
            Err(OmniforgeError::ScriptExecutionFailure { message, .. }) => {
                error!("{}: {}", key, message);
                self.state.mark_failed(key)?;
                return Ok(ScriptResult::failure(key, Duration::ZERO, None, message));
            }
            Err(e) => return Err(e),
        };

        if outcome.success() {
            info!("{} succeeded", key);
            self.state.mark_success(key)?;
            return Ok(ScriptResult::success(key, &outcome));
        }

        let message = if outcome.timed_out {
            format!(
                "timed out after {}s (exit code {})",
                phase.config.timeout_secs, outcome.exit_code
            )
        } else {
            format!("exit code {}", outcome.exit_code)
        };
        if outcome.attempts > 1 {
            warn!("{} failed after {} attempts", key, outcome.attempts);
        }
        error!("{} failed: {}", key, message);
        self.state.mark_failed(key)?;

        Ok(ScriptResult::failure(
            key,
            outcome.duration,
            Some(outcome.exit_code),
            message,
        ))
    }

    fn phase_env(&self, phase: &Phase) -> HashMap<String, String> {
        let packages = phase
            .enabled_packages()
            .map(|p| p.display_name())
            .collect::<Vec<_>>()
            .join(",");

        HashMap::from([
            ("OMNIFORGE_PHASE_ID".to_string(), phase.id.to_string()),
            ("OMNIFORGE_PHASE_NAME".to_string(), phase.name().to_string()),
            (
                "OMNIFORGE_PROJECT_ROOT".to_string(),
                self.project_root.display().to_string(),
            ),
            ("OMNIFORGE_PACKAGES".to_string(), packages),
        ])
    }
}

fn new_run(options: &RunOptions) -> ExecutionRun {
    ExecutionRun::new(RunMode::from_dry_run(options.dry_run), options.policy)
}

fn emit<F: FnMut(&RunEvent)>(run: &mut ExecutionRun, on_progress: &mut F, event: RunEvent) {
    on_progress(&event);
    run.record(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DependencySpec, PackageSpec, PhaseConfig, PhaseMetadata, PrereqMode};
    use crate::steps::ScriptState;
    use std::fs;
    use tempfile::TempDir;

    /// Runner that returns canned exit codes keyed by script file name.
    #[derive(Default)]
    struct ScriptedRunner {
        exit_codes: HashMap<String, i32>,
        calls: Vec<String>,
        envs: Vec<HashMap<String, String>>,
    }

    impl ScriptedRunner {
        fn failing(names: &[&str]) -> Self {
            Self {
                exit_codes: names.iter().map(|n| (n.to_string(), 1)).collect(),
                ..Default::default()
            }
        }
    }

    impl ScriptRunner for ScriptedRunner {
        fn run(
            &mut self,
            path: &Path,
            _timeout: Duration,
            _retries: u32,
            env: &HashMap<String, String>,
        ) -> Result<ScriptOutcome> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let exit_code = self.exit_codes.get(&name).copied().unwrap_or(0);
            self.calls.push(name);
            self.envs.push(env.clone());
            Ok(ScriptOutcome {
                exit_code,
                duration: Duration::from_millis(1),
                attempts: 1,
                timed_out: false,
            })
        }
    }

    fn phase(id: PhaseId, scripts: &[&str]) -> Phase {
        Phase {
            id,
            metadata: PhaseMetadata {
                name: format!("phase-{}", id),
                description: String::new(),
            },
            config: PhaseConfig::with_timeout(600),
            scripts: scripts.iter().map(|s| s.to_string()).collect(),
            packages: Vec::new(),
        }
    }

    struct Fixture {
        temp: TempDir,
    }

    impl Fixture {
        fn new(phases: &[Phase]) -> Self {
            let temp = TempDir::new().unwrap();
            let scripts = temp.path().join("scripts");
            fs::create_dir_all(&scripts).unwrap();
            for p in phases {
                for key in &p.scripts {
                    fs::write(scripts.join(key), "exit 0\n").unwrap();
                }
            }
            Self { temp }
        }

        fn orchestrator(
            &self,
            phases: Vec<Phase>,
            runner: ScriptedRunner,
        ) -> PhaseOrchestrator<ScriptedRunner> {
            let state =
                ExecutionStateStore::open(self.temp.path().join(".omniforge/state.jsonl"))
                    .unwrap();
            PhaseOrchestrator::new(
                PhaseRegistry::from_phases(phases),
                state,
                runner,
                self.temp.path(),
                "scripts",
            )
            .with_checker(DependencyChecker::new(Vec::new()))
        }
    }

    fn two_phase_catalog() -> Vec<Phase> {
        vec![phase(0, &["a.sh", "b.sh"]), phase(1, &["c.sh"])]
    }

    #[test]
    fn clean_run_executes_everything_and_records_success() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        let run = orch.run(&RunOptions::default()).unwrap();

        assert!(run.success());
        assert_eq!(orch.runner().calls, vec!["a.sh", "b.sh", "c.sh"]);
        assert_eq!(orch.state().count(), 3);
    }

    #[test]
    fn second_run_skips_everything() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        orch.run(&RunOptions::default()).unwrap();
        let second = orch.run(&RunOptions::default()).unwrap();

        assert!(second.success());
        assert_eq!(orch.runner().calls.len(), 3);
        assert_eq!(second.summary().skipped, 3);
        assert_eq!(second.summary().completed, 0);
    }

    #[test]
    fn force_reruns_everything() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        orch.run(&RunOptions::default()).unwrap();
        let run = orch
            .run(&RunOptions {
                force: true,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(run.summary().completed, 3);
        assert_eq!(orch.runner().calls.len(), 6);
    }

    #[test]
    fn rerun_resume_mode_ignores_state() {
        let phases = vec![phase(0, &["a.sh"])];
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        orch.run(&RunOptions::default()).unwrap();
        orch.run(&RunOptions {
            resume: ResumeMode::Rerun,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(orch.runner().calls, vec!["a.sh", "a.sh"]);
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::failing(&["b.sh"]));

        let run = orch.run(&RunOptions::default()).unwrap();

        assert!(!run.success());
        assert!(run.is_aborted());
        assert_eq!(orch.runner().calls, vec!["a.sh", "b.sh"]);
        assert!(run.phase(1).is_none());
        assert!(orch.state().has_succeeded("a.sh"));
        assert!(!orch.state().has_succeeded("b.sh"));
        assert!(!orch.state().has_succeeded("c.sh"));
    }

    #[test]
    fn continue_attempts_every_phase() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::failing(&["b.sh"]));

        let run = orch
            .run(&RunOptions {
                policy: ExecutionPolicy::Continue,
                ..Default::default()
            })
            .unwrap();

        assert!(!run.success());
        assert!(!run.is_aborted());
        let p0 = run.phase(0).unwrap();
        assert_eq!((p0.ok, p0.fail, p0.skip), (1, 1, 0));
        assert_eq!(p0.status, PhaseStatus::CompletedWithErrors);
        let p1 = run.phase(1).unwrap();
        assert_eq!((p1.ok, p1.fail, p1.skip), (1, 0, 0));
        assert_eq!(p1.status, PhaseStatus::Completed);
        assert_eq!(run.keys_in_state(ScriptState::Failed), vec!["b.sh"]);
    }

    #[test]
    fn resume_reattempts_only_failures() {
        let phases = vec![phase(0, &["a.sh", "b.sh"])];
        let fx = Fixture::new(&phases);

        {
            let mut orch = fx.orchestrator(phases.clone(), ScriptedRunner::failing(&["b.sh"]));
            orch.run(&RunOptions::default()).unwrap();
        }

        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());
        let run = orch.run(&RunOptions::default()).unwrap();

        assert!(run.success());
        assert_eq!(orch.runner().calls, vec!["b.sh"]);
        assert_eq!(run.keys_in_state(ScriptState::Skipped), vec!["a.sh"]);
    }

    #[test]
    fn dry_run_spawns_nothing_and_records_success() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        let run = orch
            .run(&RunOptions {
                dry_run: true,
                ..Default::default()
            })
            .unwrap();

        assert!(run.success());
        assert!(run.mode().is_dry_run());
        assert!(orch.runner().calls.is_empty());
        assert_eq!(orch.state().count(), 3);
    }

    #[test]
    fn dry_run_can_leave_state_untouched() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        orch.run(&RunOptions {
            dry_run: true,
            dry_run_records_state: false,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(orch.state().count(), 0);
    }

    #[test]
    fn missing_script_file_fails() {
        let phases = vec![phase(0, &["a.sh"])];
        let fx = Fixture::new(&phases);
        let mut catalog = phases.clone();
        catalog[0].scripts.push("ghost.sh".to_string());
        let mut orch = fx.orchestrator(catalog, ScriptedRunner::default());

        let run = orch.run(&RunOptions::default()).unwrap();

        assert!(!run.success());
        assert!(run.errors()[0].contains("ghost.sh"));
        assert!(run.errors()[0].contains("Script not found"));
        assert_eq!(orch.runner().calls, vec!["a.sh"]);
    }

    #[test]
    fn disabled_phase_is_a_no_op() {
        let mut disabled = phase(0, &["a.sh"]);
        disabled.config.enabled = false;
        let phases = vec![disabled, phase(1, &["c.sh"])];
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        let run = orch.run(&RunOptions::default()).unwrap();

        assert!(run.success());
        assert_eq!(run.phase(0).unwrap().status, PhaseStatus::Disabled);
        assert_eq!(orch.runner().calls, vec!["c.sh"]);
    }

    #[test]
    fn strict_missing_dependency_blocks_phase() {
        let mut gated = phase(0, &["a.sh"]);
        gated.config.prereq_mode = PrereqMode::Strict;
        gated.config.dependencies = vec![DependencySpec::new("omniforge-no-such-tool", "")];
        let phases = vec![gated];
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        let run = orch.run(&RunOptions::default()).unwrap();

        assert!(!run.success());
        assert!(orch.runner().calls.is_empty());
        assert_eq!(
            run.phase(0).unwrap().status,
            PhaseStatus::CompletedWithErrors
        );
        assert!(run.errors()[0].contains("omniforge-no-such-tool"));
    }

    #[test]
    fn warn_missing_dependency_still_runs_scripts() {
        let mut gated = phase(0, &["a.sh"]);
        gated.config.dependencies = vec![DependencySpec::new("omniforge-no-such-tool", "")];
        let phases = vec![gated];
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        let run = orch.run(&RunOptions::default()).unwrap();

        assert!(run.success());
        assert_eq!(orch.runner().calls, vec!["a.sh"]);
        assert_eq!(run.summary().warnings.len(), 1);
    }

    #[test]
    fn dry_run_downgrades_strict_dependencies() {
        let mut gated = phase(0, &["a.sh"]);
        gated.config.prereq_mode = PrereqMode::Strict;
        gated.config.docker_required = true;
        let phases = vec![gated];
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        let run = orch
            .run(&RunOptions {
                dry_run: true,
                ..Default::default()
            })
            .unwrap();

        assert!(run.success());
        assert!(run.summary().warnings[0].contains("docker"));
    }

    #[test]
    fn phase_filter_runs_one_phase() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        let run = orch
            .run(&RunOptions {
                phase_filter: Some(1),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(run.phases().len(), 1);
        assert_eq!(orch.runner().calls, vec!["c.sh"]);
    }

    #[test]
    fn unknown_phase_filter_is_an_error() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        let err = orch
            .run(&RunOptions {
                phase_filter: Some(42),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, OmniforgeError::UnknownPhase { id: 42 }));
    }

    #[test]
    fn scripts_receive_phase_environment() {
        let mut p = phase(3, &["a.sh"]);
        p.packages = vec![
            PackageSpec {
                name: "next".to_string(),
                version: Some("15".to_string()),
                enabled: true,
            },
            PackageSpec {
                name: "old".to_string(),
                version: None,
                enabled: false,
            },
            PackageSpec {
                name: "zod".to_string(),
                version: None,
                enabled: true,
            },
        ];
        let phases = vec![p];
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        orch.run(&RunOptions::default()).unwrap();

        let env = &orch.runner().envs[0];
        assert_eq!(env["OMNIFORGE_PHASE_ID"], "3");
        assert_eq!(env["OMNIFORGE_PHASE_NAME"], "phase-3");
        assert_eq!(env["OMNIFORGE_SCRIPT"], "a.sh");
        assert_eq!(env["OMNIFORGE_PACKAGES"], "next@15,zod");
    }

    #[test]
    fn progress_callback_sees_every_event() {
        let phases = two_phase_catalog();
        let fx = Fixture::new(&phases);
        let mut orch = fx.orchestrator(phases, ScriptedRunner::default());

        let mut finished = Vec::new();
        orch.run_with_progress(&RunOptions::default(), |event| {
            if let RunEvent::ScriptFinished { result, .. } = event {
                finished.push(result.key.clone());
            }
        })
        .unwrap();

        assert_eq!(finished, vec!["a.sh", "b.sh", "c.sh"]);
    }
}
