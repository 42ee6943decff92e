//! Run command implementation.
//!
//! The `omniforge run` command executes the phase catalog.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use crate::cli::args::RunArgs;
use crate::config::ForgeConfig;
use crate::error::{OmniforgeError, Result};
use crate::registry::PhaseRegistry;
use crate::runner::{print_recap, PhaseOrchestrator, RunEvent, RunOptions};
use crate::state::ExecutionStateStore;
use crate::steps::ScriptExecutor;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::{load_project_config, state_path, EXIT_NO_CONFIG};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Build run options from settings and flags. Flags win.
    fn build_options(&self, config: &ForgeConfig) -> RunOptions {
        let mut options = RunOptions::from_settings(&config.settings);
        options.phase_filter = self.args.phase;
        options.force = self.args.force;
        options.dry_run = self.args.dry_run;
        if let Some(policy) = self.args.policy {
            options.policy = policy;
        }
        options
    }

    /// Build the script executor. A dry run spawns nothing, so it gets no
    /// log file.
    fn build_executor(
        &self,
        config: &ForgeConfig,
        options: &RunOptions,
        ui: &mut dyn UserInterface,
    ) -> Result<ScriptExecutor> {
        let settings = &config.settings;
        let executor = ScriptExecutor::new(&settings.interpreter, &self.project_root)
            .with_env(settings.env.clone());

        let Some(log_dir) = settings.log_dir.as_ref().filter(|_| !options.dry_run) else {
            return Ok(executor);
        };
        let log_dir = self.project_root.join(log_dir);
        fs::create_dir_all(&log_dir)?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let log_file = log_dir.join(format!("run-{}.log", stamp));
        ui.message(&format!("Script output: {}", log_file.display()));
        Ok(executor.with_log_file(log_file))
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) =
            load_project_config(&self.project_root, self.config_override.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let app_name = config.app_name.as_deref().unwrap_or("project");
        ui.show_header(&format!("Bootstrapping {}", app_name));

        let registry = PhaseRegistry::from_config(&config);
        if registry.is_empty() {
            ui.warning("No phases defined in configuration");
        }
        for (key, phases) in registry.duplicate_script_keys() {
            warn!("Script {} is listed in phases {:?}", key, phases);
            ui.warning(&format!(
                "{} appears in phases {:?}; they share one completion record",
                key, phases
            ));
        }

        let options = self.build_options(&config);
        if options.dry_run {
            ui.message("Dry run: no scripts will be executed");
        }

        let state = ExecutionStateStore::open(state_path(&self.project_root, &config))?;
        let executor = self.build_executor(&config, &options, ui)?;
        let mut orchestrator = PhaseOrchestrator::new(
            registry,
            state,
            executor,
            &self.project_root,
            &config.settings.scripts_dir,
        );

        let result = orchestrator.run_with_progress(&options, |event| show_event(ui, event));
        let run = match result {
            Ok(run) => run,
            Err(OmniforgeError::UnknownPhase { id }) => {
                ui.error(&format!("Unknown phase: {}", id));
                let ids = orchestrator.registry().discover();
                ui.show_hint(&format!("Available phases: {:?}", ids));
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };

        print_recap(ui, &run.summary());

        if run.success() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

fn show_event(ui: &mut dyn UserInterface, event: &RunEvent) {
    let mode = ui.output_mode();
    match event {
        RunEvent::PhaseStarting { id, name, scripts } if mode.shows_progress() => {
            ui.message(&format!("Phase {}: {} ({} scripts)", id, name, scripts));
        }
        RunEvent::PhaseDisabled { id, name } if mode.shows_progress() => {
            ui.message(&format!("Phase {}: {} (disabled)", id, name));
        }
        RunEvent::DependencyWarning { message, .. } => ui.warning(message),
        RunEvent::PhaseBlocked { message, .. } => ui.error(message),
        RunEvent::ScriptFinished { result, .. } if mode.shows_progress() => {
            ui.message(&format!("  {}", result.summary_line()));
        }
        RunEvent::ScriptSkipped { key, .. } if mode.shows_details() => {
            ui.message(&format!("  ⊘ {} (already complete)", key));
        }
        RunEvent::Aborted { key: Some(key), .. } => {
            ui.warning(&format!("Stopping after {} failed (fail-fast)", key));
        }
        _ => {}
    }
}
