//! Status command implementation.
//!
//! The `omniforge status` command shows recorded script state per phase.
//! It reads a snapshot of the state file and never takes the write lock,
//! so it is safe to run next to an active `omniforge run`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::cli::args::StatusArgs;
use crate::error::Result;
use crate::registry::PhaseRegistry;
use crate::state::{ExecutionStateStore, ScriptStatus};
use crate::ui::{format_relative_time, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::{load_project_config, state_path, EXIT_NO_CONFIG};

/// The status command implementation.
pub struct StatusCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: StatusArgs) -> Self {
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

    fn script_line(store: &ExecutionStateStore, key: &str) -> String {
        match store.entry(key) {
            Some(entry) => {
                let label = match entry.status {
                    ScriptStatus::Success => "[ok]",
                    ScriptStatus::Failed => "[failed]",
                };
                format!(
                    "  {} {} ({}, {})",
                    label,
                    key,
                    entry.timestamp.to_rfc3339(),
                    format_relative_time(entry.timestamp)
                )
            }
            None => format!("  [pending] {}", key),
        }
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) =
            load_project_config(&self.project_root, self.config_override.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let registry = PhaseRegistry::from_config(&config);
        let store = ExecutionStateStore::snapshot(state_path(&self.project_root, &config))?;

        let app_name = config.app_name.as_deref().unwrap_or("project");
        ui.show_header(&format!("{} status", app_name));

        let ids = match self.args.phase {
            Some(id) if registry.phase(id).is_none() => {
                ui.error(&format!("Unknown phase: {}", id));
                return Ok(CommandResult::failure(1));
            }
            Some(id) => vec![id],
            None => registry.discover(),
        };

        let mut total = 0;
        let mut done = 0;
        let mut cataloged = BTreeSet::new();

        for id in ids {
            let Some(phase) = registry.phase(id) else {
                continue;
            };
            let suffix = if phase.config.enabled {
                ""
            } else {
                " (disabled)"
            };
            ui.message(&format!("Phase {}: {}{}", id, phase.name(), suffix));

            for key in &phase.scripts {
                cataloged.insert(key.as_str());
                total += 1;
                if store.has_succeeded(key) {
                    done += 1;
                }
                ui.message(&Self::script_line(&store, key));
            }
        }

        if self.args.phase.is_none() {
            let orphans: Vec<_> = store
                .list_completed()
                .into_iter()
                .filter(|(key, _)| !cataloged.contains(key))
                .collect();
            if !orphans.is_empty() {
                ui.message("");
                ui.message("Recorded scripts not in the catalog:");
                for (key, _) in orphans {
                    ui.message(&Self::script_line(&store, key));
                }
            }
        }

        ui.message("");
        ui.message(&format!("{} of {} scripts completed", done, total));
        if done < total {
            ui.show_hint("Run `omniforge run` to continue");
        }

        Ok(CommandResult::success())
    }
}
