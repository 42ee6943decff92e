//! List command implementation.
//!
//! The `omniforge list` command prints the phase catalog.

use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::registry::{Phase, PhaseRegistry};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::{load_project_config, EXIT_NO_CONFIG};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: ListArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }

    fn describe(&self, phase: &Phase) -> Vec<String> {
        let config = &phase.config;
        let mut lines = Vec::new();

        let mut title = format!("Phase {}: {}", phase.id, phase.name());
        if !phase.metadata.description.is_empty() {
            title.push_str(&format!(" - {}", phase.metadata.description));
        }
        lines.push(title);

        let mut settings = format!(
            "  {}, timeout {}s, prereqs {}",
            if config.enabled { "enabled" } else { "disabled" },
            config.timeout_secs,
            config.prereq_mode
        );
        if config.retries > 0 {
            settings.push_str(&format!(", retries {}", config.retries));
        }
        if config.docker_required {
            settings.push_str(", docker required");
        }
        lines.push(settings);

        let deps = config.effective_dependencies();
        if !deps.is_empty() {
            let names: Vec<_> = deps
                .iter()
                .map(|d| {
                    if d.hint.is_empty() {
                        d.command.clone()
                    } else {
                        format!("{} ({})", d.command, d.hint)
                    }
                })
                .collect();
            lines.push(format!("  requires: {}", names.join(", ")));
        }

        for key in &phase.scripts {
            lines.push(format!("  - {}", key));
        }

        let packages: Vec<_> = phase
            .packages
            .iter()
            .filter(|p| p.enabled || self.args.all)
            .map(|p| {
                if p.enabled {
                    p.display_name()
                } else {
                    format!("{} (disabled)", p.display_name())
                }
            })
            .collect();
        if !packages.is_empty() {
            lines.push(format!("  packages: {}", packages.join(", ")));
        }

        lines
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) =
            load_project_config(&self.project_root, self.config_override.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let registry = PhaseRegistry::from_config(&config);
        if registry.is_empty() {
            ui.warning("No phases defined in configuration");
            return Ok(CommandResult::success());
        }

        for phase in registry.iter() {
            for line in self.describe(phase) {
                ui.message(&line);
            }
            ui.message("");
        }

        for (key, phases) in registry.duplicate_script_keys() {
            ui.warning(&format!("{} is listed in phases {:?}", key, phases));
        }

        Ok(CommandResult::success())
    }
}
