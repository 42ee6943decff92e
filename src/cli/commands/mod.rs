//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`].

pub mod completions;
pub mod dispatcher;
pub mod list;
pub mod reset;
pub mod run;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use std::path::{Path, PathBuf};

use crate::config::{load_config, validate, ForgeConfig};
use crate::error::{OmniforgeError, Result};
use crate::ui::UserInterface;

/// Exit code when no configuration file exists.
pub const EXIT_NO_CONFIG: i32 = 2;

/// Load and validate the project configuration.
///
/// A missing config is reported through the UI and yields `Ok(None)` so the
/// caller can exit with [`EXIT_NO_CONFIG`].
pub(crate) fn load_project_config(
    project_root: &Path,
    config_override: Option<&Path>,
    ui: &mut dyn UserInterface,
) -> Result<Option<ForgeConfig>> {
    match load_config(project_root, config_override) {
        Ok(config) => {
            validate(&config)?;
            Ok(Some(config))
        }
        Err(OmniforgeError::ConfigNotFound { path }) => {
            ui.error(&format!("No configuration found at {}", path.display()));
            ui.show_hint("Create .omniforge/config.yml with a `phases:` section");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Absolute location of the state file.
pub(crate) fn state_path(project_root: &Path, config: &ForgeConfig) -> PathBuf {
    project_root.join(&config.settings.state_file)
}
