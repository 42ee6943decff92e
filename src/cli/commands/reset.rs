//! Reset command implementation.
//!
//! The `omniforge reset` command clears recorded script state so the next
//! run executes those scripts again.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::args::ResetArgs;
use crate::error::Result;
use crate::state::ExecutionStateStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::{load_project_config, state_path, EXIT_NO_CONFIG};

/// The reset command implementation.
pub struct ResetCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: ResetArgs,
}

impl ResetCommand {
    /// Create a new reset command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: ResetArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for ResetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) =
            load_project_config(&self.project_root, self.config_override.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let mut store = ExecutionStateStore::open(state_path(&self.project_root, &config))?;

        match &self.args.script {
            Some(key) => {
                if store.clear(key)? {
                    info!("Cleared state for {}", key);
                    ui.success(&format!("Cleared {}", key));
                } else {
                    ui.warning(&format!("No state recorded for {}", key));
                }
            }
            None => {
                let removed = store.clear_all()?;
                info!("Cleared {} state entries", removed);
                ui.success(&format!("Cleared {} entries", removed));
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(recorded: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".omniforge");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), "phases:\n  0:\n    scripts: [a.sh, b.sh]\n").unwrap();

        let mut store = ExecutionStateStore::open(dir.join("state.jsonl")).unwrap();
        for key in recorded {
            store.mark_success(key).unwrap();
        }
        temp
    }

    fn reopen(temp: &TempDir) -> ExecutionStateStore {
        ExecutionStateStore::snapshot(temp.path().join(".omniforge/state.jsonl")).unwrap()
    }

    #[test]
    fn reset_single_script() {
        let temp = setup_project(&["a.sh", "b.sh"]);
        let cmd = ResetCommand::new(
            temp.path(),
            None,
            ResetArgs {
                script: Some("a.sh".to_string()),
            },
        );
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_success("Cleared a.sh"));
        let store = reopen(&temp);
        assert!(!store.has_succeeded("a.sh"));
        assert!(store.has_succeeded("b.sh"));
    }

    #[test]
    fn reset_unknown_script_warns() {
        let temp = setup_project(&["a.sh"]);
        let cmd = ResetCommand::new(
            temp.path(),
            None,
            ResetArgs {
                script: Some("zzz.sh".to_string()),
            },
        );
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_warning("No state recorded for zzz.sh"));
        assert!(reopen(&temp).has_succeeded("a.sh"));
    }

    #[test]
    fn reset_all() {
        let temp = setup_project(&["a.sh", "b.sh"]);
        let cmd = ResetCommand::new(temp.path(), None, ResetArgs::default());
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert!(ui.has_success("Cleared 2 entries"));
        assert_eq!(reopen(&temp).count(), 0);
    }

    #[test]
    fn reset_no_config() {
        let temp = TempDir::new().unwrap();
        let cmd = ResetCommand::new(temp.path(), None, ResetArgs::default());
        let mut ui = MockUI::new();

        assert_eq!(cmd.execute(&mut ui).unwrap().exit_code, 2);
    }
}
