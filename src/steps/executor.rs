//! Script execution engine.
//!
//! Runs one installer script through the configured interpreter, retrying on
//! failure and enforcing the phase timeout.

use crate::error::Result;
use crate::shell::{execute, CommandOptions, OutputTarget};
use crate::ui::format_duration;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Status of a script within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptState {
    /// Script exited 0.
    Succeeded,

    /// Script failed, timed out, or could not be started.
    Failed,

    /// Script was skipped because an earlier run already succeeded.
    Skipped,
}

impl ScriptState {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            ScriptState::Succeeded => '✓',
            ScriptState::Failed => '✗',
            ScriptState::Skipped => '⊘',
        }
    }
}

impl std::fmt::Display for ScriptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScriptState::Succeeded => "success",
            ScriptState::Failed => "failed",
            ScriptState::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of running a script, after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutcome {
    /// Exit code of the last attempt (124 on timeout).
    pub exit_code: i32,

    /// Wall time across all attempts.
    pub duration: Duration,

    /// Number of times the script was spawned.
    pub attempts: u32,

    /// Whether the last attempt hit the timeout.
    pub timed_out: bool,
}

impl ScriptOutcome {
    /// Outcome synthesized for a dry run: success, nothing spawned.
    pub fn dry_run() -> Self {
        Self {
            exit_code: 0,
            duration: Duration::ZERO,
            attempts: 0,
            timed_out: false,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Result of one script within a run, as recorded by the orchestrator.
#[derive(Debug, Clone)]
pub struct ScriptResult {
    /// Script key (path relative to the scripts directory).
    pub key: String,

    /// Final state.
    pub state: ScriptState,

    /// Execution duration.
    pub duration: Duration,

    /// Exit code (if the script was spawned).
    pub exit_code: Option<i32>,

    /// Error message (if failed).
    pub error: Option<String>,
}

impl ScriptResult {
    /// Create a skipped result.
    pub fn skipped(key: &str) -> Self {
        Self {
            key: key.to_string(),
            state: ScriptState::Skipped,
            duration: Duration::ZERO,
            exit_code: None,
            error: None,
        }
    }

    /// Create a success result.
    pub fn success(key: &str, outcome: &ScriptOutcome) -> Self {
        Self {
            key: key.to_string(),
            state: ScriptState::Succeeded,
            duration: outcome.duration,
            exit_code: Some(outcome.exit_code),
            error: None,
        }
    }

    /// Create a failure result.
    pub fn failure(
        key: &str,
        duration: Duration,
        exit_code: Option<i32>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            key: key.to_string(),
            state: ScriptState::Failed,
            duration,
            exit_code,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.state == ScriptState::Failed
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let c = self.state.display_char();
        match self.state {
            ScriptState::Succeeded => {
                format!("{} {} ({})", c, self.key, format_duration(self.duration))
            }
            ScriptState::Skipped => format!("{} {} (already complete)", c, self.key),
            ScriptState::Failed => {
                let error = self.error.as_deref().unwrap_or("unknown error");
                format!("{} {} - {}", c, self.key, error)
            }
        }
    }
}

/// Runs a single script file to completion.
///
/// The orchestrator depends on this trait rather than on process spawning so
/// scenarios can be driven by a scripted runner in tests.
pub trait ScriptRunner {
    /// Run the script at `path`, respawning up to `retries` times after a
    /// failure. `env` is added to the runner's base environment.
    fn run(
        &mut self,
        path: &Path,
        timeout: Duration,
        retries: u32,
        env: &HashMap<String, String>,
    ) -> Result<ScriptOutcome>;
}

/// Spawns scripts as `<interpreter> <path>` child processes.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    interpreter: String,
    working_dir: PathBuf,
    env: HashMap<String, String>,
    log_file: Option<PathBuf>,
}

impl ScriptExecutor {
    pub fn new(interpreter: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            working_dir: working_dir.into(),
            env: HashMap::new(),
            log_file: None,
        }
    }

    /// Variables exported to every script.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Append script output to `path` instead of inheriting the terminal.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    fn write_log_header(&self, path: &Path, attempt: u32) -> Result<()> {
        if let Some(log) = &self.log_file {
            let mut file = OpenOptions::new().create(true).append(true).open(log)?;
            writeln!(
                file,
                "==> {} {} (attempt {})",
                self.interpreter,
                path.display(),
                attempt
            )?;
        }
        Ok(())
    }
}

impl ScriptRunner for ScriptExecutor {
    fn run(
        &mut self,
        path: &Path,
        timeout: Duration,
        retries: u32,
        env: &HashMap<String, String>,
    ) -> Result<ScriptOutcome> {
        let mut merged = self.env.clone();
        merged.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));

        let options = CommandOptions {
            cwd: Some(self.working_dir.clone()),
            env: merged,
            timeout: Some(timeout),
            output: match &self.log_file {
                Some(log) => OutputTarget::Append(log.clone()),
                None => OutputTarget::Inherit,
            },
        };

        let mut total = Duration::ZERO;
        let max_attempts = retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.write_log_header(path, attempt)?;
            debug!(
                "Running {} {} (attempt {}/{})",
                self.interpreter,
                path.display(),
                attempt,
                max_attempts
            );

            let result = execute(&self.interpreter, [path], &options)?;
            total += result.duration;

            if result.success || attempt >= max_attempts {
                return Ok(ScriptOutcome {
                    exit_code: result.code(),
                    duration: total,
                    attempts: attempt,
                    timed_out: result.timed_out,
                });
            }

            warn!(
                "{} exited with {}; retrying ({}/{})",
                path.display(),
                result.code(),
                attempt,
                retries
            );
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::shell::TIMEOUT_EXIT_CODE;
    use std::fs;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn executor(temp: &TempDir) -> ScriptExecutor {
        ScriptExecutor::new("sh", temp.path()).with_log_file(temp.path().join("run.log"))
    }

    #[test]
    fn maximum_timeout_does_not_overflow() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "ok.sh", "exit 0\n");

        let outcome = executor(&temp)
            .run(&script, Duration::from_secs(u64::MAX), 0, &HashMap::new())
            .unwrap();

        assert!(outcome.success());
        assert!(!outcome.timed_out);
    }

    #[test]
    fn runs_script_successfully() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "ok.sh", "exit 0\n");

        let outcome = executor(&temp)
            .run(&script, Duration::from_secs(10), 0, &HashMap::new())
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.timed_out);
    }

    #[test]
    fn reports_non_zero_exit_code() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "bad.sh", "exit 7\n");

        let outcome = executor(&temp)
            .run(&script, Duration::from_secs(10), 0, &HashMap::new())
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, 7);
    }

    #[test]
    fn retries_until_attempts_exhausted() {
        let temp = TempDir::new().unwrap();
        let counter = temp.path().join("count");
        let script = write_script(
            temp.path(),
            "flaky.sh",
            "echo x >> count\nexit 1\n",
        );

        let outcome = executor(&temp)
            .run(&script, Duration::from_secs(10), 2, &HashMap::new())
            .unwrap();

        assert_eq!(outcome.attempts, 3);
        assert_eq!(fs::read_to_string(counter).unwrap().lines().count(), 3);
    }

    #[test]
    fn retry_stops_after_success() {
        let temp = TempDir::new().unwrap();
        let script = write_script(
            temp.path(),
            "second.sh",
            "if [ -f marker ]; then exit 0; fi\ntouch marker\nexit 1\n",
        );

        let outcome = executor(&temp)
            .run(&script, Duration::from_secs(10), 5, &HashMap::new())
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.attempts, 2);
    }

    #[test]
    fn timeout_yields_exit_code_124() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "slow.sh", "sleep 5\n");

        let outcome = executor(&temp)
            .run(&script, Duration::from_millis(200), 0, &HashMap::new())
            .unwrap();

        assert!(outcome.timed_out);
        assert_eq!(outcome.exit_code, TIMEOUT_EXIT_CODE);
    }

    #[test]
    fn exports_base_and_call_env() {
        let temp = TempDir::new().unwrap();
        let script = write_script(
            temp.path(),
            "env.sh",
            "echo \"$BASE_VAR $CALL_VAR\" > env.out\n",
        );
        let mut base = HashMap::new();
        base.insert("BASE_VAR".to_string(), "base".to_string());
        let mut call = HashMap::new();
        call.insert("CALL_VAR".to_string(), "call".to_string());

        executor(&temp)
            .with_env(base)
            .run(&script, Duration::from_secs(10), 0, &call)
            .unwrap();

        let out = fs::read_to_string(temp.path().join("env.out")).unwrap();
        assert_eq!(out.trim(), "base call");
    }

    #[test]
    fn output_goes_to_log_file() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "loud.sh", "echo hello-from-script\n");
        let mut exec = executor(&temp);

        exec.run(&script, Duration::from_secs(10), 0, &HashMap::new())
            .unwrap();

        let log = fs::read_to_string(exec.log_file().unwrap()).unwrap();
        assert!(log.contains("==> sh"));
        assert!(log.contains("hello-from-script"));
    }

    #[test]
    fn summary_lines() {
        let ok = ScriptResult::success(
            "a.sh",
            &ScriptOutcome {
                exit_code: 0,
                duration: Duration::from_millis(250),
                attempts: 1,
                timed_out: false,
            },
        );
        assert_eq!(ok.summary_line(), "✓ a.sh (250ms)");

        let skipped = ScriptResult::skipped("b.sh");
        assert_eq!(skipped.summary_line(), "⊘ b.sh (already complete)");

        let failed = ScriptResult::failure("c.sh", Duration::ZERO, Some(1), "exit code 1");
        assert!(failed.is_failure());
        assert_eq!(failed.summary_line(), "✗ c.sh - exit code 1");
    }

    #[test]
    fn dry_run_outcome_is_zero_duration_success() {
        let outcome = ScriptOutcome::dry_run();
        assert!(outcome.success());
        assert_eq!(outcome.duration, Duration::ZERO);
        assert_eq!(outcome.attempts, 0);
    }
}
