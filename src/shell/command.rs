//! Child process execution with timeouts.

use crate::error::{OmniforgeError, Result};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Exit code reported for a process killed by its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed for exceeding its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            duration,
            success: true,
            timed_out: false,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: Option<i32>, duration: Duration) -> Self {
        Self {
            exit_code,
            duration,
            success: false,
            timed_out: false,
        }
    }

    /// Create a result for a process killed at its deadline.
    pub fn timeout(duration: Duration) -> Self {
        Self {
            exit_code: Some(TIMEOUT_EXIT_CODE),
            duration,
            success: false,
            timed_out: true,
        }
    }

    /// Exit code with a synthetic value for signal deaths.
    pub fn code(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }
}

/// Where child output goes.
#[derive(Debug, Clone, Default)]
pub enum OutputTarget {
    /// Share the parent's stdout/stderr.
    #[default]
    Inherit,
    /// Append stdout and stderr to a file.
    Append(PathBuf),
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Kill the process after this long (None = no timeout).
    pub timeout: Option<Duration>,

    /// Output destination.
    pub output: OutputTarget,
}

/// Spawn `program` with `args` and wait for it, enforcing the timeout.
///
/// On unix the child gets its own process group so a timeout kills any
/// grandchildren the script started as well.
pub fn execute<I, S>(program: &str, args: I, options: &CommandOptions) -> Result<CommandResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    match &options.output {
        OutputTarget::Inherit => {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }
        OutputTarget::Append(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            cmd.stderr(Stdio::from(file.try_clone()?));
            cmd.stdout(Stdio::from(file));
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| OmniforgeError::ScriptExecutionFailure {
            key: program.to_string(),
            message: format!("failed to spawn: {}", e),
        })?;

    // A timeout too large to represent as an instant means no deadline.
    let deadline = options.timeout.and_then(|limit| start.checked_add(limit));
    let status = match deadline {
        Some(deadline) => match wait_with_deadline(&mut child, deadline)? {
            Some(status) => status,
            None => {
                kill_process_tree(&mut child);
                return Ok(CommandResult::timeout(start.elapsed()));
            }
        },
        None => child.wait()?,
    };

    let duration = start.elapsed();

    if status.success() {
        Ok(CommandResult::success(duration))
    } else {
        Ok(CommandResult::failure(exit_code(&status), duration))
    }
}

/// Poll until the child exits or the deadline passes (`Ok(None)`).
fn wait_with_deadline(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pid) = i32::try_from(child.id()) {
        // SAFETY: plain syscall; a negative pid targets the child's process group.
        unsafe {
            libc::kill(-pid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn exit_code(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|s| 128 + s))
}

#[cfg(not(unix))]
fn exit_code(status: &ExitStatus) -> Option<i32> {
    status.code()
}
