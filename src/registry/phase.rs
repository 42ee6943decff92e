//! Typed phase records.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Numeric phase identifier. Ascending order is execution order.
pub type PhaseId = u32;

/// Highest id probed during discovery.
pub const MAX_PHASE_ID: PhaseId = 99;

/// Hint value marking a dependency as a shell builtin.
pub const BUILTIN_HINT: &str = "builtin";

/// How unmet dependencies affect a phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrereqMode {
    /// Any missing dependency blocks the phase.
    Strict,
    /// Missing dependencies are logged and the phase runs anyway.
    #[default]
    Warn,
}

impl FromStr for PrereqMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "warn" => Ok(Self::Warn),
            _ => Err(format!("unknown prereq mode: {}", s)),
        }
    }
}

impl fmt::Display for PrereqMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Warn => write!(f, "warn"),
        }
    }
}

/// A command a phase needs on `PATH`, with install guidance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub command: String,
    pub hint: String,
}

impl DependencySpec {
    pub fn new(command: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            hint: hint.into(),
        }
    }

    /// Builtins are satisfied without a `PATH` lookup.
    pub fn is_builtin(&self) -> bool {
        self.hint == BUILTIN_HINT
    }
}

/// A package a phase installs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
    pub enabled: bool,
}

impl PackageSpec {
    /// `name@version`, or just `name` when unversioned.
    pub fn display_name(&self) -> String {
        match &self.version {
            Some(v) => format!("{}@{}", self.name, v),
            None => self.name.clone(),
        }
    }
}

/// Display metadata for a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseMetadata {
    pub name: String,
    pub description: String,
}

/// Execution configuration for a phase, with defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    pub prereq_mode: PrereqMode,
    pub dependencies: Vec<DependencySpec>,
    pub docker_required: bool,
    pub retries: u32,
}

impl PhaseConfig {
    /// Defaults used for every field a catalog entry leaves out.
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            enabled: true,
            timeout_secs,
            prereq_mode: PrereqMode::default(),
            dependencies: Vec::new(),
            docker_required: false,
            retries: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Declared dependencies plus `docker` when the phase requires it.
    pub fn effective_dependencies(&self) -> Vec<DependencySpec> {
        let mut deps = self.dependencies.clone();
        if self.docker_required && !deps.iter().any(|d| d.command == "docker") {
            deps.push(DependencySpec::new(
                "docker",
                "Docker is required for this phase (https://docs.docker.com/get-docker/)",
            ));
        }
        deps
    }
}

/// One ordered stage of the bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub id: PhaseId,
    pub metadata: PhaseMetadata,
    pub config: PhaseConfig,
    /// Script keys in execution order.
    pub scripts: Vec<String>,
    pub packages: Vec<PackageSpec>,
}

impl Phase {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn enabled_packages(&self) -> impl Iterator<Item = &PackageSpec> {
        self.packages.iter().filter(|p| p.enabled)
    }
}
