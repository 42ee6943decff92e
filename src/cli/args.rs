//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::ExecutionPolicy;

/// OmniForge - phased project bootstrap runner.
#[derive(Debug, Parser)]
#[command(name = "omniforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .omniforge/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the bootstrap phases (default if no command specified)
    Run(RunArgs),

    /// Show completed scripts
    Status(StatusArgs),

    /// List phases with their configuration, scripts and packages
    List(ListArgs),

    /// Clear recorded script state
    Reset(ResetArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Run only this phase
    #[arg(long, value_name = "ID")]
    pub phase: Option<u32>,

    /// Re-run scripts even if they already succeeded
    #[arg(short, long)]
    pub force: bool,

    /// Preview without executing any script
    #[arg(long)]
    pub dry_run: bool,

    /// Failure policy: fail-fast or continue (overrides settings.policy)
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<ExecutionPolicy>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Show status for a single phase
    #[arg(long, value_name = "ID")]
    pub phase: Option<u32>,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Include disabled packages
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the `reset` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResetArgs {
    /// Clear a single script key instead of all state
    #[arg(long, value_name = "KEY")]
    pub script: Option<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
