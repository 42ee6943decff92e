//! Phase metadata registry.
//!
//! The registry is built once from the `phases:` section of the
//! configuration and is read-only afterward. Phase ids define execution
//! order; see [`PhaseRegistry::discover`].

pub mod catalog;
pub mod phase;

pub use catalog::PhaseRegistry;
pub use phase::{
    DependencySpec, PackageSpec, Phase, PhaseConfig, PhaseId, PhaseMetadata, PrereqMode,
    BUILTIN_HINT, MAX_PHASE_ID,
};
