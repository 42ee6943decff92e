//! Execution state persisted across runs.
//!
//! The store is the single source of truth for resume decisions: a script
//! whose latest entry is `success` is skipped on the next run unless the run
//! is forced or the entry is cleared.

pub mod entry;
pub mod lock;
pub mod store;

pub use entry::{ScriptStatus, StateEntry};
pub use lock::StateLock;
pub use store::ExecutionStateStore;
