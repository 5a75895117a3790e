//! Moving, renaming, and copying objects.

pub mod engine;
pub mod naming;
pub mod outcome;

pub use engine::{CopyTarget, MoveCopyEngine};
pub use naming::suggest_name;
pub use outcome::{CopyResult, MoveResult, MoveTarget};
