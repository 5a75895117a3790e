//! Locking and unlocking of files, folders, and groups.

pub mod machine;

pub use machine::{LockOutcome, LockStateMachine, UnlockOutcome};
