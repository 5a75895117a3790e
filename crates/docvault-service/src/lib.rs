//! # docvault-service
//!
//! The DocVault core: locking, moving and copying, groups, bulk batches,
//! and the read path, all over an injected [`DocumentApi`].
//!
//! Services follow constructor injection. Every dependency is provided at
//! construction time, and [`Services::new`] wires the whole graph from an
//! [`AppConfig`](docvault_core::config::AppConfig).

pub mod api;
pub mod browser;
pub mod bulk;
pub mod context;
pub mod folder;
pub mod group;
pub mod index;
pub mod lock;
pub mod outcome;
pub mod services;
pub mod transfer;

pub use api::{DocumentApi, MemoryDocumentApi, Snapshot, TimedApi};
pub use browser::{BrowserSession, NavEntry};
pub use bulk::{BulkItemReport, BulkItemStatus, BulkOperationCoordinator, BulkOutcome};
pub use context::RequestContext;
pub use folder::FolderService;
pub use group::{FolderListing, GroupAggregator, GroupContents, Membership};
pub use index::{FileSystemIndex, ObjectList, StarOutcome};
pub use lock::{LockOutcome, LockStateMachine, UnlockOutcome};
pub use outcome::{ActionOutcome, OperationFailure, SaveOutcome};
pub use services::Services;
pub use transfer::{CopyResult, CopyTarget, MoveCopyEngine, MoveResult, MoveTarget};
