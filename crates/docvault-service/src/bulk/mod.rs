//! Best-effort batches over a selection.

pub mod coordinator;
pub mod outcome;

pub use coordinator::BulkOperationCoordinator;
pub use outcome::{BulkItemReport, BulkItemStatus, BulkOutcome};
