//! Optimistic star toggling.

use serde::{Deserialize, Serialize};

use docvault_core::AppResult;
use docvault_core::types::ObjectId;
use docvault_entity::object::FileSystemObject;

use crate::outcome::OperationFailure;

/// An in-flight star toggle holding the value to restore on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "settle the toggle once the server answers"]
pub struct PendingStar {
    /// The toggled object.
    pub id: ObjectId,
    /// The flag before the optimistic flip.
    pub prior: bool,
    /// The flag the server was asked to store.
    pub requested: bool,
}

/// How a star toggle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StarOutcome {
    /// The server acknowledged the new flag.
    Applied { starred: bool },
    /// The server refused; the flag was restored to `starred`.
    Reverted {
        starred: bool,
        failure: OperationFailure,
    },
}

impl StarOutcome {
    /// The flag now shown.
    pub fn starred(&self) -> bool {
        match self {
            Self::Applied { starred } | Self::Reverted { starred, .. } => *starred,
        }
    }
}

/// Flip the local flag immediately and remember what it was.
pub fn begin_toggle(object: &mut FileSystemObject) -> PendingStar {
    let prior = object.is_starred();
    object.set_starred(!prior);
    PendingStar {
        id: object.id(),
        prior,
        requested: !prior,
    }
}

impl PendingStar {
    /// Apply the server's answer, restoring the captured prior value on
    /// failure.
    pub fn settle(self, object: &mut FileSystemObject, result: AppResult<()>) -> StarOutcome {
        match result {
            Ok(()) => StarOutcome::Applied {
                starred: self.requested,
            },
            Err(err) => {
                object.set_starred(self.prior);
                StarOutcome::Reverted {
                    starred: self.prior,
                    failure: err.into(),
                }
            }
        }
    }
}
