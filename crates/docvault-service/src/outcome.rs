//! Discriminated outcomes shared by the mutating services.
//!
//! Collaborator errors never reach the presentation layer directly; every
//! mutation reports one of these tagged results instead.

use serde::{Deserialize, Serialize};

use docvault_core::{AppError, ErrorKind};
use docvault_entity::principal::Role;

/// A failed operation, stripped of transport detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFailure {
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl OperationFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl From<AppError> for OperationFailure {
    fn from(err: AppError) -> Self {
        Self::new(err.kind, err.message)
    }
}

impl From<&AppError> for OperationFailure {
    fn from(err: &AppError) -> Self {
        Self::new(err.kind, err.message.clone())
    }
}

/// Result of a create or update that may collide on name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome<T> {
    /// The object was saved.
    Saved { value: T },
    /// The name is taken at the destination.
    DuplicateConflict {
        conflicting_name: String,
        suggested_name: String,
    },
    /// Any other failure.
    Failure { failure: OperationFailure },
}

impl<T> SaveOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// The saved value, if any.
    pub fn saved(self) -> Option<T> {
        match self {
            Self::Saved { value } => Some(value),
            _ => None,
        }
    }
}

/// Result of an action gated by locks or roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome<T = ()> {
    /// The action was applied.
    Done { value: T },
    /// A lock or role gate refused the action before any call was made.
    Denied {
        reason: String,
        required_role: Option<Role>,
    },
    /// The action was attempted and failed.
    Failure { failure: OperationFailure },
}

impl<T> ActionOutcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    pub fn done(self) -> Option<T> {
        match self {
            Self::Done { value } => Some(value),
            _ => None,
        }
    }

    pub(crate) fn failed(err: AppError) -> Self {
        Self::Failure {
            failure: err.into(),
        }
    }
}
