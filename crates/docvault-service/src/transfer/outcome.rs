//! Move, rename, and copy results.

use serde::{Deserialize, Serialize};

use docvault_core::types::{DepartmentId, FolderId, ObjectKind};
use docvault_entity::file::File;
use docvault_entity::object::Visibility;

use crate::outcome::OperationFailure;

/// Where a move or drop goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTarget {
    /// Destination folder; `None` is the root.
    pub parent: Option<FolderId>,
    /// Destination department. Defaults to the object's current one.
    pub department_id: Option<DepartmentId>,
    /// Destination visibility.
    pub visibility: Visibility,
    /// Optional rename applied with the move, e.g. an accepted suggestion.
    pub new_name: Option<String>,
}

impl MoveTarget {
    /// Into `parent`, keeping the name.
    pub fn folder(parent: Option<FolderId>, visibility: Visibility) -> Self {
        Self {
            parent,
            department_id: None,
            visibility,
            new_name: None,
        }
    }

    pub fn with_department(mut self, department_id: Option<DepartmentId>) -> Self {
        self.department_id = department_id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.new_name = Some(name.into());
        self
    }
}

/// Result of a move or rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveResult {
    Success,
    Failure {
        failure: OperationFailure,
    },
    /// The name is taken at the destination. Nothing was renamed; retry
    /// with `suggested_name` once the caller confirms.
    DuplicateConflict {
        conflicting_name: String,
        suggested_name: String,
    },
}

impl MoveResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub(crate) fn failed(failure: impl Into<OperationFailure>) -> Self {
        Self::Failure {
            failure: failure.into(),
        }
    }
}

/// Result of a file copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CopyResult {
    /// The new file.
    Copied { file: File },
    /// Folders and groups cannot be copied. No call was made.
    NotCopyable { kind: ObjectKind },
    DuplicateConflict {
        conflicting_name: String,
        suggested_name: String,
    },
    Failure {
        failure: OperationFailure,
    },
}

impl CopyResult {
    pub fn is_copied(&self) -> bool {
        matches!(self, Self::Copied { .. })
    }

    pub(crate) fn failed(failure: impl Into<OperationFailure>) -> Self {
        Self::Failure {
            failure: failure.into(),
        }
    }
}
