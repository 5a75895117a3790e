//! Folder entity model.

use serde::{Deserialize, Serialize};

use docvault_core::AppResult;
use docvault_core::types::{DepartmentId, FolderId, FolderPath};

use crate::object::{ObjectMeta, Visibility};

/// A folder in the path tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Name, owner, timestamps, star, and lock.
    #[serde(flatten)]
    pub meta: ObjectMeta,
    /// The folder containing this one (root when empty).
    #[serde(default)]
    pub parent_path: FolderPath,
    /// Organization-shared regardless of department.
    #[serde(default)]
    pub is_company_folder: bool,
    /// Department-shared or owner-private.
    #[serde(default)]
    pub visibility: Visibility,
    /// Owning department, if any.
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

impl Folder {
    /// Create a department folder under `parent_path`.
    pub fn new(meta: ObjectMeta, parent_path: FolderPath) -> Self {
        Self {
            id: FolderId::new(),
            meta,
            parent_path,
            is_company_folder: false,
            visibility: Visibility::Department,
            department_id: None,
        }
    }

    /// The materialized path of this folder itself.
    pub fn full_path(&self) -> AppResult<FolderPath> {
        self.parent_path.join(&self.meta.name)
    }

    /// Check if this folder sits directly under the root.
    pub fn is_top_level(&self) -> bool {
        self.parent_path.is_root()
    }
}
