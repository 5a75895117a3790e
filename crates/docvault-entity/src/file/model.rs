//! File entity model.

use serde::{Deserialize, Serialize};

use docvault_core::types::{DepartmentId, FileId, FolderPath, GroupId};

use super::category::ContentCategory;
use crate::object::{ObjectMeta, Visibility};

/// A file in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// Name, owner, timestamps, star, and lock.
    #[serde(flatten)]
    pub meta: ObjectMeta,
    /// File size in bytes.
    #[serde(default)]
    pub size_bytes: u64,
    /// MIME type if the server supplied one.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Derived content category.
    #[serde(default)]
    pub content_category: ContentCategory,
    /// Department-shared or owner-private.
    #[serde(default)]
    pub visibility: Visibility,
    /// Owning department, if any.
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    /// The group this file belongs to. At most one.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// The folder containing this file.
    #[serde(default)]
    pub parent_path: FolderPath,
}

impl File {
    /// Create an unsized, ungrouped department file.
    pub fn new(meta: ObjectMeta, parent_path: FolderPath) -> Self {
        let content_category = ContentCategory::from_name(&meta.name);
        Self {
            id: FileId::new(),
            meta,
            size_bytes: 0,
            content_type: None,
            content_category,
            visibility: Visibility::Department,
            department_id: None,
            group_id: None,
            parent_path,
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        self.content_category = ContentCategory::derive(&self.meta.name, Some(&content_type));
        self.content_type = Some(content_type);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        if visibility == Visibility::Private {
            self.department_id = None;
        }
        self
    }

    pub fn with_department(mut self, department_id: Option<DepartmentId>) -> Self {
        self.department_id = department_id;
        self
    }

    pub fn with_group(mut self, group_id: Option<GroupId>) -> Self {
        self.group_id = group_id;
        self
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.meta
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}
