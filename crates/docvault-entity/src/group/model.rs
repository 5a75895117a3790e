//! Group entity model.

use serde::{Deserialize, Serialize};

use docvault_core::types::{DepartmentId, FolderPath, GroupId};

use crate::file::File;
use crate::object::{ObjectMeta, Visibility};

/// Default color assigned to groups created without one.
pub const DEFAULT_GROUP_COLOR: &str = "#6366f1";

/// A flat, named collection of files.
///
/// Members keep their own `parent_path`; the group only references them.
/// `file_count` and `total_size_bytes` are recomputed by the server and
/// treated as a display cache here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group identifier.
    pub id: GroupId,
    /// Name, owner, timestamps, star, and lock.
    #[serde(flatten)]
    pub meta: ObjectMeta,
    /// Number of member files.
    #[serde(default)]
    pub file_count: u64,
    /// Combined size of member files.
    #[serde(default)]
    pub total_size_bytes: u64,
    /// Display color, `#rrggbb`.
    pub color: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// The folder the group itself lives in.
    #[serde(default)]
    pub parent_path: FolderPath,
    /// Owning department, if any.
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    /// Department-shared or owner-private.
    #[serde(default)]
    pub visibility: Visibility,
}

impl Group {
    /// Create an empty department group under `parent_path`.
    pub fn new(meta: ObjectMeta, parent_path: FolderPath, color: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(),
            meta,
            file_count: 0,
            total_size_bytes: 0,
            color: color.into(),
            description: None,
            parent_path,
            department_id: None,
            visibility: Visibility::Department,
        }
    }

    /// Adjust the cached aggregates for one member joining.
    pub fn note_member_added(&mut self, size_bytes: u64) {
        self.file_count += 1;
        self.total_size_bytes += size_bytes;
    }

    /// Adjust the cached aggregates for one member leaving.
    pub fn note_member_removed(&mut self, size_bytes: u64) {
        self.file_count = self.file_count.saturating_sub(1);
        self.total_size_bytes = self.total_size_bytes.saturating_sub(size_bytes);
    }

    /// Whether `file` lives in a scope this group may reference.
    ///
    /// Visibilities must match. Private groups only hold their owner's
    /// files; a department group holds files of its department, or any
    /// department when it has none.
    pub fn admits_member(&self, file: &File) -> bool {
        if file.visibility != self.visibility {
            return false;
        }
        match self.visibility {
            Visibility::Private => file.meta.owner_id == self.meta.owner_id,
            Visibility::Department => {
                self.department_id.is_none() || self.department_id == file.department_id
            }
        }
    }
}

/// Check a `#rrggbb` color string.
pub fn is_valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
