//! Wire records exchanged with the document API.
//!
//! Records are the loose, heterogeneous shapes a server returns: most
//! fields are optional and older endpoints use different names, which the
//! serde aliases absorb. Normalization into [`crate::object::FileSystemObject`]
//! happens on the read path.

pub mod request;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_core::types::{DepartmentId, GroupId, UserId};

use crate::file::File;
use crate::folder::Folder;
use crate::group::Group;
use crate::object::LockInfo;
use crate::principal::Role;

pub use request::{
    CopyRequest, CreateFolder, CreateGroup, ListingQuery, LockRequest, MoveRequest, UpdateGroup,
    validate_request,
};

/// Lock columns as the server reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFields {
    #[serde(default)]
    pub is_locked: Option<bool>,
    #[serde(default)]
    pub locked_by: Option<UserId>,
    #[serde(default)]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lock_requires_role: Option<String>,
    #[serde(default)]
    pub has_lock_password: Option<bool>,
}

impl LockFields {
    /// Build the lock value object.
    ///
    /// A missing locker falls back to `owner_id`. A required role the
    /// client cannot resolve is treated as `SuperAdmin` so an unknown
    /// requirement never loosens the lock.
    pub fn to_lock(&self, owner_id: UserId, fallback_time: DateTime<Utc>) -> Option<LockInfo> {
        if !self.is_locked.unwrap_or(false) {
            return None;
        }
        let requires_role = self
            .lock_requires_role
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| raw.parse::<Role>().unwrap_or(Role::SuperAdmin));
        Some(LockInfo {
            locked_by: self.locked_by.unwrap_or(owner_id),
            locked_at: self.locked_at.unwrap_or(fallback_time),
            requires_role,
            has_password: self.has_lock_password.unwrap_or(false),
        })
    }

    /// Report a lock in wire form.
    pub fn from_lock(lock: Option<&LockInfo>) -> Self {
        match lock {
            None => Self {
                is_locked: Some(false),
                ..Self::default()
            },
            Some(lock) => Self {
                is_locked: Some(true),
                locked_by: Some(lock.locked_by),
                locked_at: Some(lock.locked_at),
                lock_requires_role: lock.requires_role.map(|r| r.as_str().to_string()),
                has_lock_password: Some(lock.has_password),
            },
        }
    }
}

/// A file or folder entry from a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default, alias = "isFolder", alias = "is_folder")]
    pub is_directory: bool,
    pub owner_id: UserId,
    #[serde(default, alias = "owner_name")]
    pub owner_display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "updated_at")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "size")]
    pub size_bytes: Option<u64>,
    #[serde(default, alias = "mime_type")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default, alias = "path")]
    pub parent_path: Option<String>,
    #[serde(default)]
    pub is_company_folder: Option<bool>,
    #[serde(flatten)]
    pub lock: LockFields,
}

/// A group entry from a groups listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent_path: Option<String>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub visibility: Option<String>,
    pub owner_id: UserId,
    #[serde(default, alias = "owner_name")]
    pub owner_display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "updated_at")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_count: Option<u64>,
    #[serde(default)]
    pub total_size_bytes: Option<u64>,
    #[serde(flatten)]
    pub lock: LockFields,
}

impl From<&File> for ObjectRecord {
    fn from(file: &File) -> Self {
        Self {
            id: file.id.into_uuid(),
            name: file.meta.name.clone(),
            is_directory: false,
            owner_id: file.meta.owner_id,
            owner_display_name: Some(file.meta.owner_display_name.clone()),
            created_at: file.meta.created_at,
            modified_at: Some(file.meta.modified_at),
            size_bytes: Some(file.size_bytes),
            content_type: file.content_type.clone(),
            visibility: Some(file.visibility.as_str().to_string()),
            department_id: file.department_id,
            group_id: file.group_id,
            parent_path: Some(file.parent_path.as_str().to_string()),
            is_company_folder: None,
            lock: LockFields::from_lock(file.meta.lock.as_ref()),
        }
    }
}

impl From<&Folder> for ObjectRecord {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id.into_uuid(),
            name: folder.meta.name.clone(),
            is_directory: true,
            owner_id: folder.meta.owner_id,
            owner_display_name: Some(folder.meta.owner_display_name.clone()),
            created_at: folder.meta.created_at,
            modified_at: Some(folder.meta.modified_at),
            size_bytes: None,
            content_type: None,
            visibility: Some(folder.visibility.as_str().to_string()),
            department_id: folder.department_id,
            group_id: None,
            parent_path: Some(folder.parent_path.as_str().to_string()),
            is_company_folder: Some(folder.is_company_folder),
            lock: LockFields::from_lock(folder.meta.lock.as_ref()),
        }
    }
}

impl From<&Group> for GroupRecord {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.into_uuid(),
            name: group.meta.name.clone(),
            description: group.description.clone(),
            color: Some(group.color.clone()),
            parent_path: Some(group.parent_path.as_str().to_string()),
            department_id: group.department_id,
            visibility: Some(group.visibility.as_str().to_string()),
            owner_id: group.meta.owner_id,
            owner_display_name: Some(group.meta.owner_display_name.clone()),
            created_at: group.meta.created_at,
            modified_at: Some(group.meta.modified_at),
            file_count: Some(group.file_count),
            total_size_bytes: Some(group.total_size_bytes),
            lock: LockFields::from_lock(group.meta.lock.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlocked_fields_yield_no_lock() {
        let fields = LockFields::default();
        assert!(fields.to_lock(UserId::new(), Utc::now()).is_none());
    }

    #[test]
    fn test_unknown_required_role_stays_strict() {
        let owner = UserId::new();
        let fields = LockFields {
            is_locked: Some(true),
            lock_requires_role: Some("Auditor".into()),
            ..LockFields::default()
        };
        let lock = fields.to_lock(owner, Utc::now()).expect("locked");
        assert_eq!(lock.requires_role, Some(Role::SuperAdmin));
        assert_eq!(lock.locked_by, owner);
        assert!(!lock.has_password);
    }

    #[test]
    fn test_record_accepts_legacy_field_names() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "name": "Plans",
            "isFolder": true,
            "owner_id": Uuid::new_v4(),
            "owner_name": "Dana",
            "created_at": "2024-05-01T10:00:00Z",
            "path": "projects",
            "is_locked": true,
            "lock_requires_role": "Manager"
        });
        let record: ObjectRecord = serde_json::from_value(json).expect("deserialize");
        assert!(record.is_directory);
        assert_eq!(record.owner_display_name.as_deref(), Some("Dana"));
        assert_eq!(record.parent_path.as_deref(), Some("projects"));
        assert_eq!(record.lock.lock_requires_role.as_deref(), Some("Manager"));
    }
}
