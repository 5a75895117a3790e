//! Request bodies sent to the document API, with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use docvault_core::types::{DepartmentId, FolderPath};
use docvault_core::{AppError, AppResult};

use crate::group::is_valid_color;
use crate::object::{Visibility, VisibilityScope};
use crate::principal::Role;

/// Run `validator` rules and map failures to a validation error.
pub fn validate_request<T: Validate>(req: &T) -> AppResult<()> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    if is_valid_color(color) {
        Ok(())
    } else {
        Err(ValidationError::new("color").with_message("Color must be in #rrggbb form".into()))
    }
}

/// Folder or groups listing query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Folder to list.
    pub path: FolderPath,
    /// Visibility and department filter.
    pub scope: VisibilityScope,
}

impl ListingQuery {
    pub fn new(path: FolderPath, scope: VisibilityScope) -> Self {
        Self { path, scope }
    }
}

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolder {
    /// Folder name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Parent folder; every prefix must exist.
    pub parent_path: FolderPath,
    /// Visibility of the new folder.
    pub visibility: Visibility,
    /// Department, for department visibility.
    pub department_id: Option<DepartmentId>,
    /// Mark as organization-shared.
    #[serde(default)]
    pub is_company_folder: bool,
}

/// Create group request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGroup {
    /// Group name, unique per path and department.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Optional description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Display color.
    #[validate(custom(function = "validate_color"))]
    pub color: String,
    /// Folder the group lives in.
    pub parent_path: FolderPath,
    /// Visibility of the group.
    pub visibility: Visibility,
    /// Department, for department visibility.
    pub department_id: Option<DepartmentId>,
}

/// Update group request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateGroup {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_color"))]
    pub color: Option<String>,
}

/// Lock request.
///
/// The password travels to the server once and is not retained.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LockRequest {
    /// Optional unlock password.
    pub password: Option<String>,
    /// Optional minimum role allowed to bypass.
    pub requires_role: Option<Role>,
}

impl fmt::Debug for LockRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockRequest")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("requires_role", &self.requires_role)
            .finish()
    }
}

/// Move request, also used for renames in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Destination folder.
    pub target_path: FolderPath,
    /// Destination visibility.
    pub visibility: Visibility,
    /// Destination department.
    pub department_id: Option<DepartmentId>,
    /// New name, when renaming as part of the move.
    pub new_name: Option<String>,
}

/// Copy request. Files only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRequest {
    /// Destination folder.
    pub target_path: FolderPath,
    /// Destination visibility.
    pub visibility: Visibility,
    /// Destination department.
    pub department_id: Option<DepartmentId>,
    /// Name of the copy; defaults to the source name.
    pub new_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_request(color: &str) -> CreateGroup {
        CreateGroup {
            name: "Invoices".into(),
            description: None,
            color: color.into(),
            parent_path: FolderPath::root(),
            visibility: Visibility::Department,
            department_id: None,
        }
    }

    #[test]
    fn test_create_group_color_rule() {
        assert!(validate_request(&group_request("#00ff00")).is_ok());
        let err = validate_request(&group_request("green")).unwrap_err();
        assert_eq!(err.kind, docvault_core::ErrorKind::Validation);
    }

    #[test]
    fn test_update_group_skips_absent_fields() {
        assert!(validate_request(&UpdateGroup::default()).is_ok());
        let bad = UpdateGroup {
            name: Some(String::new()),
            ..UpdateGroup::default()
        };
        assert!(validate_request(&bad).is_err());
    }

    #[test]
    fn test_lock_request_debug_redacts_password() {
        let req = LockRequest {
            password: Some("hunter2".into()),
            requires_role: Some(Role::Manager),
        };
        let rendered = format!("{req:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("REDACTED"));
    }
}
