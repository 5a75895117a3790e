//! Visibility scopes.
//!
//! An object is either shared within a department or private to its
//! owner. Listings are requested for a [`VisibilityScope`], optionally
//! narrowed to one department.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use docvault_core::AppError;
use docvault_core::types::{DepartmentId, UserId};

/// Whether an object is department-shared or owner-private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Shared with the department (or the whole organization when no department is set).
    #[default]
    Department,
    /// Visible to the owner only.
    Private,
}

impl Visibility {
    /// Return the visibility as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "department" | "shared" => Ok(Self::Department),
            "private" => Ok(Self::Private),
            _ => Err(AppError::validation(format!("Invalid visibility: '{s}'"))),
        }
    }
}

/// A listing scope: visibility plus an optional department filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VisibilityScope {
    /// Which visibility the listing covers.
    pub visibility: Visibility,
    /// Department filter; ignored for private scopes.
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

impl VisibilityScope {
    /// Department scope, optionally filtered to one department.
    pub fn department(department_id: Option<DepartmentId>) -> Self {
        Self {
            visibility: Visibility::Department,
            department_id,
        }
    }

    /// Owner-private scope.
    pub fn private() -> Self {
        Self {
            visibility: Visibility::Private,
            department_id: None,
        }
    }

    /// The scope an object with these attributes lives in.
    pub fn of(visibility: Visibility, department_id: Option<DepartmentId>) -> Self {
        match visibility {
            Visibility::Department => Self::department(department_id),
            Visibility::Private => Self::private(),
        }
    }

    /// Whether an object with the given attributes is visible to `viewer`
    /// through this scope.
    ///
    /// A department filter also admits objects without a department
    /// (organization-wide). Private objects are admitted for their owner only.
    pub fn admits(
        &self,
        visibility: Visibility,
        department_id: Option<DepartmentId>,
        owner_id: UserId,
        viewer: UserId,
    ) -> bool {
        match (self.visibility, visibility) {
            (Visibility::Private, Visibility::Private) => owner_id == viewer,
            (Visibility::Department, Visibility::Department) => match self.department_id {
                None => true,
                Some(filter) => department_id.is_none_or(|d| d == filter),
            },
            _ => false,
        }
    }

    /// Whether two objects share a namespace for duplicate-name purposes.
    pub fn same_namespace(
        &self,
        visibility: Visibility,
        department_id: Option<DepartmentId>,
        owner_id: UserId,
        other_owner: UserId,
    ) -> bool {
        match (self.visibility, visibility) {
            (Visibility::Private, Visibility::Private) => owner_id == other_owner,
            (Visibility::Department, Visibility::Department) => self.department_id == department_id,
            _ => false,
        }
    }
}

/// Whether relocating from `current` to `target` department crosses a
/// department boundary. Only two distinct concrete departments cross.
pub fn crosses_department(current: Option<DepartmentId>, target: Option<DepartmentId>) -> bool {
    matches!((current, target), (Some(a), Some(b)) if a != b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_filter_admits_organization_wide() {
        let sales = DepartmentId::new();
        let hr = DepartmentId::new();
        let owner = UserId::new();
        let viewer = UserId::new();
        let scope = VisibilityScope::department(Some(sales));

        assert!(scope.admits(Visibility::Department, Some(sales), owner, viewer));
        assert!(scope.admits(Visibility::Department, None, owner, viewer));
        assert!(!scope.admits(Visibility::Department, Some(hr), owner, viewer));
        assert!(!scope.admits(Visibility::Private, None, owner, viewer));
    }

    #[test]
    fn test_private_scope_is_owner_only() {
        let owner = UserId::new();
        let scope = VisibilityScope::private();
        assert!(scope.admits(Visibility::Private, None, owner, owner));
        assert!(!scope.admits(Visibility::Private, None, owner, UserId::new()));
    }

    #[test]
    fn test_crosses_department() {
        let a = DepartmentId::new();
        let b = DepartmentId::new();
        assert!(crosses_department(Some(a), Some(b)));
        assert!(!crosses_department(Some(a), Some(a)));
        assert!(!crosses_department(None, Some(b)));
        assert!(!crosses_department(Some(a), None));
    }

    #[test]
    fn test_visibility_from_str() {
        assert_eq!("Private".parse::<Visibility>().unwrap(), Visibility::Private);
        assert_eq!("shared".parse::<Visibility>().unwrap(), Visibility::Department);
        assert!("public".parse::<Visibility>().is_err());
    }
}
