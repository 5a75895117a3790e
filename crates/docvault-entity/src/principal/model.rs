//! Principal model.

use serde::{Deserialize, Serialize};

use docvault_core::types::{DepartmentId, UserId};

use super::role::Role;

/// The authenticated actor on whose behalf the core decides.
///
/// Supplied by the external session layer; the core never authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User identifier.
    pub id: UserId,
    /// Role used for all hierarchy gates.
    pub role: Role,
    /// Human-readable name recorded as owner display name on creation.
    #[serde(default)]
    pub display_name: String,
    /// Home department, used as the default department scope.
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

impl Principal {
    /// Create a principal with no display name or department.
    pub fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            display_name: String::new(),
            department_id: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set the home department.
    pub fn with_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }
}
