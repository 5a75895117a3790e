//! Principal role enumeration.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Roles available to a principal.
///
/// Roles are ordered by privilege level:
/// SuperAdmin > Admin > Manager > Employee > Guest. All hierarchy
/// comparisons go through [`Role::level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Role {
    /// Read-mostly visitor.
    Guest,
    /// Regular department member.
    Employee,
    /// Department manager.
    Manager,
    /// Tenant administrator.
    Admin,
    /// Platform-wide administrator.
    SuperAdmin,
}

impl Role {
    /// All roles from least to most privileged.
    pub const ALL: [Role; 5] = [
        Role::Guest,
        Role::Employee,
        Role::Manager,
        Role::Admin,
        Role::SuperAdmin,
    ];

    /// Return the numeric privilege level (higher = more privileged).
    pub const fn level(&self) -> u8 {
        match self {
            Self::Guest => 20,
            Self::Employee => 40,
            Self::Manager => 60,
            Self::Admin => 80,
            Self::SuperAdmin => 100,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub const fn has_at_least(&self, other: Role) -> bool {
        self.level() >= other.level()
    }

    /// Check if this role is Admin or above.
    pub const fn is_admin_or_above(&self) -> bool {
        self.has_at_least(Role::Admin)
    }

    /// Return the canonical role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "Guest",
            Self::Employee => "Employee",
            Self::Manager => "Manager",
            Self::Admin => "Admin",
            Self::SuperAdmin => "SuperAdmin",
        }
    }

    /// Parse a role name, mapping anything unrecognised to [`Role::Guest`].
    ///
    /// Custom or misspelled roles fail closed at the lowest level.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Guest)
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = docvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "guest" => Ok(Self::Guest),
            "employee" => Ok(Self::Employee),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(docvault_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: Guest, Employee, Manager, Admin, SuperAdmin"
            ))),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<Role> for &'static str {
    fn from(role: Role) -> Self {
        role.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let levels: Vec<u8> = Role::ALL.iter().map(Role::level).collect();
        assert_eq!(levels, vec![20, 40, 60, 80, 100]);
    }

    #[test]
    fn test_privilege_ordering() {
        assert!(Role::SuperAdmin.has_at_least(Role::Guest));
        assert!(Role::Admin.has_at_least(Role::Admin));
        assert!(Role::Manager.has_at_least(Role::Employee));
        assert!(!Role::Employee.has_at_least(Role::Manager));
        assert!(Role::Guest < Role::Employee);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Super_Admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_unknown_role_fails_closed() {
        assert_eq!(Role::parse_lenient("Auditor"), Role::Guest);
        let role: Role = serde_json::from_str("\"ContractorPlus\"").expect("lenient");
        assert_eq!(role, Role::Guest);
    }

    #[test]
    fn test_serializes_canonical_name() {
        let json = serde_json::to_string(&Role::SuperAdmin).expect("serialize");
        assert_eq!(json, "\"SuperAdmin\"");
    }
}
