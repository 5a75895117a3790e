//! Lock state carried by any lockable object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docvault_core::types::UserId;

use crate::principal::Role;

/// An active lock on a file, folder, or group.
///
/// Absence of a `LockInfo` means the object is unlocked. The password
/// itself is never held here, only whether one is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// The user who placed the lock.
    pub locked_by: UserId,
    /// When the lock was placed.
    pub locked_at: DateTime<Utc>,
    /// Minimum role allowed to bypass the lock, if relaxed.
    #[serde(default)]
    pub requires_role: Option<Role>,
    /// Whether an unlock password is configured.
    #[serde(default)]
    pub has_password: bool,
}

impl LockInfo {
    /// Create a lock held by `locked_by` as of now.
    pub fn new(locked_by: UserId, requires_role: Option<Role>, has_password: bool) -> Self {
        Self {
            locked_by,
            locked_at: Utc::now(),
            requires_role,
            has_password,
        }
    }

    /// The role level needed to bypass this lock.
    ///
    /// Without an explicit requirement only `SuperAdmin` qualifies.
    pub fn effective_required_role(&self) -> Role {
        self.requires_role.unwrap_or(Role::SuperAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_required_role_is_super_admin() {
        let lock = LockInfo::new(UserId::new(), None, false);
        assert_eq!(lock.effective_required_role(), Role::SuperAdmin);

        let relaxed = LockInfo::new(UserId::new(), Some(Role::Manager), true);
        assert_eq!(relaxed.effective_required_role(), Role::Manager);
    }
}
