//! RBAC enforcement logic. Checks whether a role meets a required minimum.

use tracing::debug;

use docvault_core::{AppError, AppResult};
use docvault_entity::principal::{Principal, Role};

/// Enforces role gates and names the required role on denial so the
/// caller can show an actionable message.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Checks whether the given role is at least the specified minimum role.
    ///
    /// Role hierarchy: SuperAdmin > Admin > Manager > Employee > Guest
    pub fn require_minimum_role(&self, actual_role: Role, minimum_role: Role) -> AppResult<()> {
        if actual_role.has_at_least(minimum_role) {
            Ok(())
        } else {
            debug!(
                actual = %actual_role,
                required = %minimum_role,
                "Role gate denied"
            );
            Err(AppError::access_denied(format!(
                "Role '{actual_role}' is insufficient; minimum required: '{minimum_role}'"
            )))
        }
    }

    /// Checks the principal's role against a minimum.
    pub fn require_principal(&self, principal: &Principal, minimum_role: Role) -> AppResult<()> {
        self.require_minimum_role(principal.role, minimum_role)
    }

    /// Returns whether the role is Admin or above.
    pub fn is_admin(&self, role: Role) -> bool {
        role.is_admin_or_above()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::ErrorKind;

    #[test]
    fn test_minimum_role() {
        let rbac = RbacEnforcer::new();
        assert!(rbac.require_minimum_role(Role::Admin, Role::Manager).is_ok());
        assert!(rbac.require_minimum_role(Role::Manager, Role::Manager).is_ok());

        let err = rbac
            .require_minimum_role(Role::Employee, Role::Admin)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccessDenied);
        assert!(err.message.contains("Admin"));
    }

    #[test]
    fn test_is_admin() {
        let rbac = RbacEnforcer::new();
        assert!(rbac.is_admin(Role::SuperAdmin));
        assert!(!rbac.is_admin(Role::Manager));
    }
}
