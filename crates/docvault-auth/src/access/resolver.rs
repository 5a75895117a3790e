//! Access resolver for lock bypass and ownership-gated actions.
//!
//! Lock bypass resolution order:
//! 1. Unlocked: nothing to bypass.
//! 2. Locker: whoever placed the lock, regardless of role.
//! 3. Owner: the object's owner, regardless of role.
//! 4. Role: role level at or above the lock's required role
//!    (`SuperAdmin` when the lock does not name one).
//!
//! Every decision here is a pure function of the principal and the object.

use serde::{Deserialize, Serialize};

use docvault_core::config::OperationsConfig;
use docvault_core::{AppError, AppResult};
use docvault_entity::object::{FileSystemObject, Lockable};
use docvault_entity::principal::{Principal, Role};

use super::flags::CapabilityFlags;

/// Why a principal may (or may not) bypass a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassSource {
    /// The object is not locked.
    Unlocked,
    /// The principal placed the lock.
    Locker,
    /// The principal owns the object.
    Owner,
    /// The principal's role meets the lock's requirement.
    Role,
    /// No rule applies.
    Denied,
}

impl BypassSource {
    /// Whether this source grants the bypass.
    pub fn is_granted(&self) -> bool {
        !matches!(self, Self::Denied)
    }
}

/// Decides lock bypass, delete, move, share, and scope-crossing rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessResolver {
    /// Minimum role for moves across department boundaries.
    cross_scope_min_role: Role,
}

impl AccessResolver {
    /// Creates a resolver with the given cross-department role gate.
    pub fn new(cross_scope_min_role: Role) -> Self {
        Self {
            cross_scope_min_role,
        }
    }

    /// Builds a resolver from operations configuration.
    pub fn from_config(config: &OperationsConfig) -> AppResult<Self> {
        let role = config.cross_scope_min_role.parse::<Role>().map_err(|e| {
            AppError::configuration(format!(
                "operations.cross_scope_min_role is invalid: {}",
                e.message
            ))
        })?;
        Ok(Self::new(role))
    }

    /// The configured cross-department gate.
    pub fn cross_scope_min_role(&self) -> Role {
        self.cross_scope_min_role
    }

    /// Resolves which rule, if any, lets `principal` bypass the object's lock.
    pub fn resolve_bypass<O: Lockable + ?Sized>(
        &self,
        principal: &Principal,
        object: &O,
    ) -> BypassSource {
        let Some(lock) = object.lock() else {
            return BypassSource::Unlocked;
        };
        if principal.id == lock.locked_by {
            BypassSource::Locker
        } else if principal.id == object.owner_id() {
            BypassSource::Owner
        } else if principal.role.has_at_least(lock.effective_required_role()) {
            BypassSource::Role
        } else {
            BypassSource::Denied
        }
    }

    /// Whether the principal may act on the object despite its lock.
    pub fn can_bypass_lock<O: Lockable + ?Sized>(&self, principal: &Principal, object: &O) -> bool {
        self.resolve_bypass(principal, object).is_granted()
    }

    /// Locked objects are never deletable. Otherwise Admin or the owner.
    pub fn can_delete<O: Lockable + ?Sized>(&self, principal: &Principal, object: &O) -> bool {
        if object.lock().is_some() {
            return false;
        }
        principal.role.has_at_least(Role::Admin) || principal.id == object.owner_id()
    }

    /// Anything unlocked can be moved by anyone.
    pub fn can_move<O: Lockable + ?Sized>(&self, object: &O) -> bool {
        object.lock().is_none()
    }

    /// Manager or above, or the owner.
    pub fn can_share<O: Lockable + ?Sized>(&self, principal: &Principal, object: &O) -> bool {
        principal.role.has_at_least(Role::Manager) || principal.id == object.owner_id()
    }

    /// Whether the principal may move objects across department boundaries.
    pub fn can_cross_scope(&self, principal: &Principal) -> bool {
        principal.role.has_at_least(self.cross_scope_min_role)
    }

    /// The role that would satisfy the object's lock, if it is locked.
    pub fn required_role<O: Lockable + ?Sized>(&self, object: &O) -> Option<Role> {
        object.lock().map(|lock| lock.effective_required_role())
    }

    /// Derived capability flags for the presentation layer.
    pub fn capabilities(&self, principal: &Principal, object: &FileSystemObject) -> CapabilityFlags {
        let descriptor = object.capabilities();
        let bypass = self.can_bypass_lock(principal, object);
        let locked = object.is_locked();
        CapabilityFlags {
            can_delete: self.can_delete(principal, object),
            can_move: descriptor.movable && self.can_move(object),
            can_share: self.can_share(principal, object),
            can_copy: descriptor.copyable && bypass,
            can_rename: bypass,
            can_lock: descriptor.lockable && !locked,
            is_locked_for_me: locked && !bypass,
        }
    }
}

impl Default for AccessResolver {
    fn default() -> Self {
        Self::new(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::types::{FolderPath, UserId};
    use docvault_entity::file::File;
    use docvault_entity::object::{LockInfo, ObjectMeta};

    fn principal(role: Role) -> Principal {
        Principal::new(UserId::new(), role)
    }

    fn file_owned_by(owner: UserId) -> FileSystemObject {
        File::new(ObjectMeta::new("plan.docx", owner, ""), FolderPath::root()).into()
    }

    fn locked(mut object: FileSystemObject, by: UserId, requires: Option<Role>) -> FileSystemObject {
        object.meta_mut().lock = Some(LockInfo::new(by, requires, false));
        object
    }

    #[test]
    fn test_owner_and_locker_always_bypass() {
        let guest_owner = principal(Role::Guest);
        let guest_locker = principal(Role::Guest);
        let object = locked(file_owned_by(guest_owner.id), guest_locker.id, None);
        let resolver = AccessResolver::default();

        assert_eq!(resolver.resolve_bypass(&guest_owner, &object), BypassSource::Owner);
        assert_eq!(resolver.resolve_bypass(&guest_locker, &object), BypassSource::Locker);
    }

    #[test]
    fn test_required_role_scenario() {
        let resolver = AccessResolver::default();
        let employee = principal(Role::Employee);
        let object = locked(file_owned_by(UserId::new()), UserId::new(), Some(Role::Manager));

        assert!(!resolver.can_bypass_lock(&employee, &object));
        assert!(resolver.can_bypass_lock(&principal(Role::Admin), &object));

        let relaxed = locked(file_owned_by(UserId::new()), UserId::new(), Some(Role::Employee));
        assert!(resolver.can_bypass_lock(&employee, &relaxed));
    }

    #[test]
    fn test_unset_requirement_means_super_admin() {
        let resolver = AccessResolver::default();
        let object = locked(file_owned_by(UserId::new()), UserId::new(), None);
        assert!(!resolver.can_bypass_lock(&principal(Role::Admin), &object));
        assert!(resolver.can_bypass_lock(&principal(Role::SuperAdmin), &object));
    }

    #[test]
    fn test_locked_objects_are_never_deletable() {
        let resolver = AccessResolver::default();
        let owner = principal(Role::SuperAdmin);
        let object = locked(file_owned_by(owner.id), owner.id, None);
        assert!(!resolver.can_delete(&owner, &object));
        assert!(!resolver.can_delete(&principal(Role::Admin), &object));
    }

    #[test]
    fn test_delete_requires_admin_or_owner() {
        let resolver = AccessResolver::default();
        let owner = principal(Role::Guest);
        let object = file_owned_by(owner.id);
        assert!(resolver.can_delete(&owner, &object));
        assert!(resolver.can_delete(&principal(Role::Admin), &object));
        assert!(!resolver.can_delete(&principal(Role::Manager), &object));
    }

    #[test]
    fn test_move_depends_only_on_lock() {
        let resolver = AccessResolver::default();
        let unlocked = file_owned_by(UserId::new());
        assert!(resolver.can_move(&unlocked));

        let owner = principal(Role::SuperAdmin);
        let object = locked(file_owned_by(owner.id), owner.id, Some(Role::Guest));
        assert!(!resolver.can_move(&object));
    }

    #[test]
    fn test_share_and_cross_scope() {
        let resolver = AccessResolver::default();
        let object = file_owned_by(UserId::new());
        assert!(resolver.can_share(&principal(Role::Manager), &object));
        assert!(!resolver.can_share(&principal(Role::Employee), &object));
        assert!(resolver.can_cross_scope(&principal(Role::Admin)));
        assert!(!resolver.can_cross_scope(&principal(Role::Manager)));
    }

    #[test]
    fn test_from_config_rejects_unknown_role() {
        let mut config = OperationsConfig::default();
        assert_eq!(
            AccessResolver::from_config(&config).expect("default").cross_scope_min_role(),
            Role::Admin
        );
        config.cross_scope_min_role = "Overlord".into();
        assert!(AccessResolver::from_config(&config).is_err());
    }

    #[test]
    fn test_capabilities_for_locked_file() {
        let resolver = AccessResolver::default();
        let viewer = principal(Role::Employee);
        let object = locked(file_owned_by(UserId::new()), UserId::new(), Some(Role::Manager));
        let flags = resolver.capabilities(&viewer, &object);
        assert!(flags.is_locked_for_me);
        assert!(!flags.can_delete && !flags.can_move && !flags.can_copy && !flags.can_rename);
        assert!(!flags.can_lock);
    }
}
