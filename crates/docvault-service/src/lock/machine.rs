//! Lock state machine: `Unlocked -> Locked -> Unlocked`.
//!
//! Files, folders, and groups share one code path; the object kind only
//! matters through its capability descriptor.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docvault_auth::AccessResolver;
use docvault_core::ErrorKind;
use docvault_entity::object::FileSystemObject;
use docvault_entity::principal::Role;
use docvault_entity::record::LockRequest;

use crate::api::DocumentApi;
use crate::context::RequestContext;
use crate::outcome::OperationFailure;

/// Result of a lock attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LockOutcome {
    /// The lock is now held by the caller.
    Locked,
    /// The object was already locked; nothing changed.
    AlreadyLocked,
    /// The object kind cannot carry a lock.
    NotLockable,
    /// Any other failure.
    Failure { failure: OperationFailure },
}

/// Result of an unlock attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UnlockOutcome {
    /// The lock was removed, either through a bypass rule or the password.
    Unlocked { by_password: bool },
    /// The object was not locked.
    NotLocked,
    /// A password is configured and was missing or wrong. The caller
    /// should prompt again.
    PasswordRequired { message: String },
    /// No password is configured and the caller cannot bypass the lock.
    Denied { required_role: Role },
    /// Any other failure.
    Failure { failure: OperationFailure },
}

impl UnlockOutcome {
    /// Whether the caller should re-prompt for a password.
    pub fn requires_password(&self) -> bool {
        matches!(self, Self::PasswordRequired { .. })
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked { .. })
    }
}

/// Applies lock and unlock requests.
#[derive(Debug, Clone)]
pub struct LockStateMachine {
    /// Document API.
    api: Arc<dyn DocumentApi>,
    /// Access rules.
    resolver: AccessResolver,
}

impl LockStateMachine {
    /// Creates a new lock state machine.
    pub fn new(api: Arc<dyn DocumentApi>, resolver: AccessResolver) -> Self {
        Self { api, resolver }
    }

    /// Lock an unlocked object.
    ///
    /// Any authenticated principal may lock an unlocked object. The
    /// password, if any, is sent once and never kept locally.
    pub async fn lock(
        &self,
        ctx: &RequestContext,
        object: &FileSystemObject,
        password: Option<&str>,
        requires_role: Option<Role>,
    ) -> LockOutcome {
        if !object.capabilities().lockable {
            return LockOutcome::NotLockable;
        }
        if object.is_locked() {
            return LockOutcome::AlreadyLocked;
        }

        let req = LockRequest {
            password: password.map(str::to_string),
            requires_role,
        };
        match self.api.lock(&ctx.principal, object.id(), &req).await {
            Ok(()) => {
                info!(
                    user_id = %ctx.user_id(),
                    object_id = %object.id(),
                    requires_role = ?requires_role,
                    has_password = password.is_some(),
                    "Object locked"
                );
                LockOutcome::Locked
            }
            Err(e) if e.is(ErrorKind::AlreadyLocked) => LockOutcome::AlreadyLocked,
            Err(e) => {
                warn!(user_id = %ctx.user_id(), object_id = %object.id(), error = %e, "Lock failed");
                LockOutcome::Failure { failure: e.into() }
            }
        }
    }

    /// Unlock a locked object.
    ///
    /// Owner, locker, and role-qualified callers unlock directly. Others
    /// must supply the lock password; a missing password is reported as
    /// [`UnlockOutcome::PasswordRequired`] without contacting the server.
    pub async fn unlock(
        &self,
        ctx: &RequestContext,
        object: &FileSystemObject,
        password: Option<&str>,
    ) -> UnlockOutcome {
        let Some(lock) = object.lock() else {
            return UnlockOutcome::NotLocked;
        };

        let via = self.resolver.resolve_bypass(&ctx.principal, object);
        let password = if via.is_granted() {
            None
        } else if !lock.has_password {
            warn!(
                user_id = %ctx.user_id(),
                object_id = %object.id(),
                required_role = %lock.effective_required_role(),
                "Unlock denied"
            );
            return UnlockOutcome::Denied {
                required_role: lock.effective_required_role(),
            };
        } else {
            match password {
                Some(p) if !p.is_empty() => Some(p),
                _ => {
                    return UnlockOutcome::PasswordRequired {
                        message: format!("A password is required to unlock '{}'", object.name()),
                    };
                }
            }
        };

        match self.api.unlock(&ctx.principal, object.id(), password).await {
            Ok(()) => {
                info!(user_id = %ctx.user_id(), object_id = %object.id(), via = ?via, "Object unlocked");
                UnlockOutcome::Unlocked {
                    by_password: password.is_some(),
                }
            }
            Err(e) => match e.kind {
                ErrorKind::InvalidPassword => UnlockOutcome::PasswordRequired { message: e.message },
                ErrorKind::NotLocked => UnlockOutcome::NotLocked,
                ErrorKind::AccessDenied => UnlockOutcome::Denied {
                    required_role: lock.effective_required_role(),
                },
                _ => {
                    warn!(user_id = %ctx.user_id(), object_id = %object.id(), error = %e, "Unlock failed");
                    UnlockOutcome::Failure { failure: e.into() }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::config::OperationsConfig;
    use docvault_core::types::{FolderPath, UserId};
    use docvault_entity::file::File;
    use docvault_entity::group::{DEFAULT_GROUP_COLOR, Group};
    use docvault_entity::object::{LockInfo, ObjectMeta};
    use docvault_entity::principal::Principal;

    use crate::api::{MemoryDocumentApi, Snapshot};

    fn ctx(role: Role) -> RequestContext {
        RequestContext::new(Principal::new(UserId::new(), role))
    }

    async fn setup(owner: UserId) -> (Arc<MemoryDocumentApi>, LockStateMachine, File) {
        let api = Arc::new(MemoryDocumentApi::new(
            Snapshot::default(),
            &OperationsConfig::default(),
        ));
        let file = File::new(ObjectMeta::new("plan.docx", owner, ""), FolderPath::root());
        api.insert_file(file.clone()).await;
        let machine = LockStateMachine::new(api.clone(), AccessResolver::default());
        (api, machine, file)
    }

    #[tokio::test]
    async fn test_lock_then_relock_is_rejected() {
        let me = ctx(Role::Employee);
        let (api, machine, file) = setup(me.user_id()).await;
        let object = FileSystemObject::from(file.clone());

        let outcome = machine.lock(&me, &object, None, None).await;
        assert_eq!(outcome, LockOutcome::Locked);

        let fresh = FileSystemObject::from(api.file(file.id).await.expect("file"));
        assert_eq!(machine.lock(&me, &fresh, None, None).await, LockOutcome::AlreadyLocked);
        // A stale local copy still hits the server-side rule.
        assert_eq!(machine.lock(&me, &object, None, None).await, LockOutcome::AlreadyLocked);
    }

    #[tokio::test]
    async fn test_missing_password_requires_prompt_without_call() {
        let (api, machine, file) = setup(UserId::new()).await;
        api.seed_lock(file.id.into(), LockInfo::new(UserId::new(), None, true), Some("s3cret"))
            .await
            .expect("seed");
        let object = FileSystemObject::from(api.file(file.id).await.expect("file"));
        api.clear_calls().await;

        let outcome = machine.unlock(&ctx(Role::Employee), &object, None).await;
        assert!(outcome.requires_password());
        assert_eq!(api.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_wrong_password_reprompts_and_right_one_unlocks() {
        let (api, machine, file) = setup(UserId::new()).await;
        api.seed_lock(file.id.into(), LockInfo::new(UserId::new(), None, true), Some("s3cret"))
            .await
            .expect("seed");
        let object = FileSystemObject::from(api.file(file.id).await.expect("file"));
        let stranger = ctx(Role::Employee);

        let outcome = machine.unlock(&stranger, &object, Some("guess")).await;
        assert!(outcome.requires_password());

        let outcome = machine.unlock(&stranger, &object, Some("s3cret")).await;
        assert_eq!(outcome, UnlockOutcome::Unlocked { by_password: true });
        assert!(!api.file(file.id).await.expect("file").meta.is_locked());
    }

    #[tokio::test]
    async fn test_no_password_and_no_bypass_names_role() {
        let (api, machine, file) = setup(UserId::new()).await;
        api.seed_lock(
            file.id.into(),
            LockInfo::new(UserId::new(), Some(Role::Manager), false),
            None,
        )
        .await
        .expect("seed");
        let object = FileSystemObject::from(api.file(file.id).await.expect("file"));

        let outcome = machine.unlock(&ctx(Role::Employee), &object, None).await;
        assert_eq!(
            outcome,
            UnlockOutcome::Denied {
                required_role: Role::Manager
            }
        );
        let outcome = machine.unlock(&ctx(Role::Admin), &object, None).await;
        assert_eq!(outcome, UnlockOutcome::Unlocked { by_password: false });
    }

    #[tokio::test]
    async fn test_groups_use_the_same_machine() {
        let me = ctx(Role::Guest);
        let (api, machine, _) = setup(me.user_id()).await;
        let group = Group::new(
            ObjectMeta::new("Invoices", me.user_id(), ""),
            FolderPath::root(),
            DEFAULT_GROUP_COLOR,
        );
        api.insert_group(group.clone()).await;

        let object = FileSystemObject::from(group.clone());
        assert_eq!(machine.lock(&me, &object, None, None).await, LockOutcome::Locked);
        let locked = FileSystemObject::from(api.group(group.id).await.expect("group"));
        assert_eq!(
            machine.unlock(&me, &locked, None).await,
            UnlockOutcome::Unlocked { by_password: false }
        );
    }

    #[tokio::test]
    async fn test_unlocking_unlocked_object() {
        let (_, machine, file) = setup(UserId::new()).await;
        let object = FileSystemObject::from(file);
        assert_eq!(
            machine.unlock(&ctx(Role::SuperAdmin), &object, None).await,
            UnlockOutcome::NotLocked
        );
    }
}
