//! Integration tests for locking and unlocking.

mod helpers;

use docvault_entity::object::FileSystemObject;
use docvault_entity::principal::Role;
use docvault_service::{LockOutcome, UnlockOutcome};

#[tokio::test]
async fn test_owner_unlocks_without_password() {
    let vault = helpers::TestVault::new();
    let file = vault.file("plan.docx", "", 10).await;
    let locked = vault
        .lock(&file.clone().into(), &vault.manager, None, None)
        .await;

    let outcome = vault
        .services
        .locks
        .unlock(&vault.ctx(&vault.owner), &locked, None)
        .await;

    assert_eq!(outcome, UnlockOutcome::Unlocked { by_password: false });
    let stored = vault.api.file(file.id).await.expect("file");
    assert!(stored.meta.lock.is_none());
}

#[tokio::test]
async fn test_role_requirement_gates_unlock() {
    let vault = helpers::TestVault::new();
    let file = vault.file("budget.xlsx", "", 10).await;
    let locked = vault
        .lock(&file.clone().into(), &vault.owner, Some(Role::Manager), None)
        .await;
    vault.api.clear_calls().await;

    let denied = vault
        .services
        .locks
        .unlock(&vault.ctx(&vault.colleague), &locked, None)
        .await;
    assert_eq!(
        denied,
        UnlockOutcome::Denied {
            required_role: Role::Manager
        }
    );
    assert_eq!(vault.api.call_count().await, 0);

    let unlocked = vault
        .services
        .locks
        .unlock(&vault.ctx(&vault.manager), &locked, None)
        .await;
    assert!(unlocked.is_unlocked());
}

#[tokio::test]
async fn test_lock_without_role_needs_super_admin() {
    let vault = helpers::TestVault::new();
    let file = vault.file("payroll.csv", "", 10).await;
    let locked = vault
        .lock(&file.clone().into(), &vault.owner, None, None)
        .await;

    let outcome = vault
        .services
        .locks
        .unlock(&vault.ctx(&vault.admin), &locked, None)
        .await;

    assert_eq!(
        outcome,
        UnlockOutcome::Denied {
            required_role: Role::SuperAdmin
        }
    );
}

#[tokio::test]
async fn test_password_unlock() {
    let vault = helpers::TestVault::new();
    let file = vault.file("contract.pdf", "", 10).await;
    let locked = vault
        .lock(&file.clone().into(), &vault.owner, None, Some("s3cret"))
        .await;
    let casey = vault.ctx(&vault.colleague);
    vault.api.clear_calls().await;

    let missing = vault.services.locks.unlock(&casey, &locked, None).await;
    assert!(missing.requires_password());
    assert_eq!(vault.api.call_count().await, 0);

    let wrong = vault
        .services
        .locks
        .unlock(&casey, &locked, Some("guess"))
        .await;
    assert!(wrong.requires_password());
    assert!(vault.api.file(file.id).await.expect("file").meta.is_locked());

    let right = vault
        .services
        .locks
        .unlock(&casey, &locked, Some("s3cret"))
        .await;
    assert_eq!(right, UnlockOutcome::Unlocked { by_password: true });
    assert!(!vault.api.file(file.id).await.expect("file").meta.is_locked());
}

#[tokio::test]
async fn test_locking_a_locked_object_is_reported() {
    let vault = helpers::TestVault::new();
    let file = vault.file("notes.txt", "", 10).await;
    let locked = vault
        .lock(&file.clone().into(), &vault.owner, None, None)
        .await;
    vault.api.clear_calls().await;

    let outcome = vault
        .services
        .locks
        .lock(&vault.ctx(&vault.manager), &locked, None, None)
        .await;

    assert_eq!(outcome, LockOutcome::AlreadyLocked);
    assert_eq!(vault.api.call_count().await, 0);
}

#[tokio::test]
async fn test_session_lock_updates_capabilities() {
    let vault = helpers::TestVault::new();
    let file = vault.file("roadmap.md", "", 10).await;
    let id = FileSystemObject::from(file.clone()).id();

    let mut olive = vault.session(&vault.owner).await;
    let outcome = olive
        .lock(id, Some("pw"), Some(Role::Manager))
        .await
        .expect("lock");
    assert_eq!(outcome, LockOutcome::Locked);
    let mine = olive.capabilities(id).expect("listed");
    assert!(!mine.is_locked_for_me);
    assert!(!mine.can_delete);
    assert!(!mine.can_move);
    assert!(!mine.can_lock);

    let casey = vault.session(&vault.colleague).await;
    let theirs = casey.capabilities(id).expect("listed");
    assert!(theirs.is_locked_for_me);
    assert!(!theirs.can_rename);
    assert!(!theirs.can_copy);

    let morgan = vault.session(&vault.manager).await;
    assert!(!morgan.capabilities(id).expect("listed").is_locked_for_me);
}
