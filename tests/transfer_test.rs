//! Integration tests for move, rename, and copy.

mod helpers;

use docvault_core::ErrorKind;
use docvault_core::types::{DepartmentId, ObjectKind};
use docvault_entity::object::{FileSystemObject, Visibility};
use docvault_entity::record::ListingQuery;
use docvault_service::{CopyResult, CopyTarget, MoveResult, MoveTarget};

use helpers::path;

#[tokio::test]
async fn test_move_into_folder() {
    let vault = helpers::TestVault::new();
    let archive = vault.folder("Archive", "").await;
    let file = vault.file("q1.pdf", "", 100).await;

    let result = vault
        .services
        .transfer
        .move_object(
            &vault.ctx(&vault.owner),
            &file.clone().into(),
            &MoveTarget::folder(Some(archive.id), Visibility::Department),
        )
        .await;

    assert_eq!(result, MoveResult::Success);
    let stored = vault.api.file(file.id).await.expect("file");
    assert_eq!(stored.parent_path, path("Archive"));
    assert_eq!(stored.department_id, Some(vault.department));
}

#[tokio::test]
async fn test_duplicate_move_suggests_a_name() {
    let vault = helpers::TestVault::new();
    vault.folder("A", "").await;
    let b = vault.folder("B", "").await;
    let moving = vault.file("report.pdf", "A", 10).await;
    vault.file("report.pdf", "B", 20).await;
    vault.file("report (1).pdf", "B", 30).await;

    let result = vault
        .services
        .transfer
        .move_object(
            &vault.ctx(&vault.owner),
            &moving.clone().into(),
            &MoveTarget::folder(Some(b.id), Visibility::Department),
        )
        .await;

    assert_eq!(
        result,
        MoveResult::DuplicateConflict {
            conflicting_name: "report.pdf".to_string(),
            suggested_name: "report (2).pdf".to_string(),
        }
    );
    let stored = vault.api.file(moving.id).await.expect("file");
    assert_eq!(stored.parent_path, path("A"));

    let retry = vault
        .services
        .transfer
        .move_object(
            &vault.ctx(&vault.owner),
            &moving.into(),
            &MoveTarget::folder(Some(b.id), Visibility::Department).with_name("report (2).pdf"),
        )
        .await;
    assert!(retry.is_success());
}

#[tokio::test]
async fn test_folder_cannot_move_into_its_subfolder() {
    let vault = helpers::TestVault::new();
    let outer = vault.folder("Projects", "").await;
    let inner = vault.folder("2024", "Projects").await;

    let result = vault
        .services
        .transfer
        .move_object(
            &vault.ctx(&vault.owner),
            &outer.clone().into(),
            &MoveTarget::folder(Some(inner.id), Visibility::Department),
        )
        .await;

    let MoveResult::Failure { failure } = result else {
        panic!("expected a failure, got {result:?}");
    };
    assert_eq!(failure.kind, ErrorKind::Validation);
    let stored = vault.api.folder(outer.id).await.expect("folder");
    assert!(stored.parent_path.is_root());
}

#[tokio::test]
async fn test_cross_department_move_requires_role() {
    let vault = helpers::TestVault::new();
    let file = vault.file("handover.docx", "", 10).await;
    let elsewhere = DepartmentId::new();
    let target =
        MoveTarget::folder(None, Visibility::Department).with_department(Some(elsewhere));
    vault.api.clear_calls().await;

    let denied = vault
        .services
        .transfer
        .move_object(&vault.ctx(&vault.owner), &file.clone().into(), &target)
        .await;
    let MoveResult::Failure { failure } = denied else {
        panic!("expected a failure, got {denied:?}");
    };
    assert_eq!(failure.kind, ErrorKind::AccessDenied);
    assert_eq!(vault.api.call_count().await, 0);

    let moved = vault
        .services
        .transfer
        .move_object(&vault.ctx(&vault.admin), &file.clone().into(), &target)
        .await;
    assert_eq!(moved, MoveResult::Success);
    let stored = vault.api.file(file.id).await.expect("file");
    assert_eq!(stored.department_id, Some(elsewhere));
}

#[tokio::test]
async fn test_locked_object_is_not_moved() {
    let vault = helpers::TestVault::new();
    let archive = vault.folder("Archive", "").await;
    let file = vault.file("ledger.xlsx", "", 10).await;
    let locked = vault.lock(&file.into(), &vault.owner, None, None).await;
    vault.api.clear_calls().await;

    let result = vault
        .services
        .transfer
        .move_object(
            &vault.ctx(&vault.owner),
            &locked,
            &MoveTarget::folder(Some(archive.id), Visibility::Department),
        )
        .await;

    assert!(!result.is_success());
    assert_eq!(vault.api.call_count().await, 0);
}

#[tokio::test]
async fn test_rename_collision_suggests_a_name() {
    let vault = helpers::TestVault::new();
    vault.file("minutes.txt", "", 10).await;
    let other = vault.file("draft.txt", "", 10).await;

    let result = vault
        .services
        .transfer
        .rename(&vault.ctx(&vault.owner), &other.into(), "minutes.txt")
        .await;

    assert_eq!(
        result,
        MoveResult::DuplicateConflict {
            conflicting_name: "minutes.txt".to_string(),
            suggested_name: "minutes (1).txt".to_string(),
        }
    );
}

#[tokio::test]
async fn test_copy_folder_is_refused_without_a_call() {
    let vault = helpers::TestVault::new();
    let folder = vault.folder("Templates", "").await;
    vault.api.clear_calls().await;

    let target = CopyTarget {
        path: path(""),
        visibility: Visibility::Department,
        department_id: Some(vault.department),
        new_name: None,
    };
    let result = vault
        .services
        .transfer
        .copy(&vault.ctx(&vault.owner), &folder.into(), &target)
        .await;

    assert_eq!(
        result,
        CopyResult::NotCopyable {
            kind: ObjectKind::Folder
        }
    );
    assert_eq!(vault.api.call_count().await, 0);
}

#[tokio::test]
async fn test_copy_file_into_folder() {
    let vault = helpers::TestVault::new();
    vault.folder("Shared", "").await;
    let file = vault.file("logo.png", "", 2048).await;

    let target = CopyTarget {
        path: path("Shared"),
        visibility: Visibility::Department,
        department_id: Some(vault.department),
        new_name: None,
    };
    let result = vault
        .services
        .transfer
        .copy(&vault.ctx(&vault.colleague), &FileSystemObject::from(file.clone()), &target)
        .await;

    let CopyResult::Copied { file: copy } = result else {
        panic!("expected a copy, got {result:?}");
    };
    assert_ne!(copy.id, file.id);
    assert_eq!(copy.meta.name, "logo.png");
    assert_eq!(copy.meta.owner_id, vault.colleague.id);
    assert_eq!(copy.size_bytes, 2048);
    assert_eq!(copy.parent_path, path("Shared"));
}

#[tokio::test]
async fn test_renaming_folder_leaves_private_namesake_alone() {
    let vault = helpers::TestVault::new();
    let shared = vault.folder("Docs", "").await;
    vault.file("minutes.txt", "Docs", 1).await;
    let (_, diary) = vault
        .private_folder_with_file(&vault.colleague, "Docs", "diary.txt")
        .await;

    let result = vault
        .services
        .transfer
        .rename(&vault.ctx(&vault.owner), &shared.into(), "Shared")
        .await;

    assert_eq!(result, MoveResult::Success);
    let stored = vault.api.file(diary.id).await.expect("file");
    assert_eq!(stored.parent_path, path("Docs"));
    assert_eq!(stored.visibility, Visibility::Private);
    assert_eq!(stored.department_id, None);

    let listing = vault
        .services
        .index
        .load(
            &vault.ctx(&vault.owner),
            &ListingQuery::new(path("Shared"), vault.scope()),
        )
        .await
        .expect("listing");
    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].meta.name, "minutes.txt");
}

#[tokio::test]
async fn test_moving_folder_leaves_private_namesake_alone() {
    let vault = helpers::TestVault::new();
    let archive = vault.folder("Archive", "").await;
    let shared = vault.folder("Docs", "").await;
    let minutes = vault.file("minutes.txt", "Docs", 1).await;
    let (_, diary) = vault
        .private_folder_with_file(&vault.colleague, "Docs", "diary.txt")
        .await;

    let result = vault
        .services
        .transfer
        .move_object(
            &vault.ctx(&vault.owner),
            &shared.into(),
            &MoveTarget::folder(Some(archive.id), Visibility::Department),
        )
        .await;

    assert_eq!(result, MoveResult::Success);
    let moved = vault.api.file(minutes.id).await.expect("file");
    assert_eq!(moved.parent_path, path("Archive/Docs"));
    let untouched = vault.api.file(diary.id).await.expect("file");
    assert_eq!(untouched.parent_path, path("Docs"));
    assert_eq!(untouched.visibility, Visibility::Private);
}
