//! Move, rename, and copy with duplicate-name suggestions.

use std::sync::Arc;

use tracing::{info, warn};

use docvault_auth::{AccessResolver, RbacEnforcer};
use docvault_core::config::OperationsConfig;
use docvault_core::types::{DepartmentId, FolderId, FolderPath, ObjectKind};
use docvault_core::{AppError, AppResult, ErrorKind};
use docvault_entity::file::File;
use docvault_entity::folder::Folder;
use docvault_entity::object::{
    FileSystemObject, Visibility, VisibilityScope, crosses_department,
};
use docvault_entity::principal::Role;
use docvault_entity::record::{CopyRequest, ListingQuery, MoveRequest};

use super::naming::suggest_at;
use super::outcome::{CopyResult, MoveResult, MoveTarget};
use crate::api::DocumentApi;
use crate::context::RequestContext;
use crate::index::normalize::normalize_record;

/// Where a copy goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    /// Destination folder path.
    pub path: FolderPath,
    pub visibility: Visibility,
    pub department_id: Option<DepartmentId>,
    /// Name of the copy; defaults to the source name.
    pub new_name: Option<String>,
}

/// Relocates, renames, and copies objects.
#[derive(Debug, Clone)]
pub struct MoveCopyEngine {
    /// Document API.
    api: Arc<dyn DocumentApi>,
    /// Access rules.
    resolver: AccessResolver,
    /// Role gate for department crossings.
    rbac: RbacEnforcer,
    /// Suffix limit for suggestions.
    config: OperationsConfig,
}

impl MoveCopyEngine {
    /// Creates a new engine.
    pub fn new(api: Arc<dyn DocumentApi>, resolver: AccessResolver, config: OperationsConfig) -> Self {
        Self {
            api,
            resolver,
            rbac: RbacEnforcer::new(),
            config,
        }
    }

    /// Move an object into a folder (or the root), optionally renaming it.
    ///
    /// Moving a group changes only where the group lives; its members stay
    /// where they are.
    pub async fn move_object(
        &self,
        ctx: &RequestContext,
        object: &FileSystemObject,
        target: &MoveTarget,
    ) -> MoveResult {
        if !object.capabilities().movable {
            return MoveResult::failed(AppError::validation(format!(
                "A {} cannot be moved",
                object.kind()
            )));
        }
        if !self.resolver.can_move(object) {
            warn!(user_id = %ctx.user_id(), object_id = %object.id(), "Move refused: object is locked");
            return MoveResult::failed(AppError::access_denied(format!(
                "'{}' is locked and cannot be moved",
                object.name()
            )));
        }
        if let (Some(parent), Some(folder)) = (target.parent, object.as_folder())
            && parent == folder.id
        {
            return MoveResult::failed(AppError::validation(format!(
                "'{}' cannot be moved into itself",
                object.name()
            )));
        }

        let destination = match self.resolve_destination(ctx, target.parent).await {
            Ok(path) => path,
            Err(e) => return MoveResult::failed(e),
        };
        if let Some(folder) = object.as_folder() {
            match folder.full_path() {
                Ok(own) if destination.is_within(&own) => {
                    return MoveResult::failed(AppError::validation(format!(
                        "'{}' cannot be moved into one of its own subfolders",
                        object.name()
                    )));
                }
                Ok(_) => {}
                Err(e) => return MoveResult::failed(e),
            }
        }

        // A group only changes folder; its scope and members stay put.
        let (visibility, department_id) = match object.as_group() {
            Some(group) => (group.visibility, group.department_id),
            None => (
                target.visibility,
                self.target_department(ctx, object, target.visibility, target.department_id),
            ),
        };
        if let Err(e) = self.check_cross_scope(ctx, object.department_id(), department_id) {
            return MoveResult::failed(e);
        }

        let name = target
            .new_name
            .clone()
            .unwrap_or_else(|| object.name().to_string());
        let req = MoveRequest {
            target_path: destination.clone(),
            visibility,
            department_id,
            new_name: target.new_name.clone(),
        };
        match self.api.move_object(&ctx.principal, object.id(), &req).await {
            Ok(()) => {
                info!(
                    user_id = %ctx.user_id(),
                    object_id = %object.id(),
                    destination = %destination,
                    "Object moved"
                );
                MoveResult::Success
            }
            Err(e) if e.is(ErrorKind::DuplicateConflict) => {
                let scope = VisibilityScope::of(visibility, department_id);
                let suggested_name = self
                    .suggest(ctx, object.kind(), &name, &destination, scope)
                    .await;
                warn!(
                    user_id = %ctx.user_id(),
                    object_id = %object.id(),
                    conflicting_name = %name,
                    suggested_name = %suggested_name,
                    "Move hit a duplicate name"
                );
                MoveResult::DuplicateConflict {
                    conflicting_name: name,
                    suggested_name,
                }
            }
            Err(e) => {
                warn!(user_id = %ctx.user_id(), object_id = %object.id(), error = %e, "Move failed");
                MoveResult::failed(e)
            }
        }
    }

    /// Drop onto a folder: a move into it within the current visibility.
    pub async fn drop_on_folder(
        &self,
        ctx: &RequestContext,
        object: &FileSystemObject,
        folder: &Folder,
        visibility: Visibility,
    ) -> MoveResult {
        self.move_object(ctx, object, &MoveTarget::folder(Some(folder.id), visibility))
            .await
    }

    /// Drop onto the root breadcrumb.
    pub async fn drop_on_root(
        &self,
        ctx: &RequestContext,
        object: &FileSystemObject,
        visibility: Visibility,
    ) -> MoveResult {
        self.move_object(ctx, object, &MoveTarget::folder(None, visibility))
            .await
    }

    /// Rename in place. Requires lock bypass.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        object: &FileSystemObject,
        new_name: &str,
    ) -> MoveResult {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return MoveResult::failed(AppError::validation("Name cannot be empty"));
        }
        if new_name == object.name() {
            return MoveResult::Success;
        }
        if !self.resolver.can_bypass_lock(&ctx.principal, object) {
            let role = self.resolver.required_role(object).unwrap_or(Role::SuperAdmin);
            return MoveResult::failed(AppError::access_denied(format!(
                "'{}' is locked; renaming requires role {role} or above",
                object.name()
            )));
        }

        match self.api.rename(&ctx.principal, object.id(), new_name).await {
            Ok(()) => {
                info!(
                    user_id = %ctx.user_id(),
                    object_id = %object.id(),
                    new_name = %new_name,
                    "Object renamed"
                );
                MoveResult::Success
            }
            Err(e) if e.is(ErrorKind::DuplicateConflict) => {
                let suggested_name = self
                    .suggest(ctx, object.kind(), new_name, object.parent_path(), object.scope())
                    .await;
                MoveResult::DuplicateConflict {
                    conflicting_name: new_name.to_string(),
                    suggested_name,
                }
            }
            Err(e) => {
                warn!(user_id = %ctx.user_id(), object_id = %object.id(), error = %e, "Rename failed");
                MoveResult::failed(e)
            }
        }
    }

    /// Copy a file. Folders and groups are refused before any call.
    ///
    /// A locked file can only be copied by someone who can bypass its lock.
    pub async fn copy(
        &self,
        ctx: &RequestContext,
        object: &FileSystemObject,
        target: &CopyTarget,
    ) -> CopyResult {
        let file = match object {
            FileSystemObject::File(file) if object.capabilities().copyable => file,
            _ => return CopyResult::NotCopyable { kind: object.kind() },
        };
        if !self.resolver.can_bypass_lock(&ctx.principal, file) {
            return CopyResult::failed(AppError::access_denied(format!(
                "'{}' is locked and cannot be copied",
                file.meta.name
            )));
        }

        let department_id = self.target_department(ctx, object, target.visibility, target.department_id);
        if let Err(e) = self.check_cross_scope(ctx, file.department_id, department_id) {
            return CopyResult::failed(e);
        }

        let name = target
            .new_name
            .clone()
            .unwrap_or_else(|| file.meta.name.clone());
        let req = CopyRequest {
            target_path: target.path.clone(),
            visibility: target.visibility,
            department_id,
            new_name: target.new_name.clone(),
        };
        match self.api.copy_file(&ctx.principal, file.id, &req).await {
            Ok(record) => match normalize_record(&record, &target.path) {
                Ok(FileSystemObject::File(copy)) => {
                    info!(
                        user_id = %ctx.user_id(),
                        source_id = %file.id,
                        file_id = %copy.id,
                        destination = %target.path,
                        "File copied"
                    );
                    CopyResult::Copied { file: copy }
                }
                Ok(_) => CopyResult::failed(AppError::internal("Copy returned a non-file record")),
                Err(e) => CopyResult::failed(e),
            },
            Err(e) if e.is(ErrorKind::DuplicateConflict) => {
                let scope = VisibilityScope::of(target.visibility, department_id);
                let suggested_name = self
                    .suggest(ctx, ObjectKind::File, &name, &target.path, scope)
                    .await;
                CopyResult::DuplicateConflict {
                    conflicting_name: name,
                    suggested_name,
                }
            }
            Err(e) => {
                warn!(user_id = %ctx.user_id(), file_id = %file.id, error = %e, "Copy failed");
                CopyResult::failed(e)
            }
        }
    }

    /// Copy a file into the folder it already lives in, under a free name.
    pub async fn duplicate(&self, ctx: &RequestContext, file: &File) -> CopyResult {
        let object = FileSystemObject::File(file.clone());
        let scope = object.scope();
        let name = self
            .suggest(ctx, ObjectKind::File, &file.meta.name, &file.parent_path, scope)
            .await;
        let target = CopyTarget {
            path: file.parent_path.clone(),
            visibility: file.visibility,
            department_id: file.department_id,
            new_name: Some(name),
        };
        self.copy(ctx, &object, &target).await
    }

    /// Resolve a destination folder id to its path.
    async fn resolve_destination(
        &self,
        ctx: &RequestContext,
        parent: Option<FolderId>,
    ) -> AppResult<FolderPath> {
        let Some(parent) = parent else {
            return Ok(FolderPath::root());
        };
        let record = self.api.get_folder(&ctx.principal, parent).await?;
        match normalize_record(&record, &FolderPath::root())? {
            FileSystemObject::Folder(folder) => folder.full_path(),
            _ => Err(AppError::not_found(format!("Folder {parent} not found"))),
        }
    }

    /// Private targets carry no department. Otherwise an explicit target
    /// wins, then the object's own department, then the caller's.
    fn target_department(
        &self,
        ctx: &RequestContext,
        object: &FileSystemObject,
        visibility: Visibility,
        requested: Option<DepartmentId>,
    ) -> Option<DepartmentId> {
        match visibility {
            Visibility::Private => None,
            Visibility::Department => requested
                .or(object.department_id())
                .or(ctx.principal.department_id),
        }
    }

    fn check_cross_scope(
        &self,
        ctx: &RequestContext,
        current: Option<DepartmentId>,
        target: Option<DepartmentId>,
    ) -> AppResult<()> {
        if crosses_department(current.or(ctx.principal.department_id), target) {
            self.rbac
                .require_minimum_role(ctx.role(), self.resolver.cross_scope_min_role())?;
        }
        Ok(())
    }

    async fn suggest(
        &self,
        ctx: &RequestContext,
        kind: ObjectKind,
        name: &str,
        path: &FolderPath,
        scope: VisibilityScope,
    ) -> String {
        let query = ListingQuery::new(path.clone(), scope);
        suggest_at(
            self.api.as_ref(),
            ctx,
            kind,
            name,
            &query,
            self.config.conflict_suffix_limit,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::types::UserId;
    use docvault_entity::object::{LockInfo, ObjectMeta};
    use docvault_entity::principal::Principal;

    use crate::api::{MemoryDocumentApi, Snapshot};

    fn ctx(role: Role) -> RequestContext {
        RequestContext::new(Principal::new(UserId::new(), role))
    }

    fn setup() -> (Arc<MemoryDocumentApi>, MoveCopyEngine) {
        let config = OperationsConfig::default();
        let api = Arc::new(MemoryDocumentApi::new(Snapshot::default(), &config));
        let engine = MoveCopyEngine::new(api.clone(), AccessResolver::default(), config);
        (api, engine)
    }

    fn file(name: &str, owner: UserId, path: &str) -> File {
        File::new(
            ObjectMeta::new(name, owner, ""),
            FolderPath::parse(path).expect("path"),
        )
    }

    #[tokio::test]
    async fn test_copy_folder_never_reaches_api() {
        let (api, engine) = setup();
        let me = ctx(Role::SuperAdmin);
        let folder = Folder::new(ObjectMeta::new("Docs", me.user_id(), ""), FolderPath::root());
        let target = CopyTarget {
            path: FolderPath::root(),
            visibility: Visibility::Department,
            department_id: None,
            new_name: None,
        };
        let result = engine.copy(&me, &folder.into(), &target).await;
        assert_eq!(
            result,
            CopyResult::NotCopyable {
                kind: ObjectKind::Folder
            }
        );
        assert_eq!(api.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_move_onto_same_name_suggests_without_renaming() {
        let (api, engine) = setup();
        let me = ctx(Role::Employee);
        let docs = Folder::new(ObjectMeta::new("Docs", me.user_id(), ""), FolderPath::root());
        api.insert_folder(docs.clone()).await;
        api.insert_file(file("a.txt", me.user_id(), "Docs")).await;
        let moving = file("a.txt", me.user_id(), "");
        api.insert_file(moving.clone()).await;

        let target = MoveTarget::folder(Some(docs.id), Visibility::Department);
        let result = engine.move_object(&me, &moving.clone().into(), &target).await;
        assert_eq!(
            result,
            MoveResult::DuplicateConflict {
                conflicting_name: "a.txt".into(),
                suggested_name: "a (1).txt".into(),
            }
        );
        let unchanged = api.file(moving.id).await.expect("file");
        assert!(unchanged.parent_path.is_root());
        assert_eq!(unchanged.meta.name, "a.txt");
    }

    #[tokio::test]
    async fn test_locked_object_is_not_moved() {
        let (api, engine) = setup();
        let me = ctx(Role::SuperAdmin);
        let mut locked = file("a.txt", me.user_id(), "");
        locked.meta.lock = Some(LockInfo::new(me.user_id(), None, false));

        let result = engine
            .drop_on_root(&me, &locked.into(), Visibility::Private)
            .await;
        assert!(matches!(result, MoveResult::Failure { ref failure } if failure.kind == ErrorKind::AccessDenied));
        assert_eq!(api.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_folder_into_own_subfolder_is_rejected() {
        let (api, engine) = setup();
        let me = ctx(Role::Employee);
        let outer = Folder::new(ObjectMeta::new("outer", me.user_id(), ""), FolderPath::root());
        let inner = Folder::new(
            ObjectMeta::new("inner", me.user_id(), ""),
            FolderPath::parse("outer").expect("path"),
        );
        api.insert_folder(outer.clone()).await;
        api.insert_folder(inner.clone()).await;

        let into_self = MoveTarget::folder(Some(outer.id), Visibility::Department);
        let result = engine.move_object(&me, &outer.clone().into(), &into_self).await;
        assert!(matches!(result, MoveResult::Failure { ref failure } if failure.kind == ErrorKind::Validation));

        let into_child = MoveTarget::folder(Some(inner.id), Visibility::Department);
        let result = engine.move_object(&me, &outer.into(), &into_child).await;
        assert!(matches!(result, MoveResult::Failure { ref failure } if failure.kind == ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_cross_department_needs_configured_role() {
        let (api, engine) = setup();
        let sales = DepartmentId::new();
        let hr = DepartmentId::new();
        let manager = ctx(Role::Manager);
        let doc = file("a.txt", manager.user_id(), "").with_department(Some(sales));
        api.insert_file(doc.clone()).await;

        let target = MoveTarget::folder(None, Visibility::Department).with_department(Some(hr));
        let result = engine.move_object(&manager, &doc.clone().into(), &target).await;
        assert!(matches!(result, MoveResult::Failure { ref failure } if failure.kind == ErrorKind::AccessDenied));

        let admin = ctx(Role::Admin);
        let result = engine.move_object(&admin, &doc.clone().into(), &target).await;
        assert!(result.is_success());
        assert_eq!(api.file(doc.id).await.expect("file").department_id, Some(hr));
    }

    #[tokio::test]
    async fn test_rename_conflict_and_locked_rename() {
        let (api, engine) = setup();
        let me = ctx(Role::Employee);
        api.insert_file(file("b.txt", me.user_id(), "")).await;
        let a = file("a.txt", me.user_id(), "");
        api.insert_file(a.clone()).await;

        let result = engine.rename(&me, &a.clone().into(), "b.txt").await;
        assert!(matches!(result, MoveResult::DuplicateConflict { ref suggested_name, .. } if suggested_name == "b (1).txt"));

        let mut locked = a.clone();
        locked.meta.lock = Some(LockInfo::new(UserId::new(), Some(Role::Manager), false));
        let result = engine.rename(&ctx(Role::Employee), &locked.into(), "c.txt").await;
        assert!(matches!(result, MoveResult::Failure { ref failure } if failure.message.contains("Manager")));
    }
}
