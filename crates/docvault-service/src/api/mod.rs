//! The document API the core consumes.
//!
//! Transport is external: [`DocumentApi`] is the seam, [`TimedApi`] bounds
//! each call with the configured request timeout, and
//! [`MemoryDocumentApi`] is an in-process implementation of the contract.

pub mod memory;
pub mod timed;

use std::collections::HashSet;

use async_trait::async_trait;

use docvault_core::AppResult;
use docvault_core::types::{FileId, FolderId, FolderPath, GroupId, ObjectId};
use docvault_entity::object::VisibilityScope;
use docvault_entity::principal::Principal;
use docvault_entity::record::{
    CopyRequest, CreateFolder, CreateGroup, GroupRecord, ListingQuery, LockRequest, MoveRequest,
    ObjectRecord, UpdateGroup,
};

pub use memory::{MemoryDocumentApi, Snapshot};
pub use timed::TimedApi;

/// Document server endpoints.
///
/// Every call carries the acting principal. Implementations report name
/// collisions as `DuplicateConflict`, lock/role refusals as `AccessDenied`,
/// wrong unlock passwords as `InvalidPassword`, and network trouble as
/// `Transport`.
#[async_trait]
pub trait DocumentApi: Send + Sync + std::fmt::Debug + 'static {
    /// Files and folders directly under a path.
    async fn list_folder(
        &self,
        actor: &Principal,
        query: &ListingQuery,
    ) -> AppResult<Vec<ObjectRecord>>;

    /// Groups living directly under a path.
    async fn list_groups(
        &self,
        actor: &Principal,
        query: &ListingQuery,
    ) -> AppResult<Vec<GroupRecord>>;

    /// Member files of a group.
    async fn list_group_members(
        &self,
        actor: &Principal,
        group_id: GroupId,
    ) -> AppResult<Vec<ObjectRecord>>;

    /// A folder by id.
    async fn get_folder(&self, actor: &Principal, folder_id: FolderId) -> AppResult<ObjectRecord>;

    /// The folder at a full path in a scope, if one exists.
    async fn find_folder(
        &self,
        actor: &Principal,
        path: &FolderPath,
        scope: &VisibilityScope,
    ) -> AppResult<Option<ObjectRecord>>;

    async fn create_folder(&self, actor: &Principal, req: &CreateFolder)
    -> AppResult<ObjectRecord>;

    async fn create_group(&self, actor: &Principal, req: &CreateGroup) -> AppResult<GroupRecord>;

    async fn update_group(
        &self,
        actor: &Principal,
        group_id: GroupId,
        req: &UpdateGroup,
    ) -> AppResult<GroupRecord>;

    /// Delete a group, unlinking its members.
    async fn delete_group(&self, actor: &Principal, group_id: GroupId) -> AppResult<()>;

    async fn rename(&self, actor: &Principal, id: ObjectId, new_name: &str) -> AppResult<()>;

    /// Soft-delete into the trash.
    async fn delete(&self, actor: &Principal, id: ObjectId) -> AppResult<()>;

    async fn lock(&self, actor: &Principal, id: ObjectId, req: &LockRequest) -> AppResult<()>;

    async fn unlock(
        &self,
        actor: &Principal,
        id: ObjectId,
        password: Option<&str>,
    ) -> AppResult<()>;

    async fn move_object(
        &self,
        actor: &Principal,
        id: ObjectId,
        req: &MoveRequest,
    ) -> AppResult<()>;

    /// Copy a file, returning the new record.
    async fn copy_file(
        &self,
        actor: &Principal,
        id: FileId,
        req: &CopyRequest,
    ) -> AppResult<ObjectRecord>;

    async fn set_starred(&self, actor: &Principal, id: ObjectId, starred: bool) -> AppResult<()>;

    /// The actor's starred-id set.
    async fn starred_ids(&self, actor: &Principal) -> AppResult<HashSet<ObjectId>>;

    /// Link a file to a group, unlinking it from any previous group.
    async fn add_to_group(
        &self,
        actor: &Principal,
        file_id: FileId,
        group_id: GroupId,
    ) -> AppResult<()>;

    async fn remove_from_group(
        &self,
        actor: &Principal,
        file_id: FileId,
        group_id: GroupId,
    ) -> AppResult<()>;
}
