//! Timeout decorator for any [`DocumentApi`].

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use docvault_core::config::client::ClientConfig;
use docvault_core::types::{FileId, FolderId, FolderPath, GroupId, ObjectId};
use docvault_core::{AppError, AppResult};
use docvault_entity::object::VisibilityScope;
use docvault_entity::principal::Principal;
use docvault_entity::record::{
    CopyRequest, CreateFolder, CreateGroup, GroupRecord, ListingQuery, LockRequest, MoveRequest,
    ObjectRecord, UpdateGroup,
};

use super::DocumentApi;

/// Bounds every call with a timeout, reporting expiry as a retryable
/// transport error.
///
/// A timed-out call may still have been applied server-side; callers
/// reload after every mutation rather than trusting local state.
#[derive(Debug, Clone)]
pub struct TimedApi {
    /// The wrapped API.
    inner: Arc<dyn DocumentApi>,
    /// Per-call limit.
    timeout: Duration,
}

impl TimedApi {
    /// Wraps `inner` with a fixed per-call timeout.
    pub fn new(inner: Arc<dyn DocumentApi>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Wraps `inner` using the client's configured request timeout.
    pub fn from_config(inner: Arc<dyn DocumentApi>, config: &ClientConfig) -> Self {
        Self::new(inner, Duration::from_secs(config.request_timeout_seconds))
    }

    async fn guard<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = AppResult<T>> + Send,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Document API call timed out"
                );
                Err(AppError::transport(format!(
                    "{operation} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl DocumentApi for TimedApi {
    async fn list_folder(
        &self,
        actor: &Principal,
        query: &ListingQuery,
    ) -> AppResult<Vec<ObjectRecord>> {
        self.guard("list_folder", self.inner.list_folder(actor, query)).await
    }

    async fn list_groups(
        &self,
        actor: &Principal,
        query: &ListingQuery,
    ) -> AppResult<Vec<GroupRecord>> {
        self.guard("list_groups", self.inner.list_groups(actor, query)).await
    }

    async fn list_group_members(
        &self,
        actor: &Principal,
        group_id: GroupId,
    ) -> AppResult<Vec<ObjectRecord>> {
        self.guard("list_group_members", self.inner.list_group_members(actor, group_id)).await
    }

    async fn get_folder(
        &self,
        actor: &Principal,
        folder_id: FolderId,
    ) -> AppResult<ObjectRecord> {
        self.guard("get_folder", self.inner.get_folder(actor, folder_id)).await
    }

    async fn find_folder(
        &self,
        actor: &Principal,
        path: &FolderPath,
        scope: &VisibilityScope,
    ) -> AppResult<Option<ObjectRecord>> {
        self.guard("find_folder", self.inner.find_folder(actor, path, scope)).await
    }

    async fn create_folder(
        &self,
        actor: &Principal,
        req: &CreateFolder,
    ) -> AppResult<ObjectRecord> {
        self.guard("create_folder", self.inner.create_folder(actor, req)).await
    }

    async fn create_group(
        &self,
        actor: &Principal,
        req: &CreateGroup,
    ) -> AppResult<GroupRecord> {
        self.guard("create_group", self.inner.create_group(actor, req)).await
    }

    async fn update_group(
        &self,
        actor: &Principal,
        group_id: GroupId,
        req: &UpdateGroup,
    ) -> AppResult<GroupRecord> {
        self.guard("update_group", self.inner.update_group(actor, group_id, req)).await
    }

    async fn delete_group(
        &self,
        actor: &Principal,
        group_id: GroupId,
    ) -> AppResult<()> {
        self.guard("delete_group", self.inner.delete_group(actor, group_id)).await
    }

    async fn rename(
        &self,
        actor: &Principal,
        id: ObjectId,
        new_name: &str,
    ) -> AppResult<()> {
        self.guard("rename", self.inner.rename(actor, id, new_name)).await
    }

    async fn delete(
        &self,
        actor: &Principal,
        id: ObjectId,
    ) -> AppResult<()> {
        self.guard("delete", self.inner.delete(actor, id)).await
    }

    async fn lock(
        &self,
        actor: &Principal,
        id: ObjectId,
        req: &LockRequest,
    ) -> AppResult<()> {
        self.guard("lock", self.inner.lock(actor, id, req)).await
    }

    async fn unlock(
        &self,
        actor: &Principal,
        id: ObjectId,
        password: Option<&str>,
    ) -> AppResult<()> {
        self.guard("unlock", self.inner.unlock(actor, id, password)).await
    }

    async fn move_object(
        &self,
        actor: &Principal,
        id: ObjectId,
        req: &MoveRequest,
    ) -> AppResult<()> {
        self.guard("move_object", self.inner.move_object(actor, id, req)).await
    }

    async fn copy_file(
        &self,
        actor: &Principal,
        id: FileId,
        req: &CopyRequest,
    ) -> AppResult<ObjectRecord> {
        self.guard("copy_file", self.inner.copy_file(actor, id, req)).await
    }

    async fn set_starred(
        &self,
        actor: &Principal,
        id: ObjectId,
        starred: bool,
    ) -> AppResult<()> {
        self.guard("set_starred", self.inner.set_starred(actor, id, starred)).await
    }

    async fn starred_ids(
        &self,
        actor: &Principal,
    ) -> AppResult<HashSet<ObjectId>> {
        self.guard("starred_ids", self.inner.starred_ids(actor)).await
    }

    async fn add_to_group(
        &self,
        actor: &Principal,
        file_id: FileId,
        group_id: GroupId,
    ) -> AppResult<()> {
        self.guard("add_to_group", self.inner.add_to_group(actor, file_id, group_id)).await
    }

    async fn remove_from_group(
        &self,
        actor: &Principal,
        file_id: FileId,
        group_id: GroupId,
    ) -> AppResult<()> {
        self.guard("remove_from_group", self.inner.remove_from_group(actor, file_id, group_id)).await
    }
}
