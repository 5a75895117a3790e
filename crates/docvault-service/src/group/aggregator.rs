//! Groups: the merged folder listing, group CRUD, and membership.
//!
//! Membership is orthogonal to location. Adding or removing a member
//! never touches the file's `parent_path`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docvault_auth::AccessResolver;
use docvault_core::config::OperationsConfig;
use docvault_core::types::{FileId, GroupId, ObjectKind, SortSpec};
use docvault_core::{AppError, AppResult, ErrorKind};
use docvault_entity::file::File;
use docvault_entity::group::Group;
use docvault_entity::object::{Visibility, VisibilityScope};
use docvault_entity::principal::Role;
use docvault_entity::record::{CreateGroup, ListingQuery, UpdateGroup, validate_request};

use super::listing::FolderListing;
use crate::api::DocumentApi;
use crate::context::RequestContext;
use crate::index::FileSystemIndex;
use crate::index::normalize::normalize_group;
use crate::outcome::{ActionOutcome, SaveOutcome};
use crate::transfer::naming::suggest_at;

/// What opening a group yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GroupContents {
    /// Member files, ordered by the active sort.
    Members { files: FolderListing },
    /// The group is locked for this viewer. No member call was made.
    AccessDenied { required_role: Role },
}

/// A confirmed membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub file_id: FileId,
    pub group_id: GroupId,
    /// The group the file was linked to before, if any.
    pub previous_group: Option<GroupId>,
}

/// Merges groups into listings and manages group membership.
#[derive(Debug, Clone)]
pub struct GroupAggregator {
    /// Document API.
    api: Arc<dyn DocumentApi>,
    /// Read path.
    index: FileSystemIndex,
    /// Access rules.
    resolver: AccessResolver,
    /// Group cap and suggestion limit.
    config: OperationsConfig,
}

impl GroupAggregator {
    /// Creates a new aggregator.
    pub fn new(
        api: Arc<dyn DocumentApi>,
        index: FileSystemIndex,
        resolver: AccessResolver,
        config: OperationsConfig,
    ) -> Self {
        Self {
            api,
            index,
            resolver,
            config,
        }
    }

    /// The merged listing of a folder: folders, then groups, then files.
    pub async fn list_folder(
        &self,
        ctx: &RequestContext,
        query: &ListingQuery,
        sort: SortSpec,
    ) -> AppResult<FolderListing> {
        let (objects, groups) = tokio::try_join!(
            self.index.load(ctx, query),
            self.index.load_groups(ctx, query)
        )?;
        Ok(FolderListing::build(objects.folders, groups, objects.files, sort))
    }

    /// Open a group's member listing.
    ///
    /// A locked group the viewer cannot bypass is refused before the
    /// member call is issued.
    pub async fn open_group(
        &self,
        ctx: &RequestContext,
        group: &Group,
        sort: SortSpec,
    ) -> AppResult<GroupContents> {
        if !self.resolver.can_bypass_lock(&ctx.principal, group) {
            let required_role = self.resolver.required_role(group).unwrap_or(Role::SuperAdmin);
            warn!(
                user_id = %ctx.user_id(),
                group_id = %group.id,
                required_role = %required_role,
                "Group is locked for viewer"
            );
            return Ok(GroupContents::AccessDenied { required_role });
        }
        let files = self.index.load_group_members(ctx, group.id).await?;
        Ok(GroupContents::Members {
            files: FolderListing::of_files(files, sort),
        })
    }

    /// Create a group. A name already used by a group at the same path and
    /// scope is reported as a duplicate conflict with a suggestion.
    pub async fn create_group(&self, ctx: &RequestContext, mut req: CreateGroup) -> SaveOutcome<Group> {
        req.name = req.name.trim().to_string();
        if let Err(e) = validate_request(&req) {
            return SaveOutcome::Failure { failure: e.into() };
        }
        req.department_id = match req.visibility {
            Visibility::Department => req.department_id.or(ctx.principal.department_id),
            Visibility::Private => None,
        };
        let scope = VisibilityScope::of(req.visibility, req.department_id);
        let query = ListingQuery::new(req.parent_path.clone(), scope);

        match self.api.create_group(&ctx.principal, &req).await {
            Ok(record) => match normalize_group(&record, &req.parent_path) {
                Ok(group) => {
                    info!(
                        user_id = %ctx.user_id(),
                        group_id = %group.id,
                        name = %group.meta.name,
                        parent = %group.parent_path,
                        "Group created"
                    );
                    SaveOutcome::Saved { value: group }
                }
                Err(e) => SaveOutcome::Failure { failure: e.into() },
            },
            Err(e) if e.is(ErrorKind::DuplicateConflict) => {
                self.conflict(ctx, req.name, &query).await
            }
            Err(e) => {
                warn!(user_id = %ctx.user_id(), error = %e, "Failed to create group");
                SaveOutcome::Failure { failure: e.into() }
            }
        }
    }

    /// Update a group's name, description, or color.
    pub async fn update_group(
        &self,
        ctx: &RequestContext,
        group: &Group,
        req: UpdateGroup,
    ) -> SaveOutcome<Group> {
        if let Err(e) = validate_request(&req) {
            return SaveOutcome::Failure { failure: e.into() };
        }
        if !self.resolver.can_bypass_lock(&ctx.principal, group) {
            return SaveOutcome::Failure {
                failure: AppError::access_denied(format!("Group '{}' is locked", group.meta.name))
                    .into(),
            };
        }

        match self.api.update_group(&ctx.principal, group.id, &req).await {
            Ok(record) => match normalize_group(&record, &group.parent_path) {
                Ok(updated) => {
                    info!(user_id = %ctx.user_id(), group_id = %group.id, "Group updated");
                    SaveOutcome::Saved { value: updated }
                }
                Err(e) => SaveOutcome::Failure { failure: e.into() },
            },
            Err(e) if e.is(ErrorKind::DuplicateConflict) => {
                let name = req.name.unwrap_or_else(|| group.meta.name.clone());
                let query = ListingQuery::new(
                    group.parent_path.clone(),
                    VisibilityScope::of(group.visibility, group.department_id),
                );
                self.conflict(ctx, name, &query).await
            }
            Err(e) => {
                warn!(user_id = %ctx.user_id(), group_id = %group.id, error = %e, "Failed to update group");
                SaveOutcome::Failure { failure: e.into() }
            }
        }
    }

    /// Delete a group. Members are unlinked, not deleted.
    pub async fn delete_group(&self, ctx: &RequestContext, group: &Group) -> ActionOutcome {
        if !self.resolver.can_delete(&ctx.principal, group) {
            let reason = if group.meta.is_locked() {
                format!("Group '{}' is locked and cannot be deleted", group.meta.name)
            } else {
                "Only the owner or an Admin can delete this group".to_string()
            };
            let required_role = (!group.meta.is_locked()).then_some(Role::Admin);
            return ActionOutcome::Denied {
                reason,
                required_role,
            };
        }

        match self.api.delete_group(&ctx.principal, group.id).await {
            Ok(()) => {
                info!(
                    user_id = %ctx.user_id(),
                    group_id = %group.id,
                    unlinked = group.file_count,
                    "Group deleted"
                );
                ActionOutcome::Done { value: () }
            }
            Err(e) => {
                warn!(user_id = %ctx.user_id(), group_id = %group.id, error = %e, "Failed to delete group");
                ActionOutcome::failed(e)
            }
        }
    }

    /// Link `file` to `group`, re-linking it if it was in another group.
    ///
    /// On success the local copy of `group` has its aggregates bumped;
    /// the next listing replaces them with the server's numbers.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        file: &File,
        group: &mut Group,
    ) -> ActionOutcome<Membership> {
        if let Some(denied) = self.membership_gate(ctx, file, group) {
            return denied;
        }
        let membership = Membership {
            file_id: file.id,
            group_id: group.id,
            previous_group: file.group_id,
        };
        if file.group_id == Some(group.id) {
            return ActionOutcome::Done { value: membership };
        }
        if group.file_count >= self.config.max_files_per_group {
            return ActionOutcome::failed(AppError::validation(format!(
                "Group '{}' already holds the maximum of {} files",
                group.meta.name, self.config.max_files_per_group
            )));
        }
        if !group.admits_member(file) {
            return ActionOutcome::failed(AppError::validation(format!(
                "'{}' is not in the same visibility scope as group '{}'",
                file.meta.name, group.meta.name
            )));
        }

        match self.api.add_to_group(&ctx.principal, file.id, group.id).await {
            Ok(()) => {
                group.note_member_added(file.size_bytes);
                info!(
                    user_id = %ctx.user_id(),
                    file_id = %file.id,
                    group_id = %group.id,
                    previous_group = ?file.group_id,
                    "File added to group"
                );
                ActionOutcome::Done { value: membership }
            }
            Err(e) => {
                warn!(user_id = %ctx.user_id(), file_id = %file.id, group_id = %group.id, error = %e, "Failed to add file to group");
                ActionOutcome::failed(e)
            }
        }
    }

    /// Unlink `file` from `group`. The file stays where it is.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        file: &File,
        group: &mut Group,
    ) -> ActionOutcome<Membership> {
        if let Some(denied) = self.membership_gate(ctx, file, group) {
            return denied;
        }
        if file.group_id != Some(group.id) {
            return ActionOutcome::failed(AppError::validation(format!(
                "'{}' is not a member of group '{}'",
                file.meta.name, group.meta.name
            )));
        }

        match self
            .api
            .remove_from_group(&ctx.principal, file.id, group.id)
            .await
        {
            Ok(()) => {
                group.note_member_removed(file.size_bytes);
                info!(user_id = %ctx.user_id(), file_id = %file.id, group_id = %group.id, "File removed from group");
                ActionOutcome::Done {
                    value: Membership {
                        file_id: file.id,
                        group_id: group.id,
                        previous_group: Some(group.id),
                    },
                }
            }
            Err(e) => {
                warn!(user_id = %ctx.user_id(), file_id = %file.id, group_id = %group.id, error = %e, "Failed to remove file from group");
                ActionOutcome::failed(e)
            }
        }
    }

    /// Locked groups and locked-for-me files cannot change membership.
    fn membership_gate<T>(
        &self,
        ctx: &RequestContext,
        file: &File,
        group: &Group,
    ) -> Option<ActionOutcome<T>> {
        if !self.resolver.can_bypass_lock(&ctx.principal, group) {
            return Some(ActionOutcome::Denied {
                reason: format!("Group '{}' is locked", group.meta.name),
                required_role: self.resolver.required_role(group),
            });
        }
        if !self.resolver.can_bypass_lock(&ctx.principal, file) {
            return Some(ActionOutcome::Denied {
                reason: format!("'{}' is locked", file.meta.name),
                required_role: self.resolver.required_role(file),
            });
        }
        None
    }

    async fn conflict(
        &self,
        ctx: &RequestContext,
        name: String,
        query: &ListingQuery,
    ) -> SaveOutcome<Group> {
        let suggested_name = suggest_at(
            self.api.as_ref(),
            ctx,
            ObjectKind::Group,
            &name,
            query,
            self.config.conflict_suffix_limit,
        )
        .await;
        warn!(
            user_id = %ctx.user_id(),
            name = %name,
            suggested_name = %suggested_name,
            "Group name already taken"
        );
        SaveOutcome::DuplicateConflict {
            conflicting_name: name,
            suggested_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_cache::CacheManager;
    use docvault_core::types::{FolderPath, UserId};
    use docvault_entity::folder::Folder;
    use docvault_entity::group::DEFAULT_GROUP_COLOR;
    use docvault_entity::object::{LockInfo, ObjectMeta};
    use docvault_entity::principal::Principal;

    use crate::api::{MemoryDocumentApi, Snapshot};

    fn setup(config: OperationsConfig) -> (Arc<MemoryDocumentApi>, GroupAggregator, RequestContext) {
        let api = Arc::new(MemoryDocumentApi::new(Snapshot::default(), &config));
        let index = FileSystemIndex::new(api.clone(), Arc::new(CacheManager::disabled()));
        let aggregator =
            GroupAggregator::new(api.clone(), index, AccessResolver::default(), config);
        let ctx = RequestContext::new(Principal::new(UserId::new(), Role::Employee));
        (api, aggregator, ctx)
    }

    fn create_request(name: &str) -> CreateGroup {
        CreateGroup {
            name: name.into(),
            description: None,
            color: DEFAULT_GROUP_COLOR.into(),
            parent_path: FolderPath::root(),
            visibility: Visibility::Department,
            department_id: None,
        }
    }

    #[tokio::test]
    async fn test_listing_orders_folders_groups_files() {
        let (api, aggregator, ctx) = setup(OperationsConfig::default());
        api.insert_file(File::new(ObjectMeta::new("a.txt", ctx.user_id(), ""), FolderPath::root()))
            .await;
        api.insert_folder(Folder::new(ObjectMeta::new("z", ctx.user_id(), ""), FolderPath::root()))
            .await;
        aggregator
            .create_group(&ctx, create_request("m"))
            .await
            .saved()
            .expect("group");

        let query = ListingQuery::new(FolderPath::root(), VisibilityScope::department(None));
        let listing = aggregator
            .list_folder(&ctx, &query, SortSpec::default())
            .await
            .expect("listing");
        let kinds: Vec<ObjectKind> = listing.items().iter().map(|o| o.kind()).collect();
        assert_eq!(kinds, vec![ObjectKind::Folder, ObjectKind::Group, ObjectKind::File]);
    }

    #[tokio::test]
    async fn test_duplicate_group_name_is_distinct_outcome() {
        let (_, aggregator, ctx) = setup(OperationsConfig::default());
        assert!(aggregator.create_group(&ctx, create_request("Q3")).await.is_saved());
        let again = aggregator.create_group(&ctx, create_request("Q3")).await;
        assert_eq!(
            again,
            SaveOutcome::DuplicateConflict {
                conflicting_name: "Q3".into(),
                suggested_name: "Q3 (1)".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_locked_group_short_circuits_before_member_call() {
        let (api, aggregator, ctx) = setup(OperationsConfig::default());
        let mut group = Group::new(
            ObjectMeta::new("Secret", UserId::new(), ""),
            FolderPath::root(),
            DEFAULT_GROUP_COLOR,
        );
        group.meta.lock = Some(LockInfo::new(UserId::new(), Some(Role::Manager), false));
        api.insert_group(group.clone()).await;
        api.clear_calls().await;

        let contents = aggregator
            .open_group(&ctx, &group, SortSpec::default())
            .await
            .expect("open");
        assert_eq!(
            contents,
            GroupContents::AccessDenied {
                required_role: Role::Manager
            }
        );
        assert_eq!(api.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_membership_keeps_parent_path() {
        let (api, aggregator, ctx) = setup(OperationsConfig::default());
        let path = FolderPath::parse("reports").expect("path");
        api.insert_folder(Folder::new(ObjectMeta::new("reports", ctx.user_id(), ""), FolderPath::root()))
            .await;
        let file = File::new(ObjectMeta::new("q3.pdf", ctx.user_id(), ""), path.clone()).with_size(10);
        api.insert_file(file.clone()).await;
        let mut group = aggregator
            .create_group(&ctx, create_request("Q3"))
            .await
            .saved()
            .expect("group");

        let added = aggregator.add_member(&ctx, &file, &mut group).await;
        assert!(added.is_done());
        assert_eq!(group.file_count, 1);
        assert_eq!(group.total_size_bytes, 10);
        let stored = api.file(file.id).await.expect("file");
        assert_eq!(stored.parent_path, path);
        assert_eq!(stored.group_id, Some(group.id));

        let removed = aggregator.remove_member(&ctx, &stored, &mut group).await;
        assert!(removed.is_done());
        let stored = api.file(file.id).await.expect("file");
        assert_eq!(stored.parent_path, path);
        assert_eq!(stored.group_id, None);
        assert_eq!(group.file_count, 0);
    }

    #[tokio::test]
    async fn test_group_cap_fails_without_call() {
        let config = OperationsConfig {
            max_files_per_group: 1,
            ..OperationsConfig::default()
        };
        let (api, aggregator, ctx) = setup(config);
        let mut group = aggregator
            .create_group(&ctx, create_request("Tiny"))
            .await
            .saved()
            .expect("group");
        let first = File::new(ObjectMeta::new("1.txt", ctx.user_id(), ""), FolderPath::root());
        let second = File::new(ObjectMeta::new("2.txt", ctx.user_id(), ""), FolderPath::root());
        api.insert_file(first.clone()).await;
        api.insert_file(second.clone()).await;

        assert!(aggregator.add_member(&ctx, &first, &mut group).await.is_done());
        api.clear_calls().await;
        let outcome = aggregator.add_member(&ctx, &second, &mut group).await;
        assert!(matches!(outcome, ActionOutcome::Failure { ref failure } if failure.kind == ErrorKind::Validation));
        assert_eq!(api.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_group_unlinks_members() {
        let (api, aggregator, ctx) = setup(OperationsConfig::default());
        let mut group = aggregator
            .create_group(&ctx, create_request("Q3"))
            .await
            .saved()
            .expect("group");
        let file = File::new(ObjectMeta::new("a.txt", ctx.user_id(), ""), FolderPath::root());
        api.insert_file(file.clone()).await;
        assert!(aggregator.add_member(&ctx, &file, &mut group).await.is_done());

        assert!(aggregator.delete_group(&ctx, &group).await.is_done());
        let stored = api.file(file.id).await.expect("file still exists");
        assert_eq!(stored.group_id, None);
    }
}
