//! The state owner between the presentation layer and the services.
//!
//! A session holds the visible listing, the navigation stack, the
//! selection, and the one-file clipboard. After anything that may have
//! changed server state, the listing is replaced by a fresh load rather
//! than patched.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use docvault_auth::CapabilityFlags;
use docvault_core::types::{FolderId, FolderPath, GroupId, ObjectId, SortSpec};
use docvault_core::{AppError, AppResult};
use docvault_entity::file::File;
use docvault_entity::folder::Folder;
use docvault_entity::group::Group;
use docvault_entity::object::{FileSystemObject, VisibilityScope};
use docvault_entity::principal::Role;
use docvault_entity::record::{CreateFolder, CreateGroup, ListingQuery};

use crate::bulk::BulkOutcome;
use crate::context::RequestContext;
use crate::group::{FolderListing, GroupContents, Membership};
use crate::index::StarOutcome;
use crate::lock::{LockOutcome, UnlockOutcome};
use crate::outcome::{ActionOutcome, SaveOutcome};
use crate::services::Services;
use crate::transfer::{CopyResult, CopyTarget, MoveResult, MoveTarget};

/// One level of the navigation stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavEntry {
    Folder { path: FolderPath },
    /// Inside a group. The folder path underneath is unchanged.
    Group { group: Group },
}

/// A browsing session for one principal.
#[derive(Debug)]
pub struct BrowserSession {
    ctx: RequestContext,
    services: Services,
    scope: VisibilityScope,
    sort: SortSpec,
    /// Never empty; the bottom entry is the root folder.
    stack: Vec<NavEntry>,
    listing: FolderListing,
    selection: HashSet<ObjectId>,
    clipboard: Option<File>,
}

impl BrowserSession {
    /// Open a session at the root of `scope` and load the first listing.
    pub async fn open(
        services: Services,
        ctx: RequestContext,
        scope: VisibilityScope,
        sort: SortSpec,
    ) -> AppResult<Self> {
        let mut session = Self {
            ctx,
            services,
            scope,
            sort,
            stack: vec![NavEntry::Folder {
                path: FolderPath::root(),
            }],
            listing: FolderListing::default(),
            selection: HashSet::new(),
            clipboard: None,
        };
        session.reload().await?;
        Ok(session)
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    pub fn listing(&self) -> &FolderListing {
        &self.listing
    }

    pub fn scope(&self) -> VisibilityScope {
        self.scope
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn stack(&self) -> &[NavEntry] {
        &self.stack
    }

    pub fn clipboard(&self) -> Option<&File> {
        self.clipboard.as_ref()
    }

    pub fn selection(&self) -> &HashSet<ObjectId> {
        &self.selection
    }

    /// The folder being browsed. Entering a group does not change it.
    pub fn current_path(&self) -> FolderPath {
        self.stack
            .iter()
            .rev()
            .find_map(|entry| match entry {
                NavEntry::Folder { path } => Some(path.clone()),
                NavEntry::Group { .. } => None,
            })
            .unwrap_or_default()
    }

    /// The group being browsed, if any.
    pub fn current_group(&self) -> Option<&Group> {
        match self.stack.last() {
            Some(NavEntry::Group { group }) => Some(group),
            _ => None,
        }
    }

    /// Replace the listing with a fresh load for the top of the stack.
    pub async fn reload(&mut self) -> AppResult<()> {
        let listing = match self.stack.last() {
            Some(NavEntry::Group { group }) => {
                match self.services.groups.open_group(&self.ctx, group, self.sort).await? {
                    GroupContents::Members { files } => files,
                    GroupContents::AccessDenied { required_role } => {
                        return Err(AppError::access_denied(format!(
                            "Group '{}' requires {required_role}",
                            group.meta.name
                        )));
                    }
                }
            }
            _ => {
                let query = ListingQuery::new(self.current_path(), self.scope);
                self.services
                    .groups
                    .list_folder(&self.ctx, &query, self.sort)
                    .await?
            }
        };
        self.selection.retain(|id| listing.find(*id).is_some());
        debug!(
            user_id = %self.ctx.user_id(),
            path = %self.current_path(),
            items = listing.len(),
            "Listing reloaded"
        );
        self.listing = listing;
        Ok(())
    }

    /// Go to `path` in the current scope.
    pub async fn navigate(&mut self, path: FolderPath) -> AppResult<()> {
        self.stack.push(NavEntry::Folder { path });
        if let Err(e) = self.reload().await {
            self.stack.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Open a folder from the current listing.
    pub async fn enter_folder(&mut self, id: FolderId) -> AppResult<()> {
        let folder = self
            .listing
            .folders()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} is not in the current listing")))?;
        let path = folder.full_path()?;
        self.navigate(path).await
    }

    /// Enter a group from the current listing.
    ///
    /// A group locked for this principal is refused before its members are
    /// requested, and the stack is left as it was.
    pub async fn enter_group(&mut self, id: GroupId) -> AppResult<GroupContents> {
        let group = self
            .listing
            .groups()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Group {id} is not in the current listing")))?;

        let contents = self
            .services
            .groups
            .open_group(&self.ctx, &group, self.sort)
            .await?;
        if let GroupContents::Members { files } = &contents {
            info!(user_id = %self.ctx.user_id(), group_id = %group.id, "Entered group");
            self.stack.push(NavEntry::Group { group });
            self.selection.clear();
            self.listing = files.clone();
        }
        Ok(contents)
    }

    /// Pop one level. Returns false at the root.
    pub async fn back(&mut self) -> AppResult<bool> {
        if self.stack.len() <= 1 {
            return Ok(false);
        }
        self.stack.pop();
        self.selection.clear();
        self.reload().await?;
        Ok(true)
    }

    /// Switch visibility scope and start again from its root.
    pub async fn set_scope(&mut self, scope: VisibilityScope) -> AppResult<()> {
        self.scope = scope;
        self.stack.truncate(1);
        self.selection.clear();
        self.reload().await
    }

    pub async fn set_sort(&mut self, sort: SortSpec) -> AppResult<()> {
        self.sort = sort;
        self.reload().await
    }

    /// Add an item of the current listing to the selection.
    pub fn select(&mut self, id: ObjectId) -> bool {
        self.listing.find(id).is_some() && self.selection.insert(id)
    }

    pub fn deselect(&mut self, id: ObjectId) -> bool {
        self.selection.remove(&id)
    }

    pub fn select_all(&mut self) {
        self.selection = self.listing.items().iter().map(|o| o.id()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected objects in listing order.
    pub fn selected_objects(&self) -> Vec<FileSystemObject> {
        self.listing
            .items()
            .iter()
            .filter(|o| self.selection.contains(&o.id()))
            .cloned()
            .collect()
    }

    /// What this principal may do with an item of the listing.
    pub fn capabilities(&self, id: ObjectId) -> Option<CapabilityFlags> {
        self.listing
            .find(id)
            .map(|object| self.services.resolver.capabilities(&self.ctx.principal, object))
    }

    /// Put a file from the listing on the clipboard, replacing what was there.
    pub fn copy_to_clipboard(&mut self, id: ObjectId) -> AppResult<()> {
        let object = self.object(id)?;
        let file = object.as_file().ok_or_else(|| {
            AppError::validation(format!("Only files can be copied, not a {}", object.kind()))
        })?;
        self.clipboard = Some(file.clone());
        Ok(())
    }

    /// Copy the clipboard file into the current folder.
    ///
    /// The clipboard is cleared only when the copy is confirmed.
    pub async fn paste(&mut self) -> AppResult<CopyResult> {
        let file = self
            .clipboard
            .clone()
            .ok_or_else(|| AppError::validation("Clipboard is empty"))?;
        let target = CopyTarget {
            path: self.current_path(),
            visibility: self.scope.visibility,
            department_id: self.scope.department_id,
            new_name: None,
        };
        self.paste_as(file, target).await
    }

    /// Paste under an accepted suggested name.
    pub async fn paste_with_name(&mut self, name: &str) -> AppResult<CopyResult> {
        let file = self
            .clipboard
            .clone()
            .ok_or_else(|| AppError::validation("Clipboard is empty"))?;
        let target = CopyTarget {
            path: self.current_path(),
            visibility: self.scope.visibility,
            department_id: self.scope.department_id,
            new_name: Some(name.to_string()),
        };
        self.paste_as(file, target).await
    }

    async fn paste_as(&mut self, file: File, target: CopyTarget) -> AppResult<CopyResult> {
        let result = self
            .services
            .transfer
            .copy(&self.ctx, &FileSystemObject::File(file), &target)
            .await;
        if result.is_copied() {
            self.clipboard = None;
            self.refresh().await;
        }
        Ok(result)
    }

    /// Move the selection. Selected rows disappear at once and come back
    /// only if nothing was moved; the listing is reloaded either way.
    pub async fn move_selected(&mut self, target: &MoveTarget, cancel: &CancellationToken) -> BulkOutcome {
        let selected = self.selected_objects();
        let snapshot = self.hide_selected(&selected);
        let outcome = self
            .services
            .bulk
            .bulk_move(&self.ctx, &selected, target, cancel)
            .await;
        self.settle_bulk(snapshot, &outcome).await;
        outcome
    }

    /// Delete the selection with the same optimistic removal as moves.
    pub async fn delete_selected(&mut self, cancel: &CancellationToken) -> BulkOutcome {
        let selected = self.selected_objects();
        let snapshot = self.hide_selected(&selected);
        let outcome = self
            .services
            .bulk
            .bulk_delete(&self.ctx, &selected, cancel)
            .await;
        self.settle_bulk(snapshot, &outcome).await;
        outcome
    }

    fn hide_selected(&mut self, selected: &[FileSystemObject]) -> FolderListing {
        let snapshot = self.listing.clone();
        let ids: Vec<ObjectId> = selected.iter().map(FileSystemObject::id).collect();
        self.listing.remove_ids(&ids);
        snapshot
    }

    async fn settle_bulk(&mut self, snapshot: FolderListing, outcome: &BulkOutcome) {
        if outcome.success == 0 {
            self.listing = snapshot;
        }
        self.selection.clear();
        self.refresh().await;
    }

    pub async fn rename(&mut self, id: ObjectId, new_name: &str) -> AppResult<MoveResult> {
        let object = self.object(id)?;
        let result = self.services.transfer.rename(&self.ctx, &object, new_name).await;
        if result.is_success() {
            self.refresh().await;
        }
        Ok(result)
    }

    /// Move one item, e.g. after accepting a suggested name.
    pub async fn move_object(&mut self, id: ObjectId, target: &MoveTarget) -> AppResult<MoveResult> {
        let object = self.object(id)?;
        let result = self.services.transfer.move_object(&self.ctx, &object, target).await;
        self.after(result.is_success()).await;
        Ok(result)
    }

    /// Drop an item onto a folder of the listing.
    pub async fn drop_on_folder(&mut self, id: ObjectId, folder_id: FolderId) -> AppResult<MoveResult> {
        let object = self.object(id)?;
        let folder: Folder = self
            .object(folder_id.into())?
            .as_folder()
            .cloned()
            .ok_or_else(|| AppError::internal("Folder id resolved to another kind"))?;
        let result = self
            .services
            .transfer
            .drop_on_folder(&self.ctx, &object, &folder, self.scope.visibility)
            .await;
        self.after(result.is_success()).await;
        Ok(result)
    }

    /// Drop an item onto the root breadcrumb.
    pub async fn drop_on_root(&mut self, id: ObjectId) -> AppResult<MoveResult> {
        let object = self.object(id)?;
        let result = self
            .services
            .transfer
            .drop_on_root(&self.ctx, &object, self.scope.visibility)
            .await;
        self.after(result.is_success()).await;
        Ok(result)
    }

    pub async fn lock(
        &mut self,
        id: ObjectId,
        password: Option<&str>,
        requires_role: Option<Role>,
    ) -> AppResult<LockOutcome> {
        let object = self.object(id)?;
        let outcome = self
            .services
            .locks
            .lock(&self.ctx, &object, password, requires_role)
            .await;
        self.after(outcome == LockOutcome::Locked).await;
        Ok(outcome)
    }

    pub async fn unlock(&mut self, id: ObjectId, password: Option<&str>) -> AppResult<UnlockOutcome> {
        let object = self.object(id)?;
        let outcome = self.services.locks.unlock(&self.ctx, &object, password).await;
        self.after(outcome.is_unlocked()).await;
        Ok(outcome)
    }

    /// Flip the star in place, then reload so the listing reflects the
    /// server's starred set.
    pub async fn toggle_star(&mut self, id: ObjectId) -> AppResult<StarOutcome> {
        let object = self
            .listing
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("{id} is not in the current listing")))?;
        let outcome = self.services.index.toggle_star(&self.ctx, object).await;
        if let Err(e) = self.reload().await {
            warn!(user_id = %self.ctx.user_id(), error = %e, "Reload after star toggle failed");
        }
        Ok(outcome)
    }

    /// Create a folder in the current folder and scope.
    pub async fn create_folder(&mut self, name: &str) -> SaveOutcome<Folder> {
        let req = CreateFolder {
            name: name.to_string(),
            parent_path: self.current_path(),
            visibility: self.scope.visibility,
            department_id: self.scope.department_id,
            is_company_folder: false,
        };
        let outcome = self.services.folders.create_folder(&self.ctx, req).await;
        self.after(outcome.is_saved()).await;
        outcome
    }

    /// Create a group in the current folder and scope.
    pub async fn create_group(
        &mut self,
        name: &str,
        description: Option<String>,
        color: &str,
    ) -> SaveOutcome<Group> {
        let req = CreateGroup {
            name: name.to_string(),
            description,
            color: color.to_string(),
            parent_path: self.current_path(),
            visibility: self.scope.visibility,
            department_id: self.scope.department_id,
        };
        let outcome = self.services.groups.create_group(&self.ctx, req).await;
        self.after(outcome.is_saved()).await;
        outcome
    }

    /// Link a file of the listing to a group of the listing.
    pub async fn add_to_group(&mut self, file_id: ObjectId, group_id: GroupId) -> AppResult<ActionOutcome<Membership>> {
        let file = self.file(file_id)?;
        let mut group = self
            .listing
            .groups()
            .find(|g| g.id == group_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Group {group_id} is not in the current listing")))?;
        let outcome = self.services.groups.add_member(&self.ctx, &file, &mut group).await;
        self.after(outcome.is_done()).await;
        Ok(outcome)
    }

    /// Delete a group of the listing. Its members stay where they are.
    pub async fn delete_group(&mut self, group_id: GroupId) -> AppResult<ActionOutcome> {
        let group = self
            .listing
            .groups()
            .find(|g| g.id == group_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Group {group_id} is not in the current listing")))?;
        let outcome = self.services.groups.delete_group(&self.ctx, &group).await;
        self.after(outcome.is_done()).await;
        Ok(outcome)
    }

    /// Unlink a file from the group being browsed.
    pub async fn remove_from_current_group(&mut self, file_id: ObjectId) -> AppResult<ActionOutcome<Membership>> {
        let file = self.file(file_id)?;
        let mut group = self
            .current_group()
            .cloned()
            .ok_or_else(|| AppError::validation("Not inside a group"))?;
        let outcome = self
            .services
            .groups
            .remove_member(&self.ctx, &file, &mut group)
            .await;
        if outcome.is_done()
            && let Some(NavEntry::Group { group: current }) = self.stack.last_mut()
        {
            *current = group;
        }
        self.after(outcome.is_done()).await;
        Ok(outcome)
    }

    fn object(&self, id: ObjectId) -> AppResult<FileSystemObject> {
        self.listing
            .find(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("{id} is not in the current listing")))
    }

    fn file(&self, id: ObjectId) -> AppResult<File> {
        let object = self.object(id)?;
        object
            .as_file()
            .cloned()
            .ok_or_else(|| AppError::validation(format!("'{}' is not a file", object.name())))
    }

    async fn after(&mut self, applied: bool) {
        if applied {
            self.refresh().await;
        }
    }

    /// Drop cached listings and load again. A failed reload keeps the old
    /// listing and is logged.
    async fn refresh(&mut self) {
        self.services.index.invalidate().await;
        if let Err(e) = self.reload().await {
            warn!(user_id = %self.ctx.user_id(), error = %e, "Listing reload failed");
        }
    }
}
