//! In-process document server.
//!
//! Holds the authoritative object state behind a single async mutex and
//! enforces the same server-side rules a remote deployment would: soft
//! deletes into a trash, name collisions as `DuplicateConflict`, hashed
//! lock passwords, recomputed group aggregates, and lock/role checks on
//! every mutation. Failure injection and per-call latency let callers
//! exercise retry paths and out-of-order completion.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use docvault_auth::{AccessResolver, PasswordHasher};
use docvault_core::config::operations::OperationsConfig;
use docvault_core::types::{
    DepartmentId, FileId, FolderId, FolderPath, GroupId, ObjectId, UserId,
};
use docvault_core::{AppError, AppResult};
use docvault_entity::file::{ContentCategory, File};
use docvault_entity::folder::Folder;
use docvault_entity::group::Group;
use docvault_entity::object::{
    FileSystemObject, LockInfo, ObjectMeta, Visibility, VisibilityScope, crosses_department,
};
use docvault_entity::principal::{Principal, Role};
use docvault_entity::record::{
    CopyRequest, CreateFolder, CreateGroup, GroupRecord, ListingQuery, LockRequest, MoveRequest,
    ObjectRecord, UpdateGroup, validate_request,
};

use super::DocumentApi;

/// Serializable server state, also used as the CLI seed format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Known principals.
    #[serde(default)]
    pub users: Vec<Principal>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub files: Vec<File>,
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Argon2 hashes of lock passwords, by object UUID.
    #[serde(default)]
    pub lock_passwords: HashMap<Uuid, String>,
    /// Per-user starred sets.
    #[serde(default)]
    pub starred: HashMap<UserId, HashSet<ObjectId>>,
    /// Soft-deleted objects.
    #[serde(default)]
    pub trash: Vec<FileSystemObject>,
}

#[derive(Debug, Default)]
struct Faults {
    fail_next: HashSet<ObjectId>,
    fail_stars: bool,
    latency: Duration,
    object_latency: HashMap<ObjectId, Duration>,
    calls: Vec<String>,
}

/// An in-memory [`DocumentApi`].
#[derive(Debug)]
pub struct MemoryDocumentApi {
    state: Mutex<Snapshot>,
    faults: Mutex<Faults>,
    resolver: AccessResolver,
    hasher: PasswordHasher,
    max_files_per_group: u64,
}

impl MemoryDocumentApi {
    /// Creates a server holding `snapshot`.
    ///
    /// An unrecognised cross-department role in `config` is treated as
    /// `SuperAdmin`.
    pub fn new(snapshot: Snapshot, config: &OperationsConfig) -> Self {
        let cross_scope = config
            .cross_scope_min_role
            .parse::<Role>()
            .unwrap_or(Role::SuperAdmin);
        Self {
            state: Mutex::new(snapshot),
            faults: Mutex::new(Faults::default()),
            resolver: AccessResolver::new(cross_scope),
            hasher: PasswordHasher::new(),
            max_files_per_group: config.max_files_per_group,
        }
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.clone()
    }

    /// Fail the next call that targets `id` with a transport error.
    pub async fn fail_next_call(&self, id: ObjectId) {
        self.faults.lock().await.fail_next.insert(id);
    }

    /// Fail every star acknowledgement while set.
    pub async fn fail_star_acknowledgements(&self, fail: bool) {
        self.faults.lock().await.fail_stars = fail;
    }

    /// Delay every call.
    pub async fn set_latency(&self, latency: Duration) {
        self.faults.lock().await.latency = latency;
    }

    /// Delay calls targeting `id`, on top of the global latency.
    pub async fn set_object_latency(&self, id: ObjectId, latency: Duration) {
        self.faults.lock().await.object_latency.insert(id, latency);
    }

    /// Names of the operations received so far, in arrival order.
    pub async fn calls(&self) -> Vec<String> {
        self.faults.lock().await.calls.clone()
    }

    /// Number of operations received so far.
    pub async fn call_count(&self) -> usize {
        self.faults.lock().await.calls.len()
    }

    pub async fn clear_calls(&self) {
        self.faults.lock().await.calls.clear();
    }

    pub async fn file(&self, id: FileId) -> Option<File> {
        let state = self.state.lock().await;
        state.files.iter().find(|f| f.id == id).cloned()
    }

    pub async fn folder(&self, id: FolderId) -> Option<Folder> {
        let state = self.state.lock().await;
        state.folders.iter().find(|f| f.id == id).cloned()
    }

    pub async fn group(&self, id: GroupId) -> Option<Group> {
        let state = self.state.lock().await;
        state.groups.iter().find(|g| g.id == id).cloned()
    }

    /// Whether the object sits in the trash.
    pub async fn is_trashed(&self, id: ObjectId) -> bool {
        let state = self.state.lock().await;
        state.trash.iter().any(|o| o.id() == id)
    }

    pub async fn insert_folder(&self, folder: Folder) {
        self.state.lock().await.folders.push(folder);
    }

    pub async fn insert_file(&self, file: File) {
        let mut state = self.state.lock().await;
        let group_id = file.group_id;
        state.files.push(file);
        if let Some(group_id) = group_id {
            state.recompute_group(group_id);
        }
    }

    pub async fn insert_group(&self, group: Group) {
        let mut state = self.state.lock().await;
        let group_id = group.id;
        state.groups.push(group);
        state.recompute_group(group_id);
    }

    /// Place a lock directly, hashing `password` if given.
    pub async fn seed_lock(
        &self,
        id: ObjectId,
        lock: LockInfo,
        password: Option<&str>,
    ) -> AppResult<()> {
        let hash = password.map(|p| self.hasher.hash_password(p)).transpose()?;
        let mut state = self.state.lock().await;
        let meta = state.meta_mut(id)?;
        meta.lock = Some(LockInfo {
            has_password: hash.is_some(),
            ..lock
        });
        if let Some(hash) = hash {
            state.lock_passwords.insert(*id.as_uuid(), hash);
        }
        Ok(())
    }

    /// Record the call, apply latency, and consume any injected failure.
    async fn begin(&self, operation: &'static str, target: Option<ObjectId>) -> AppResult<()> {
        let (delay, fail) = {
            let mut faults = self.faults.lock().await;
            faults.calls.push(operation.to_string());
            let mut delay = faults.latency;
            if let Some(extra) = target.and_then(|id| faults.object_latency.get(&id)) {
                delay += *extra;
            }
            let fail = target.is_some_and(|id| faults.fail_next.remove(&id));
            (delay, fail)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            debug!(operation, "Injected transport failure");
            return Err(AppError::transport(format!(
                "{operation} failed: connection reset"
            )));
        }
        Ok(())
    }

    fn check_cross_scope(
        &self,
        actor: &Principal,
        current: Option<DepartmentId>,
        target: Option<DepartmentId>,
    ) -> AppResult<()> {
        if crosses_department(current.or(actor.department_id), target)
            && !self.resolver.can_cross_scope(actor)
        {
            return Err(AppError::access_denied(format!(
                "Moving across departments requires role {} or above",
                self.resolver.cross_scope_min_role()
            )));
        }
        Ok(())
    }

    fn check_unlocked_for(&self, actor: &Principal, meta: &ObjectMeta) -> AppResult<()> {
        if self.resolver.can_bypass_lock(actor, meta) {
            Ok(())
        } else {
            Err(AppError::access_denied(format!("'{}' is locked", meta.name)))
        }
    }
}

fn check_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if name.contains('/') {
        return Err(AppError::validation(format!(
            "Name '{name}' cannot contain '/'"
        )));
    }
    Ok(())
}

fn target_department(visibility: Visibility, department_id: Option<DepartmentId>) -> Option<DepartmentId> {
    match visibility {
        Visibility::Department => department_id,
        Visibility::Private => None,
    }
}

/// Whether an entry with these attributes lives under `folder` rather than
/// under a same-named folder in another namespace. Company folders hold
/// department entries of every department.
fn contains(
    folder: &Folder,
    visibility: Visibility,
    department_id: Option<DepartmentId>,
    owner_id: UserId,
) -> bool {
    if folder.is_company_folder && folder.visibility == Visibility::Department {
        return visibility == Visibility::Department;
    }
    VisibilityScope::of(folder.visibility, folder.department_id).same_namespace(
        visibility,
        department_id,
        folder.meta.owner_id,
        owner_id,
    )
}

fn sort_records(records: &mut [ObjectRecord]) {
    records.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

impl Snapshot {
    fn meta(&self, id: ObjectId) -> AppResult<&ObjectMeta> {
        let meta = match id {
            ObjectId::File(fid) => self.files.iter().find(|f| f.id == fid).map(|f| &f.meta),
            ObjectId::Folder(fid) => self.folders.iter().find(|f| f.id == fid).map(|f| &f.meta),
            ObjectId::Group(gid) => self.groups.iter().find(|g| g.id == gid).map(|g| &g.meta),
        };
        meta.ok_or_else(|| AppError::not_found(format!("{id} not found")))
    }

    fn meta_mut(&mut self, id: ObjectId) -> AppResult<&mut ObjectMeta> {
        let meta = match id {
            ObjectId::File(fid) => self
                .files
                .iter_mut()
                .find(|f| f.id == fid)
                .map(|f| &mut f.meta),
            ObjectId::Folder(fid) => self
                .folders
                .iter_mut()
                .find(|f| f.id == fid)
                .map(|f| &mut f.meta),
            ObjectId::Group(gid) => self
                .groups
                .iter_mut()
                .find(|g| g.id == gid)
                .map(|g| &mut g.meta),
        };
        meta.ok_or_else(|| AppError::not_found(format!("{id} not found")))
    }

    fn file_index(&self, id: FileId) -> AppResult<usize> {
        self.files
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    fn folder_index(&self, id: FolderId) -> AppResult<usize> {
        self.folders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    fn group_index(&self, id: GroupId) -> AppResult<usize> {
        self.groups
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| AppError::not_found(format!("Group {id} not found")))
    }

    fn folder_visible(folder: &Folder, actor: &Principal) -> bool {
        folder.visibility == Visibility::Department || folder.meta.owner_id == actor.id
    }

    /// Root always exists; otherwise a folder visible to the actor must
    /// sit at exactly this path.
    fn folder_exists(&self, path: &FolderPath, actor: &Principal) -> bool {
        path.is_root()
            || self.folders.iter().any(|f| {
                Self::folder_visible(f, actor) && f.full_path().ok().as_ref() == Some(path)
            })
    }

    fn require_folder(&self, path: &FolderPath, actor: &Principal) -> AppResult<()> {
        if self.folder_exists(path, actor) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Folder '{path}' does not exist")))
        }
    }

    /// Whether a file or folder other than `exclude` already uses `name`
    /// at `parent` in the same namespace.
    fn entry_name_taken(
        &self,
        name: &str,
        parent: &FolderPath,
        scope: VisibilityScope,
        owner: UserId,
        exclude: Option<Uuid>,
    ) -> bool {
        let clash = |other_name: &str,
                     other_parent: &FolderPath,
                     vis: Visibility,
                     dept: Option<DepartmentId>,
                     other_owner: UserId,
                     other_id: Uuid| {
            other_name == name
                && other_parent == parent
                && Some(other_id) != exclude
                && scope.same_namespace(vis, dept, owner, other_owner)
        };
        self.files.iter().any(|f| {
            clash(
                &f.meta.name,
                &f.parent_path,
                f.visibility,
                f.department_id,
                f.meta.owner_id,
                f.id.into_uuid(),
            )
        }) || self.folders.iter().any(|f| {
            clash(
                &f.meta.name,
                &f.parent_path,
                f.visibility,
                f.department_id,
                f.meta.owner_id,
                f.id.into_uuid(),
            )
        })
    }

    fn group_name_taken(
        &self,
        name: &str,
        parent: &FolderPath,
        scope: VisibilityScope,
        owner: UserId,
        exclude: Option<GroupId>,
    ) -> bool {
        self.groups.iter().any(|g| {
            g.meta.name == name
                && &g.parent_path == parent
                && Some(g.id) != exclude
                && scope.same_namespace(g.visibility, g.department_id, owner, g.meta.owner_id)
        })
    }

    fn recompute_group(&mut self, group_id: GroupId) {
        let (count, size) = self
            .files
            .iter()
            .filter(|f| f.group_id == Some(group_id))
            .fold((0u64, 0u64), |(c, s), f| (c + 1, s + f.size_bytes));
        if let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) {
            group.file_count = count;
            group.total_size_bytes = size;
        }
    }

    /// Unlink files whose group no longer matches their scope, then
    /// refresh every aggregate.
    fn prune_memberships(&mut self) {
        let groups: HashMap<GroupId, Group> =
            self.groups.iter().map(|g| (g.id, g.clone())).collect();
        for file in &mut self.files {
            if let Some(group_id) = file.group_id {
                let keep = groups.get(&group_id).is_some_and(|g| g.admits_member(file));
                if !keep {
                    file.group_id = None;
                }
            }
        }
        let ids: Vec<GroupId> = self.groups.iter().map(|g| g.id).collect();
        for group_id in ids {
            self.recompute_group(group_id);
        }
    }

    /// Re-root everything beneath `source` from `from` to `to`. Entries in
    /// other namespaces that share the path are left alone. `rescope`
    /// applies a new visibility and department to what moves.
    fn relocate_subtree(
        &mut self,
        source: &Folder,
        from: &FolderPath,
        to: &FolderPath,
        rescope: Option<(Visibility, Option<DepartmentId>)>,
    ) {
        for folder in &mut self.folders {
            if !contains(source, folder.visibility, folder.department_id, folder.meta.owner_id) {
                continue;
            }
            if let Some(path) = folder.parent_path.rebase(from, to) {
                folder.parent_path = path;
                if let Some((visibility, department_id)) = rescope {
                    folder.visibility = visibility;
                    folder.department_id = department_id;
                }
            }
        }
        for file in &mut self.files {
            if !contains(source, file.visibility, file.department_id, file.meta.owner_id) {
                continue;
            }
            if let Some(path) = file.parent_path.rebase(from, to) {
                file.parent_path = path;
                if let Some((visibility, department_id)) = rescope {
                    file.visibility = visibility;
                    file.department_id = department_id;
                }
            }
        }
        for group in &mut self.groups {
            if !contains(source, group.visibility, group.department_id, group.meta.owner_id) {
                continue;
            }
            if let Some(path) = group.parent_path.rebase(from, to) {
                group.parent_path = path;
                if let Some((visibility, department_id)) = rescope {
                    group.visibility = visibility;
                    group.department_id = department_id;
                }
            }
        }
    }

    fn trash_group(&mut self, idx: usize) {
        let group = self.groups.remove(idx);
        for file in &mut self.files {
            if file.group_id == Some(group.id) {
                file.group_id = None;
            }
        }
        self.trash.push(group.into());
    }

    fn trash_folder(&mut self, idx: usize) -> AppResult<()> {
        let folder = self.folders.remove(idx);
        let full = folder.full_path()?;
        let (inner_folders, kept): (Vec<Folder>, Vec<Folder>) = std::mem::take(&mut self.folders)
            .into_iter()
            .partition(|f| {
                f.parent_path.is_within(&full)
                    && contains(&folder, f.visibility, f.department_id, f.meta.owner_id)
            });
        self.folders = kept;
        let (inner_files, kept): (Vec<File>, Vec<File>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| {
                f.parent_path.is_within(&full)
                    && contains(&folder, f.visibility, f.department_id, f.meta.owner_id)
            });
        self.files = kept;
        let inner_groups: Vec<usize> = self
            .groups
            .iter()
            .enumerate()
            .filter(|(_, g)| {
                g.parent_path.is_within(&full)
                    && contains(&folder, g.visibility, g.department_id, g.meta.owner_id)
            })
            .map(|(i, _)| i)
            .collect();
        for idx in inner_groups.into_iter().rev() {
            self.trash_group(idx);
        }
        self.trash.push(folder.into());
        self.trash.extend(inner_folders.into_iter().map(FileSystemObject::from));
        let touched: HashSet<GroupId> = inner_files.iter().filter_map(|f| f.group_id).collect();
        self.trash.extend(inner_files.into_iter().map(FileSystemObject::from));
        for group_id in touched {
            self.recompute_group(group_id);
        }
        Ok(())
    }

    fn admits_folder(scope: &VisibilityScope, folder: &Folder, actor: &Principal) -> bool {
        (folder.is_company_folder && scope.visibility == Visibility::Department)
            || scope.admits(
                folder.visibility,
                folder.department_id,
                folder.meta.owner_id,
                actor.id,
            )
    }
}

#[async_trait]
impl DocumentApi for MemoryDocumentApi {
    async fn list_folder(
        &self,
        actor: &Principal,
        query: &ListingQuery,
    ) -> AppResult<Vec<ObjectRecord>> {
        self.begin("list_folder", None).await?;
        let state = self.state.lock().await;
        state.require_folder(&query.path, actor)?;

        let mut records: Vec<ObjectRecord> = state
            .folders
            .iter()
            .filter(|f| f.parent_path == query.path && Snapshot::admits_folder(&query.scope, f, actor))
            .map(ObjectRecord::from)
            .collect();
        records.extend(
            state
                .files
                .iter()
                .filter(|f| {
                    f.parent_path == query.path
                        && query
                            .scope
                            .admits(f.visibility, f.department_id, f.meta.owner_id, actor.id)
                })
                .map(ObjectRecord::from),
        );
        sort_records(&mut records);
        Ok(records)
    }

    async fn list_groups(
        &self,
        actor: &Principal,
        query: &ListingQuery,
    ) -> AppResult<Vec<GroupRecord>> {
        self.begin("list_groups", None).await?;
        let state = self.state.lock().await;
        let mut records: Vec<GroupRecord> = state
            .groups
            .iter()
            .filter(|g| {
                g.parent_path == query.path
                    && query
                        .scope
                        .admits(g.visibility, g.department_id, g.meta.owner_id, actor.id)
            })
            .map(GroupRecord::from)
            .collect();
        records.sort_by_key(|r| r.name.to_lowercase());
        Ok(records)
    }

    async fn list_group_members(
        &self,
        actor: &Principal,
        group_id: GroupId,
    ) -> AppResult<Vec<ObjectRecord>> {
        self.begin("list_group_members", Some(group_id.into()))
            .await?;
        let state = self.state.lock().await;
        let group = &state.groups[state.group_index(group_id)?];
        self.check_unlocked_for(actor, &group.meta)?;

        let mut records: Vec<ObjectRecord> = state
            .files
            .iter()
            .filter(|f| f.group_id == Some(group_id))
            .map(ObjectRecord::from)
            .collect();
        sort_records(&mut records);
        Ok(records)
    }

    async fn get_folder(&self, actor: &Principal, folder_id: FolderId) -> AppResult<ObjectRecord> {
        self.begin("get_folder", Some(folder_id.into())).await?;
        let state = self.state.lock().await;
        let folder = &state.folders[state.folder_index(folder_id)?];
        if !Snapshot::folder_visible(folder, actor) {
            return Err(AppError::not_found(format!("Folder {folder_id} not found")));
        }
        Ok(ObjectRecord::from(folder))
    }

    async fn find_folder(
        &self,
        actor: &Principal,
        path: &FolderPath,
        scope: &VisibilityScope,
    ) -> AppResult<Option<ObjectRecord>> {
        self.begin("find_folder", None).await?;
        let state = self.state.lock().await;
        Ok(state
            .folders
            .iter()
            .find(|f| {
                f.full_path().ok().as_ref() == Some(path)
                    && Snapshot::admits_folder(scope, f, actor)
            })
            .map(ObjectRecord::from))
    }

    async fn create_folder(
        &self,
        actor: &Principal,
        req: &CreateFolder,
    ) -> AppResult<ObjectRecord> {
        validate_request(req)?;
        check_name(&req.name)?;
        self.begin("create_folder", None).await?;
        let mut state = self.state.lock().await;
        state.require_folder(&req.parent_path, actor)?;

        let department_id = target_department(req.visibility, req.department_id);
        let scope = VisibilityScope::of(req.visibility, department_id);
        if state.entry_name_taken(&req.name, &req.parent_path, scope, actor.id, None) {
            return Err(AppError::duplicate(format!(
                "'{}' already exists in '{}'",
                req.name, req.parent_path
            )));
        }

        let mut folder = Folder::new(
            ObjectMeta::new(req.name.clone(), actor.id, actor.display_name.clone()),
            req.parent_path.clone(),
        );
        folder.visibility = req.visibility;
        folder.department_id = department_id;
        folder.is_company_folder = req.is_company_folder;
        let record = ObjectRecord::from(&folder);
        state.folders.push(folder);
        Ok(record)
    }

    async fn create_group(&self, actor: &Principal, req: &CreateGroup) -> AppResult<GroupRecord> {
        validate_request(req)?;
        self.begin("create_group", None).await?;
        let mut state = self.state.lock().await;
        state.require_folder(&req.parent_path, actor)?;

        let department_id = target_department(req.visibility, req.department_id);
        let scope = VisibilityScope::of(req.visibility, department_id);
        if state.group_name_taken(&req.name, &req.parent_path, scope, actor.id, None) {
            return Err(AppError::duplicate(format!(
                "A group named '{}' already exists here",
                req.name
            )));
        }

        let mut group = Group::new(
            ObjectMeta::new(req.name.clone(), actor.id, actor.display_name.clone()),
            req.parent_path.clone(),
            req.color.clone(),
        );
        group.description = req.description.clone();
        group.visibility = req.visibility;
        group.department_id = department_id;
        let record = GroupRecord::from(&group);
        state.groups.push(group);
        Ok(record)
    }

    async fn update_group(
        &self,
        actor: &Principal,
        group_id: GroupId,
        req: &UpdateGroup,
    ) -> AppResult<GroupRecord> {
        validate_request(req)?;
        self.begin("update_group", Some(group_id.into())).await?;
        let mut state = self.state.lock().await;
        let idx = state.group_index(group_id)?;
        let current = state.groups[idx].clone();
        self.check_unlocked_for(actor, &current.meta)?;

        if let Some(name) = &req.name {
            let scope = VisibilityScope::of(current.visibility, current.department_id);
            if name != &current.meta.name
                && state.group_name_taken(
                    name,
                    &current.parent_path,
                    scope,
                    current.meta.owner_id,
                    Some(group_id),
                )
            {
                return Err(AppError::duplicate(format!(
                    "A group named '{name}' already exists here"
                )));
            }
        }

        let group = &mut state.groups[idx];
        if let Some(name) = &req.name {
            group.meta.name = name.clone();
        }
        if let Some(description) = &req.description {
            group.description = Some(description.clone());
        }
        if let Some(color) = &req.color {
            group.color = color.clone();
        }
        group.meta.modified_at = Utc::now();
        Ok(GroupRecord::from(&*group))
    }

    async fn delete_group(&self, actor: &Principal, group_id: GroupId) -> AppResult<()> {
        self.begin("delete_group", Some(group_id.into())).await?;
        let mut state = self.state.lock().await;
        let idx = state.group_index(group_id)?;
        let group = &state.groups[idx];
        if !self.resolver.can_delete(actor, group) {
            return Err(AppError::access_denied(if group.meta.is_locked() {
                format!("Locked group '{}' cannot be deleted", group.meta.name)
            } else {
                "Only the owner or an Admin can delete this group".to_string()
            }));
        }
        state.trash_group(idx);
        Ok(())
    }

    async fn rename(&self, actor: &Principal, id: ObjectId, new_name: &str) -> AppResult<()> {
        check_name(new_name)?;
        self.begin("rename", Some(id)).await?;
        let mut state = self.state.lock().await;
        self.check_unlocked_for(actor, state.meta(id)?)?;

        match id {
            ObjectId::File(fid) => {
                let idx = state.file_index(fid)?;
                let file = &state.files[idx];
                let scope = VisibilityScope::of(file.visibility, file.department_id);
                if state.entry_name_taken(
                    new_name,
                    &file.parent_path,
                    scope,
                    file.meta.owner_id,
                    Some(fid.into_uuid()),
                ) {
                    return Err(AppError::duplicate(format!("'{new_name}' already exists")));
                }
                let file = &mut state.files[idx];
                file.meta.name = new_name.to_string();
                file.content_category =
                    ContentCategory::derive(new_name, file.content_type.as_deref());
                file.meta.modified_at = Utc::now();
            }
            ObjectId::Folder(fid) => {
                let idx = state.folder_index(fid)?;
                let folder = state.folders[idx].clone();
                let scope = VisibilityScope::of(folder.visibility, folder.department_id);
                if state.entry_name_taken(
                    new_name,
                    &folder.parent_path,
                    scope,
                    folder.meta.owner_id,
                    Some(fid.into_uuid()),
                ) {
                    return Err(AppError::duplicate(format!("'{new_name}' already exists")));
                }
                let from = folder.full_path()?;
                let to = folder.parent_path.join(new_name)?;
                state.relocate_subtree(&folder, &from, &to, None);
                let folder = &mut state.folders[idx];
                folder.meta.name = new_name.to_string();
                folder.meta.modified_at = Utc::now();
            }
            ObjectId::Group(gid) => {
                let idx = state.group_index(gid)?;
                let group = &state.groups[idx];
                let scope = VisibilityScope::of(group.visibility, group.department_id);
                if state.group_name_taken(
                    new_name,
                    &group.parent_path,
                    scope,
                    group.meta.owner_id,
                    Some(gid),
                ) {
                    return Err(AppError::duplicate(format!(
                        "A group named '{new_name}' already exists here"
                    )));
                }
                let group = &mut state.groups[idx];
                group.meta.name = new_name.to_string();
                group.meta.modified_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn delete(&self, actor: &Principal, id: ObjectId) -> AppResult<()> {
        if let ObjectId::Group(gid) = id {
            return self.delete_group(actor, gid).await;
        }
        self.begin("delete", Some(id)).await?;
        let mut state = self.state.lock().await;
        let meta = state.meta(id)?;
        if !self.resolver.can_delete(actor, meta) {
            return Err(AppError::access_denied(if meta.is_locked() {
                format!("Locked object '{}' cannot be deleted", meta.name)
            } else {
                "Only the owner or an Admin can delete this object".to_string()
            }));
        }

        match id {
            ObjectId::File(fid) => {
                let idx = state.file_index(fid)?;
                let file = state.files.remove(idx);
                let group_id = file.group_id;
                state.trash.push(file.into());
                if let Some(group_id) = group_id {
                    state.recompute_group(group_id);
                }
            }
            ObjectId::Folder(fid) => {
                let idx = state.folder_index(fid)?;
                state.trash_folder(idx)?;
            }
            ObjectId::Group(_) => {}
        }
        state.starred.values_mut().for_each(|set| {
            set.remove(&id);
        });
        Ok(())
    }

    async fn lock(&self, actor: &Principal, id: ObjectId, req: &LockRequest) -> AppResult<()> {
        let hash = req
            .password
            .as_deref()
            .map(|p| self.hasher.hash_password(p))
            .transpose()?;
        self.begin("lock", Some(id)).await?;
        let mut state = self.state.lock().await;
        let meta = state.meta_mut(id)?;
        if meta.is_locked() {
            return Err(AppError::already_locked(format!(
                "'{}' is already locked",
                meta.name
            )));
        }
        meta.lock = Some(LockInfo::new(actor.id, req.requires_role, hash.is_some()));
        meta.modified_at = Utc::now();
        if let Some(hash) = hash {
            state.lock_passwords.insert(*id.as_uuid(), hash);
        }
        Ok(())
    }

    async fn unlock(
        &self,
        actor: &Principal,
        id: ObjectId,
        password: Option<&str>,
    ) -> AppResult<()> {
        self.begin("unlock", Some(id)).await?;
        let mut state = self.state.lock().await;
        let meta = state.meta(id)?;
        let Some(lock) = meta.lock.clone() else {
            return Err(AppError::not_locked(format!("'{}' is not locked", meta.name)));
        };

        if !self.resolver.can_bypass_lock(actor, meta) {
            if !lock.has_password {
                return Err(AppError::access_denied(format!(
                    "Unlocking '{}' requires role {} or above",
                    meta.name,
                    lock.effective_required_role()
                )));
            }
            let Some(password) = password else {
                return Err(AppError::invalid_password(format!(
                    "A password is required to unlock '{}'",
                    meta.name
                )));
            };
            let hash = state
                .lock_passwords
                .get(id.as_uuid())
                .ok_or_else(|| AppError::internal("Lock password hash missing"))?;
            self.hasher.require_match(password, hash)?;
        }

        let meta = state.meta_mut(id)?;
        meta.lock = None;
        meta.modified_at = Utc::now();
        state.lock_passwords.remove(id.as_uuid());
        Ok(())
    }

    async fn move_object(
        &self,
        actor: &Principal,
        id: ObjectId,
        req: &MoveRequest,
    ) -> AppResult<()> {
        self.begin("move_object", Some(id)).await?;
        let mut state = self.state.lock().await;
        let meta = state.meta(id)?;
        if meta.is_locked() {
            return Err(AppError::access_denied(format!("'{}' is locked", meta.name)));
        }
        let name = req.new_name.clone().unwrap_or_else(|| meta.name.clone());
        check_name(&name)?;
        state.require_folder(&req.target_path, actor)?;
        let department_id = target_department(req.visibility, req.department_id);
        let scope = VisibilityScope::of(req.visibility, department_id);

        match id {
            ObjectId::File(fid) => {
                let idx = state.file_index(fid)?;
                let file = &state.files[idx];
                self.check_cross_scope(actor, file.department_id, department_id)?;
                if state.entry_name_taken(
                    &name,
                    &req.target_path,
                    scope,
                    file.meta.owner_id,
                    Some(fid.into_uuid()),
                ) {
                    return Err(AppError::duplicate(format!(
                        "'{name}' already exists in '{}'",
                        req.target_path
                    )));
                }
                let file = &mut state.files[idx];
                file.parent_path = req.target_path.clone();
                file.visibility = req.visibility;
                file.department_id = department_id;
                file.content_category = ContentCategory::derive(&name, file.content_type.as_deref());
                file.meta.name = name;
                file.meta.modified_at = Utc::now();
            }
            ObjectId::Folder(fid) => {
                let idx = state.folder_index(fid)?;
                let folder = state.folders[idx].clone();
                self.check_cross_scope(actor, folder.department_id, department_id)?;
                let from = folder.full_path()?;
                if req.target_path.is_within(&from) {
                    return Err(AppError::validation(format!(
                        "Cannot move '{}' into itself or one of its subfolders",
                        folder.meta.name
                    )));
                }
                if state.entry_name_taken(
                    &name,
                    &req.target_path,
                    scope,
                    folder.meta.owner_id,
                    Some(fid.into_uuid()),
                ) {
                    return Err(AppError::duplicate(format!(
                        "'{name}' already exists in '{}'",
                        req.target_path
                    )));
                }
                let to = req.target_path.join(&name)?;
                state.relocate_subtree(&folder, &from, &to, Some((req.visibility, department_id)));
                let folder = &mut state.folders[idx];
                folder.parent_path = req.target_path.clone();
                folder.visibility = req.visibility;
                folder.department_id = department_id;
                folder.meta.name = name;
                folder.meta.modified_at = Utc::now();
            }
            ObjectId::Group(gid) => {
                // Groups keep their scope, so membership survives the move.
                let idx = state.group_index(gid)?;
                let group = &state.groups[idx];
                let own_scope = VisibilityScope::of(group.visibility, group.department_id);
                if state.group_name_taken(
                    &name,
                    &req.target_path,
                    own_scope,
                    group.meta.owner_id,
                    Some(gid),
                ) {
                    return Err(AppError::duplicate(format!(
                        "A group named '{name}' already exists in '{}'",
                        req.target_path
                    )));
                }
                let group = &mut state.groups[idx];
                group.parent_path = req.target_path.clone();
                group.meta.name = name;
                group.meta.modified_at = Utc::now();
            }
        }
        state.prune_memberships();
        Ok(())
    }

    async fn copy_file(
        &self,
        actor: &Principal,
        id: FileId,
        req: &CopyRequest,
    ) -> AppResult<ObjectRecord> {
        self.begin("copy_file", Some(id.into())).await?;
        let mut state = self.state.lock().await;
        let source = state.files[state.file_index(id)?].clone();
        self.check_unlocked_for(actor, &source.meta)?;
        state.require_folder(&req.target_path, actor)?;
        let department_id = target_department(req.visibility, req.department_id);
        self.check_cross_scope(actor, source.department_id, department_id)?;

        let name = req.new_name.clone().unwrap_or_else(|| source.meta.name.clone());
        check_name(&name)?;
        let scope = VisibilityScope::of(req.visibility, department_id);
        if state.entry_name_taken(&name, &req.target_path, scope, actor.id, None) {
            return Err(AppError::duplicate(format!(
                "'{name}' already exists in '{}'",
                req.target_path
            )));
        }

        let mut copy = File::new(
            ObjectMeta::new(name, actor.id, actor.display_name.clone()),
            req.target_path.clone(),
        )
        .with_size(source.size_bytes)
        .with_visibility(req.visibility)
        .with_department(department_id);
        copy.content_type = source.content_type.clone();
        copy.content_category =
            ContentCategory::derive(&copy.meta.name, copy.content_type.as_deref());
        let record = ObjectRecord::from(&copy);
        state.files.push(copy);
        Ok(record)
    }

    async fn set_starred(&self, actor: &Principal, id: ObjectId, starred: bool) -> AppResult<()> {
        self.begin("set_starred", Some(id)).await?;
        if self.faults.lock().await.fail_stars {
            return Err(AppError::transport("Star acknowledgement failed"));
        }
        let mut state = self.state.lock().await;
        state.meta(id)?;
        let set = state.starred.entry(actor.id).or_default();
        if starred {
            set.insert(id);
        } else {
            set.remove(&id);
        }
        Ok(())
    }

    async fn starred_ids(&self, actor: &Principal) -> AppResult<HashSet<ObjectId>> {
        self.begin("starred_ids", None).await?;
        let state = self.state.lock().await;
        Ok(state.starred.get(&actor.id).cloned().unwrap_or_default())
    }

    async fn add_to_group(
        &self,
        actor: &Principal,
        file_id: FileId,
        group_id: GroupId,
    ) -> AppResult<()> {
        self.begin("add_to_group", Some(file_id.into())).await?;
        let mut state = self.state.lock().await;
        let group = state.groups[state.group_index(group_id)?].clone();
        let idx = state.file_index(file_id)?;
        let file = &state.files[idx];
        self.check_unlocked_for(actor, &group.meta)?;
        self.check_unlocked_for(actor, &file.meta)?;
        if file.group_id == Some(group_id) {
            return Ok(());
        }
        if !group.admits_member(file) {
            return Err(AppError::validation(format!(
                "'{}' is not in the same visibility scope as group '{}'",
                file.meta.name, group.meta.name
            )));
        }
        if group.file_count >= self.max_files_per_group {
            return Err(AppError::validation(format!(
                "Group '{}' already holds the maximum of {} files",
                group.meta.name, self.max_files_per_group
            )));
        }

        let previous = state.files[idx].group_id.replace(group_id);
        state.recompute_group(group_id);
        if let Some(previous) = previous {
            state.recompute_group(previous);
        }
        Ok(())
    }

    async fn remove_from_group(
        &self,
        actor: &Principal,
        file_id: FileId,
        group_id: GroupId,
    ) -> AppResult<()> {
        self.begin("remove_from_group", Some(file_id.into()))
            .await?;
        let mut state = self.state.lock().await;
        let group = state.groups[state.group_index(group_id)?].clone();
        let idx = state.file_index(file_id)?;
        let file = &state.files[idx];
        self.check_unlocked_for(actor, &group.meta)?;
        self.check_unlocked_for(actor, &file.meta)?;
        if file.group_id != Some(group_id) {
            return Err(AppError::validation(format!(
                "'{}' is not a member of group '{}'",
                file.meta.name, group.meta.name
            )));
        }

        state.files[idx].group_id = None;
        state.recompute_group(group_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::ErrorKind;

    fn actor(role: Role) -> Principal {
        Principal::new(UserId::new(), role).with_display_name("Tester")
    }

    fn api() -> MemoryDocumentApi {
        MemoryDocumentApi::new(Snapshot::default(), &OperationsConfig::default())
    }

    #[tokio::test]
    async fn test_duplicate_folder_is_conflict() {
        let api = api();
        let me = actor(Role::Employee);
        let req = CreateFolder {
            name: "Specs".into(),
            parent_path: FolderPath::root(),
            visibility: Visibility::Department,
            department_id: None,
            is_company_folder: false,
        };
        api.create_folder(&me, &req).await.expect("first");
        let err = api.create_folder(&me, &req).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateConflict);
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let api = api();
        let req = CreateFolder {
            name: "Leaf".into(),
            parent_path: FolderPath::parse("no/such").expect("path"),
            visibility: Visibility::Department,
            department_id: None,
            is_company_folder: false,
        };
        let err = api.create_folder(&actor(Role::Admin), &req).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_lock_stores_only_hash() {
        let api = api();
        let me = actor(Role::Employee);
        let file = File::new(ObjectMeta::new("a.txt", me.id, ""), FolderPath::root());
        let id = ObjectId::from(file.id);
        api.insert_file(file).await;

        let req = LockRequest {
            password: Some("pw".into()),
            requires_role: None,
        };
        api.lock(&me, id, &req).await.expect("lock");
        let snapshot = api.snapshot().await;
        let hash = snapshot.lock_passwords.get(id.as_uuid()).expect("hash");
        assert_ne!(hash, "pw");
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let api = api();
        let me = actor(Role::Employee);
        let file = File::new(ObjectMeta::new("a.txt", me.id, ""), FolderPath::root());
        let id = ObjectId::from(file.id);
        api.insert_file(file).await;

        api.fail_next_call(id).await;
        let err = api.rename(&me, id, "b.txt").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transport);
        api.rename(&me, id, "b.txt").await.expect("second attempt");
        assert_eq!(api.calls().await, vec!["rename", "rename"]);
    }

    #[tokio::test]
    async fn test_folder_rename_rebases_contents() {
        let api = api();
        let me = actor(Role::Employee);
        let folder = Folder::new(ObjectMeta::new("old", me.id, ""), FolderPath::root());
        let folder_id = folder.id;
        api.insert_folder(folder).await;
        let inner = File::new(
            ObjectMeta::new("x.txt", me.id, ""),
            FolderPath::parse("old").expect("path"),
        );
        let inner_id = inner.id;
        api.insert_file(inner).await;

        api.rename(&me, folder_id.into(), "new").await.expect("rename");
        let moved = api.file(inner_id).await.expect("file");
        assert_eq!(moved.parent_path.as_str(), "new");
    }
}
