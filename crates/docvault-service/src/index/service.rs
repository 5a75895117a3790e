//! Cached, normalized read path over the document API.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use docvault_cache::CacheManager;
use docvault_cache::keys;
use docvault_core::AppResult;
use docvault_core::traits::cache::CacheProvider;
use docvault_core::types::{FolderPath, GroupId, ObjectId};
use docvault_entity::file::File;
use docvault_entity::folder::Folder;
use docvault_entity::group::Group;
use docvault_entity::object::FileSystemObject;
use docvault_entity::record::ListingQuery;

use super::normalize::{normalize_group, normalize_record};
use super::star::{StarOutcome, begin_toggle};
use crate::api::DocumentApi;
use crate::context::RequestContext;

/// Files and folders of one listing, star flags merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectList {
    pub folders: Vec<Folder>,
    pub files: Vec<File>,
}

impl ObjectList {
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply_stars(&mut self, starred: &HashSet<ObjectId>) {
        for folder in &mut self.folders {
            folder.meta.is_starred = starred.contains(&folder.id.into());
        }
        for file in &mut self.files {
            file.meta.is_starred = starred.contains(&file.id.into());
        }
    }
}

/// Loads listings, normalizes records, and overlays the viewer's stars.
///
/// Normalized listings are cached per viewer and scope. Stars are kept out
/// of the cached listing and merged on every load since they are
/// per-viewer state that changes independently.
#[derive(Debug, Clone)]
pub struct FileSystemIndex {
    /// Document API.
    api: Arc<dyn DocumentApi>,
    /// Listing cache.
    cache: Arc<CacheManager>,
}

impl FileSystemIndex {
    /// Creates a new index.
    pub fn new(api: Arc<dyn DocumentApi>, cache: Arc<CacheManager>) -> Self {
        Self { api, cache }
    }

    /// Files and folders directly under `query.path`.
    ///
    /// Records that cannot be normalized are skipped with a warning.
    pub async fn load(&self, ctx: &RequestContext, query: &ListingQuery) -> AppResult<ObjectList> {
        let key = keys::folder_listing(ctx.user_id(), query);
        let mut list = match self.cache_get::<ObjectList>(&key).await {
            Some(list) => {
                debug!(key = %key, "Listing cache hit");
                list
            }
            None => {
                let records = self.api.list_folder(&ctx.principal, query).await?;
                let mut list = ObjectList::default();
                for record in &records {
                    match normalize_record(record, &query.path) {
                        Ok(FileSystemObject::Folder(folder)) => list.folders.push(folder),
                        Ok(FileSystemObject::File(file)) => list.files.push(file),
                        Ok(FileSystemObject::Group(_)) => {}
                        Err(e) => warn!(
                            record_id = %record.id,
                            error = %e,
                            "Skipping malformed listing record"
                        ),
                    }
                }
                self.cache_set(&key, &list).await;
                list
            }
        };

        let starred = self.starred(ctx).await?;
        list.apply_stars(&starred);
        Ok(list)
    }

    /// Groups living directly under `query.path`.
    pub async fn load_groups(
        &self,
        ctx: &RequestContext,
        query: &ListingQuery,
    ) -> AppResult<Vec<Group>> {
        let key = keys::group_listing(ctx.user_id(), query);
        let mut groups = match self.cache_get::<Vec<Group>>(&key).await {
            Some(groups) => groups,
            None => {
                let records = self.api.list_groups(&ctx.principal, query).await?;
                let groups: Vec<Group> = records
                    .iter()
                    .filter_map(|record| match normalize_group(record, &query.path) {
                        Ok(group) => Some(group),
                        Err(e) => {
                            warn!(record_id = %record.id, error = %e, "Skipping malformed group record");
                            None
                        }
                    })
                    .collect();
                self.cache_set(&key, &groups).await;
                groups
            }
        };

        let starred = self.starred(ctx).await?;
        for group in &mut groups {
            group.meta.is_starred = starred.contains(&group.id.into());
        }
        Ok(groups)
    }

    /// Member files of a group. Members keep their own parent paths.
    pub async fn load_group_members(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
    ) -> AppResult<Vec<File>> {
        let key = keys::group_members(ctx.user_id(), group_id);
        let mut files = match self.cache_get::<Vec<File>>(&key).await {
            Some(files) => files,
            None => {
                let records = self.api.list_group_members(&ctx.principal, group_id).await?;
                let files: Vec<File> = records
                    .iter()
                    .filter_map(|record| match normalize_record(record, &FolderPath::root()) {
                        Ok(FileSystemObject::File(file)) => Some(file),
                        Ok(_) => None,
                        Err(e) => {
                            warn!(record_id = %record.id, error = %e, "Skipping malformed member record");
                            None
                        }
                    })
                    .collect();
                self.cache_set(&key, &files).await;
                files
            }
        };

        let starred = self.starred(ctx).await?;
        for file in &mut files {
            file.meta.is_starred = starred.contains(&file.id.into());
        }
        Ok(files)
    }

    /// The viewer's starred-id set.
    pub async fn starred(&self, ctx: &RequestContext) -> AppResult<HashSet<ObjectId>> {
        let key = keys::starred_set(ctx.user_id());
        if let Some(set) = self.cache_get::<HashSet<ObjectId>>(&key).await {
            return Ok(set);
        }
        let set = self.api.starred_ids(&ctx.principal).await?;
        self.cache_set(&key, &set).await;
        Ok(set)
    }

    /// Drop every cached listing. Called after any mutation since it may
    /// have changed what other viewers see too.
    pub async fn invalidate(&self) {
        if let Err(e) = self.cache.delete_pattern(&keys::listing_pattern()).await {
            warn!(error = %e, "Failed to invalidate listing cache");
        }
    }

    /// Flip the star flag on `object` optimistically and confirm it with
    /// the server, restoring the prior value if the server refuses.
    pub async fn toggle_star(
        &self,
        ctx: &RequestContext,
        object: &mut FileSystemObject,
    ) -> StarOutcome {
        let pending = begin_toggle(object);
        let result = self
            .api
            .set_starred(&ctx.principal, pending.id, pending.requested)
            .await;
        if let Err(e) = &result {
            warn!(
                user_id = %ctx.user_id(),
                object_id = %pending.id,
                owner_id = %object.owner_id(),
                error = %e,
                "Star toggle failed, restoring prior flag"
            );
        }
        let outcome = pending.settle(object, result);
        if let Err(e) = self.cache.delete(&keys::starred_set(ctx.user_id())).await {
            warn!(error = %e, "Failed to invalidate starred cache");
        }
        outcome
    }

    async fn cache_get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        match self.cache.get_json::<T>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    async fn cache_set<T: Serialize + Send + Sync>(&self, key: &str, value: &T) {
        let stored = match serde_json::to_string(value) {
            Ok(json) => self.cache.set_default(key, &json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = stored {
            warn!(key = %key, error = %e, "Failed to cache listing");
        }
    }
}
