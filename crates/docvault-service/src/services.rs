//! Wiring of every service over one document API.

use std::sync::Arc;
use std::time::Duration;

use docvault_auth::AccessResolver;
use docvault_cache::CacheManager;
use docvault_core::AppResult;
use docvault_core::config::AppConfig;

use crate::api::{DocumentApi, TimedApi};
use crate::bulk::BulkOperationCoordinator;
use crate::folder::FolderService;
use crate::group::GroupAggregator;
use crate::index::FileSystemIndex;
use crate::lock::LockStateMachine;
use crate::transfer::MoveCopyEngine;

/// All services, sharing one API handle, one cache, and one resolver.
#[derive(Debug, Clone)]
pub struct Services {
    pub resolver: AccessResolver,
    pub index: FileSystemIndex,
    pub locks: LockStateMachine,
    pub transfer: MoveCopyEngine,
    pub groups: GroupAggregator,
    pub bulk: BulkOperationCoordinator,
    pub folders: FolderService,
}

impl Services {
    /// Build the service graph. Every API call is bounded by the
    /// configured request timeout.
    pub fn new(api: Arc<dyn DocumentApi>, config: &AppConfig) -> AppResult<Self> {
        let api: Arc<dyn DocumentApi> = Arc::new(TimedApi::new(
            api,
            Duration::from_secs(config.client.request_timeout_seconds),
        ));
        let resolver = AccessResolver::from_config(&config.operations)?;
        let cache = Arc::new(CacheManager::new(&config.cache));
        let ops = config.operations.clone();

        let index = FileSystemIndex::new(api.clone(), cache);
        let transfer = MoveCopyEngine::new(api.clone(), resolver, ops.clone());
        Ok(Self {
            resolver,
            locks: LockStateMachine::new(api.clone(), resolver),
            groups: GroupAggregator::new(api.clone(), index.clone(), resolver, ops.clone()),
            bulk: BulkOperationCoordinator::new(api.clone(), transfer.clone(), resolver, ops.clone()),
            folders: FolderService::new(api, ops),
            index,
            transfer,
        })
    }
}
