//! Bulk move and delete.
//!
//! Items are filtered through the access rules first and only eligible
//! ones are attempted. Each attempt stands alone: a failure never rolls
//! back or aborts another item. Results are attributed by position in the
//! selection, so completion order does not matter.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use docvault_auth::AccessResolver;
use docvault_core::config::OperationsConfig;
use docvault_entity::object::FileSystemObject;

use super::outcome::{BulkItemReport, BulkItemStatus, BulkOutcome};
use crate::api::DocumentApi;
use crate::context::RequestContext;
use crate::transfer::{MoveCopyEngine, MoveResult, MoveTarget};

/// Runs moves and deletes over a selection.
#[derive(Debug, Clone)]
pub struct BulkOperationCoordinator {
    /// Document API.
    api: Arc<dyn DocumentApi>,
    /// Per-item move logic.
    engine: MoveCopyEngine,
    /// Pre-filter rules.
    resolver: AccessResolver,
    /// Concurrency limit.
    config: OperationsConfig,
}

impl BulkOperationCoordinator {
    /// Creates a new coordinator.
    pub fn new(
        api: Arc<dyn DocumentApi>,
        engine: MoveCopyEngine,
        resolver: AccessResolver,
        config: OperationsConfig,
    ) -> Self {
        Self {
            api,
            engine,
            resolver,
            config,
        }
    }

    /// Move every movable item of `selection` to `target`.
    pub async fn bulk_move(
        &self,
        ctx: &RequestContext,
        selection: &[FileSystemObject],
        target: &MoveTarget,
        cancel: &CancellationToken,
    ) -> BulkOutcome {
        let outcome = self
            .run(
                ctx,
                "move",
                selection,
                cancel,
                |object| {
                    (!self.resolver.can_move(object)).then(|| format!("'{}' is locked", object.name()))
                },
                |object| async move {
                    match self.engine.move_object(ctx, object, target).await {
                        MoveResult::Success => BulkItemStatus::Succeeded,
                        MoveResult::DuplicateConflict { suggested_name, .. } => {
                            BulkItemStatus::Duplicate { suggested_name }
                        }
                        MoveResult::Failure { failure } => BulkItemStatus::Failed { failure },
                    }
                },
            )
            .await;
        info!(
            user_id = %ctx.user_id(),
            summary = %outcome.summary("moved"),
            "Bulk move finished"
        );
        outcome
    }

    /// Soft-delete every deletable item of `selection`.
    pub async fn bulk_delete(
        &self,
        ctx: &RequestContext,
        selection: &[FileSystemObject],
        cancel: &CancellationToken,
    ) -> BulkOutcome {
        let outcome = self
            .run(
                ctx,
                "delete",
                selection,
                cancel,
                |object| {
                    if self.resolver.can_delete(&ctx.principal, object) {
                        None
                    } else if object.is_locked() {
                        Some(format!("'{}' is locked", object.name()))
                    } else {
                        Some(format!("Not allowed to delete '{}'", object.name()))
                    }
                },
                |object| async move {
                    match self.api.delete(&ctx.principal, object.id()).await {
                        Ok(()) => BulkItemStatus::Succeeded,
                        Err(e) => BulkItemStatus::Failed { failure: e.into() },
                    }
                },
            )
            .await;
        info!(
            user_id = %ctx.user_id(),
            summary = %outcome.summary("deleted"),
            "Bulk delete finished"
        );
        outcome
    }

    /// Pre-filter, then fan out with at most `bulk_concurrency` items in
    /// flight. Cancellation is checked as each item gets its turn.
    async fn run<'a, S, A, Fut>(
        &self,
        ctx: &RequestContext,
        op: &'static str,
        selection: &'a [FileSystemObject],
        cancel: &CancellationToken,
        skip_reason: S,
        action: A,
    ) -> BulkOutcome
    where
        S: Fn(&FileSystemObject) -> Option<String>,
        A: Fn(&'a FileSystemObject) -> Fut,
        Fut: Future<Output = BulkItemStatus>,
    {
        let mut statuses: Vec<Option<BulkItemStatus>> = selection
            .iter()
            .map(|object| skip_reason(object).map(|reason| BulkItemStatus::Skipped { reason }))
            .collect();
        let pending: Vec<usize> = statuses
            .iter()
            .enumerate()
            .filter_map(|(i, status)| status.is_none().then_some(i))
            .collect();

        debug!(
            user_id = %ctx.user_id(),
            op,
            selected = selection.len(),
            eligible = pending.len(),
            "Bulk pre-filter"
        );
        if pending.is_empty() {
            warn!(user_id = %ctx.user_id(), op, "Nothing in the selection is eligible");
            return BulkOutcome::from_reports(false, reports(selection, statuses));
        }

        let semaphore = Semaphore::new(self.config.bulk_concurrency.max(1));
        let tasks = pending.into_iter().map(|i| {
            let semaphore = &semaphore;
            let action = &action;
            let object = &selection[i];
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (i, BulkItemStatus::Cancelled);
                };
                if cancel.is_cancelled() {
                    return (i, BulkItemStatus::Cancelled);
                }
                (i, action(object).await)
            }
        });

        for (i, status) in join_all(tasks).await {
            if let BulkItemStatus::Failed { failure } = &status {
                warn!(
                    user_id = %ctx.user_id(),
                    op,
                    object_id = %selection[i].id(),
                    error = %failure.message,
                    "Bulk item failed"
                );
            }
            statuses[i] = Some(status);
        }
        BulkOutcome::from_reports(true, reports(selection, statuses))
    }
}

fn reports(selection: &[FileSystemObject], statuses: Vec<Option<BulkItemStatus>>) -> Vec<BulkItemReport> {
    selection
        .iter()
        .zip(statuses)
        .map(|(object, status)| BulkItemReport {
            id: object.id(),
            name: object.name().to_string(),
            status: status.unwrap_or(BulkItemStatus::Cancelled),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::types::{FolderPath, UserId};
    use docvault_entity::file::File;
    use docvault_entity::object::{LockInfo, ObjectMeta, Visibility};
    use docvault_entity::principal::{Principal, Role};

    use crate::api::{MemoryDocumentApi, Snapshot};

    fn setup() -> (Arc<MemoryDocumentApi>, BulkOperationCoordinator, RequestContext) {
        let config = OperationsConfig::default();
        let api = Arc::new(MemoryDocumentApi::new(Snapshot::default(), &config));
        let resolver = AccessResolver::default();
        let engine = MoveCopyEngine::new(api.clone(), resolver, config.clone());
        let coordinator = BulkOperationCoordinator::new(api.clone(), engine, resolver, config);
        let ctx = RequestContext::new(Principal::new(UserId::new(), Role::Employee));
        (api, coordinator, ctx)
    }

    async fn seed(api: &MemoryDocumentApi, ctx: &RequestContext, name: &str, locked: bool) -> FileSystemObject {
        let mut file = File::new(ObjectMeta::new(name, ctx.user_id(), ""), FolderPath::root());
        if locked {
            file.meta.lock = Some(LockInfo::new(UserId::new(), Some(Role::Admin), false));
        }
        api.insert_file(file.clone()).await;
        file.into()
    }

    #[tokio::test]
    async fn test_locked_items_are_skipped() {
        let (api, coordinator, ctx) = setup();
        let mut selection = Vec::new();
        for (name, locked) in [("a", false), ("b", true), ("c", false), ("d", true), ("e", false)] {
            selection.push(seed(&api, &ctx, name, locked).await);
        }

        let outcome = coordinator
            .bulk_delete(&ctx, &selection, &CancellationToken::new())
            .await;
        assert!(outcome.proceeded);
        assert_eq!(outcome.success, 3);
        assert_eq!(outcome.skipped, 2);
        assert!(!api.is_trashed(selection[1].id()).await);
        assert!(!api.is_trashed(selection[3].id()).await);
        assert!(api.is_trashed(selection[0].id()).await);
    }

    #[tokio::test]
    async fn test_nothing_eligible_makes_no_calls() {
        let (api, coordinator, ctx) = setup();
        let selection = vec![seed(&api, &ctx, "a", true).await];
        api.clear_calls().await;

        let target = MoveTarget::folder(None, Visibility::Department);
        let outcome = coordinator
            .bulk_move(&ctx, &selection, &target, &CancellationToken::new())
            .await;
        assert!(!outcome.proceeded);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(api.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_cancelled_batch_starts_nothing() {
        let (api, coordinator, ctx) = setup();
        let selection = vec![seed(&api, &ctx, "a", false).await, seed(&api, &ctx, "b", false).await];
        api.clear_calls().await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = coordinator.bulk_delete(&ctx, &selection, &cancel).await;
        assert!(outcome.proceeded);
        assert_eq!(outcome.cancelled, 2);
        assert_eq!(api.call_count().await, 0);
    }
}
