//! Folder creation with parent checks and duplicate suggestions.

use std::sync::Arc;

use tracing::{info, warn};

use docvault_core::config::OperationsConfig;
use docvault_core::types::ObjectKind;
use docvault_core::{AppError, ErrorKind};
use docvault_entity::folder::Folder;
use docvault_entity::object::{FileSystemObject, Visibility, VisibilityScope};
use docvault_entity::record::{CreateFolder, ListingQuery, validate_request};

use crate::api::DocumentApi;
use crate::context::RequestContext;
use crate::index::normalize::normalize_record;
use crate::outcome::SaveOutcome;
use crate::transfer::naming::suggest_at;

/// Creates folders.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Document API.
    api: Arc<dyn DocumentApi>,
    /// Suffix limit for suggestions.
    config: OperationsConfig,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(api: Arc<dyn DocumentApi>, config: OperationsConfig) -> Self {
        Self { api, config }
    }

    /// Creates a new folder.
    ///
    /// The parent must already exist. Department folders without an
    /// explicit department land in the caller's home department.
    pub async fn create_folder(&self, ctx: &RequestContext, mut req: CreateFolder) -> SaveOutcome<Folder> {
        req.name = req.name.trim().to_string();
        if let Err(e) = validate_request(&req) {
            return SaveOutcome::Failure { failure: e.into() };
        }
        if req.name.contains('/') {
            return SaveOutcome::Failure {
                failure: AppError::validation("Folder name cannot contain '/'").into(),
            };
        }
        req.department_id = match req.visibility {
            Visibility::Department => req.department_id.or(ctx.principal.department_id),
            Visibility::Private => None,
        };
        let scope = VisibilityScope::of(req.visibility, req.department_id);

        if !req.parent_path.is_root() {
            match self
                .api
                .find_folder(&ctx.principal, &req.parent_path, &scope)
                .await
            {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return SaveOutcome::Failure {
                        failure: AppError::not_found(format!(
                            "Parent folder '{}' does not exist",
                            req.parent_path
                        ))
                        .into(),
                    };
                }
                Err(e) => return SaveOutcome::Failure { failure: e.into() },
            }
        }

        let record = match self.api.create_folder(&ctx.principal, &req).await {
            Ok(record) => record,
            Err(e) if e.is(ErrorKind::DuplicateConflict) => {
                let query = ListingQuery::new(req.parent_path.clone(), scope);
                let suggested_name = suggest_at(
                    self.api.as_ref(),
                    ctx,
                    ObjectKind::Folder,
                    &req.name,
                    &query,
                    self.config.conflict_suffix_limit,
                )
                .await;
                warn!(
                    user_id = %ctx.user_id(),
                    name = %req.name,
                    suggested_name = %suggested_name,
                    "Folder name already taken"
                );
                return SaveOutcome::DuplicateConflict {
                    conflicting_name: req.name,
                    suggested_name,
                };
            }
            Err(e) => {
                warn!(user_id = %ctx.user_id(), error = %e, "Failed to create folder");
                return SaveOutcome::Failure { failure: e.into() };
            }
        };

        match normalize_record(&record, &req.parent_path) {
            Ok(FileSystemObject::Folder(folder)) => {
                info!(
                    user_id = %ctx.user_id(),
                    folder_id = %folder.id,
                    parent = %folder.parent_path,
                    name = %folder.meta.name,
                    "Folder created"
                );
                SaveOutcome::Saved { value: folder }
            }
            Ok(_) => SaveOutcome::Failure {
                failure: AppError::internal("Create folder returned a non-folder record").into(),
            },
            Err(e) => SaveOutcome::Failure { failure: e.into() },
        }
    }
}
