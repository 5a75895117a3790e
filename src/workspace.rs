//! A seeded document server plus the service graph over it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use tracing::info;

use docvault_core::config::AppConfig;
use docvault_core::types::{FolderId, FolderPath, SortSpec, UserId};
use docvault_entity::object::VisibilityScope;
use docvault_entity::principal::Principal;
use docvault_service::{
    BrowserSession, DocumentApi, MemoryDocumentApi, RequestContext, Services, Snapshot,
};

/// The loaded seed and everything built on it.
#[derive(Debug)]
pub struct Workspace {
    pub api: Arc<MemoryDocumentApi>,
    pub services: Services,
    pub config: AppConfig,
    seed: PathBuf,
}

impl Workspace {
    /// Read the seed snapshot. A missing file starts an empty store.
    pub async fn load(seed: &Path, config: AppConfig) -> anyhow::Result<Self> {
        let snapshot = match tokio::fs::read_to_string(seed).await {
            Ok(raw) => serde_json::from_str::<Snapshot>(&raw)
                .with_context(|| format!("Invalid seed file {}", seed.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e).with_context(|| format!("Cannot read {}", seed.display())),
        };
        info!(
            seed = %seed.display(),
            users = snapshot.users.len(),
            folders = snapshot.folders.len(),
            files = snapshot.files.len(),
            groups = snapshot.groups.len(),
            "Seed loaded"
        );

        let api = Arc::new(MemoryDocumentApi::new(snapshot, &config.operations));
        let services = Services::new(api.clone(), &config)?;
        Ok(Self {
            api,
            services,
            config,
            seed: seed.to_path_buf(),
        })
    }

    /// Find a principal by id or display name.
    pub async fn principal(&self, user: &str) -> anyhow::Result<Principal> {
        let snapshot = self.api.snapshot().await;
        let by_id = user.parse::<uuid::Uuid>().ok().map(UserId::from_uuid);
        snapshot
            .users
            .into_iter()
            .find(|p| Some(p.id) == by_id || p.display_name.eq_ignore_ascii_case(user))
            .ok_or_else(|| anyhow!("Unknown user '{user}'"))
    }

    /// Open a session positioned at `path`.
    pub async fn session_at(
        &self,
        ctx: &RequestContext,
        scope: VisibilityScope,
        sort: SortSpec,
        path: &FolderPath,
    ) -> anyhow::Result<BrowserSession> {
        let mut session =
            BrowserSession::open(self.services.clone(), ctx.clone(), scope, sort).await?;
        if !path.is_root() {
            session
                .navigate(path.clone())
                .await
                .with_context(|| format!("Cannot open '{path}'"))?;
        }
        Ok(session)
    }

    /// The id of the folder at `path`; `None` for the root.
    pub async fn folder_id_at(
        &self,
        ctx: &RequestContext,
        path: &FolderPath,
        scope: &VisibilityScope,
    ) -> anyhow::Result<Option<FolderId>> {
        if path.is_root() {
            return Ok(None);
        }
        match self.api.find_folder(&ctx.principal, path, scope).await? {
            Some(record) => Ok(Some(FolderId::from_uuid(record.id))),
            None => bail!("No folder at '{path}'"),
        }
    }

    /// Write the current state back to the seed file.
    pub async fn save(&self) -> anyhow::Result<()> {
        let snapshot = self.api.snapshot().await;
        let raw = serde_json::to_string_pretty(&snapshot)?;
        tokio::fs::write(&self.seed, raw)
            .await
            .with_context(|| format!("Cannot write {}", self.seed.display()))?;
        Ok(())
    }
}
