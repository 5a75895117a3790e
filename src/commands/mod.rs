//! CLI command definitions and dispatch.

pub mod browse;
pub mod group;
pub mod lock;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};

use docvault_core::config::AppConfig;
use docvault_core::types::{DepartmentId, FolderPath, SortDirection, SortKey, SortSpec};
use docvault_entity::object::{FileSystemObject, VisibilityScope};
use docvault_service::{BrowserSession, RequestContext};

use crate::output::OutputFormat;
use crate::workspace::Workspace;

/// DocVault, a document browser over a seeded store
#[derive(Debug, Parser)]
#[command(name = "docvault", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (reads config/default and config/<env>)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// JSON snapshot holding users and objects; rewritten after mutations
    #[arg(short, long, default_value = "docvault.json")]
    pub seed: PathBuf,

    /// Acting user, by id or display name
    #[arg(short, long)]
    pub user: String,

    /// Browse the private scope instead of the department scope
    #[arg(long)]
    pub private: bool,

    /// Department to browse (defaults to the user's own)
    #[arg(long)]
    pub department: Option<DepartmentId>,

    /// Accept suggested names and confirmations without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List a folder: folders, then groups, then files
    Ls(browse::LsArgs),
    /// List the members of a group
    Open(browse::OpenArgs),
    /// Create a folder
    Mkdir(browse::MkdirArgs),
    /// Move objects to another folder
    Mv(transfer::MvArgs),
    /// Copy a file to another folder
    Cp(transfer::CpArgs),
    /// Rename an object in place
    Rename(transfer::RenameArgs),
    /// Move objects to the trash
    Rm(transfer::RmArgs),
    /// Lock an object
    Lock(lock::LockArgs),
    /// Unlock an object
    Unlock(lock::UnlockArgs),
    /// Star or unstar an object
    Star(lock::StarArgs),
    /// Group management
    Group(group::GroupArgs),
}

/// Everything a command needs to act.
pub struct Invocation {
    pub workspace: Workspace,
    pub ctx: RequestContext,
    pub scope: VisibilityScope,
    pub sort: SortSpec,
    pub format: OutputFormat,
    pub yes: bool,
}

impl Invocation {
    /// Open a session at a user-supplied path.
    pub async fn session(&self, path: &str) -> anyhow::Result<BrowserSession> {
        let path = FolderPath::parse(path)?;
        self.workspace
            .session_at(&self.ctx, self.scope, self.sort, &path)
            .await
    }

    /// Ask before doing something; `--yes` answers for the user.
    pub fn confirm(&self, prompt: &str, default: bool) -> anyhow::Result<bool> {
        if self.yes {
            return Ok(true);
        }
        Ok(dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    /// Offer the suggested name after a collision.
    pub fn accept_suggestion(&self, conflicting: &str, suggested: &str) -> anyhow::Result<bool> {
        self.confirm(
            &format!("'{conflicting}' already exists there. Use '{suggested}' instead?"),
            true,
        )
    }
}

/// Look an object up by name in the session's listing.
pub fn find(session: &BrowserSession, name: &str) -> anyhow::Result<FileSystemObject> {
    session
        .listing()
        .find_by_name(name)
        .cloned()
        .ok_or_else(|| anyhow!("'{name}' not found in '/{}'", session.current_path()))
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> anyhow::Result<()> {
        let workspace = Workspace::load(&self.seed, config).await?;
        let sort = workspace.config.client.default_sort;
        let principal = workspace.principal(&self.user).await?;
        let scope = if self.private {
            VisibilityScope::private()
        } else {
            VisibilityScope::department(self.department.or(principal.department_id))
        };
        let invocation = Invocation {
            workspace,
            ctx: RequestContext::new(principal),
            scope,
            sort,
            format: self.format,
            yes: self.yes,
        };

        let mutated = match &self.command {
            Commands::Ls(args) => browse::ls(&invocation, args).await.map(|()| false),
            Commands::Open(args) => browse::open(&invocation, args).await.map(|()| false),
            Commands::Mkdir(args) => browse::mkdir(&invocation, args).await,
            Commands::Mv(args) => transfer::mv(&invocation, args).await,
            Commands::Cp(args) => transfer::cp(&invocation, args).await,
            Commands::Rename(args) => transfer::rename(&invocation, args).await,
            Commands::Rm(args) => transfer::rm(&invocation, args).await,
            Commands::Lock(args) => lock::lock(&invocation, args).await,
            Commands::Unlock(args) => lock::unlock(&invocation, args).await,
            Commands::Star(args) => lock::star(&invocation, args).await,
            Commands::Group(args) => group::execute(&invocation, args).await,
        }?;

        if mutated {
            invocation
                .workspace
                .save()
                .await
                .context("Changes were applied but the seed file was not updated")?;
        }
        Ok(())
    }
}

/// Sort options shared by listing commands
#[derive(Debug, Clone, clap::Args)]
pub struct SortArgs {
    /// Sort key: name, modified, created, size
    #[arg(long, value_parser = parse_sort_key)]
    pub sort: Option<SortKey>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl SortArgs {
    pub fn resolve(&self, default: SortSpec) -> SortSpec {
        let key = self.sort.unwrap_or(default.key);
        let direction = if self.desc {
            SortDirection::Desc
        } else if self.sort.is_some() {
            SortDirection::Asc
        } else {
            default.direction
        };
        SortSpec::new(key, direction)
    }
}

fn parse_sort_key(raw: &str) -> Result<SortKey, String> {
    match raw.to_ascii_lowercase().as_str() {
        "name" => Ok(SortKey::Name),
        "modified" => Ok(SortKey::Modified),
        "created" => Ok(SortKey::Created),
        "size" => Ok(SortKey::Size),
        other => Err(format!("unknown sort key '{other}'")),
    }
}
