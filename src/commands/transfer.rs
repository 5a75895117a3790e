//! Move, copy, rename, and delete commands.

use clap::Args;
use tokio_util::sync::CancellationToken;

use docvault_core::types::{DepartmentId, FolderPath};
use docvault_entity::object::{Visibility, VisibilityScope};
use docvault_service::{BulkItemStatus, CopyResult, MoveResult, MoveTarget};

use super::{Invocation, find};
use crate::output;

/// Arguments for `mv`
#[derive(Debug, Args)]
pub struct MvArgs {
    /// Folder the objects are in
    pub path: String,
    /// Names to move
    #[arg(required = true)]
    pub names: Vec<String>,
    /// Destination folder path
    #[arg(long)]
    pub to: String,
    /// Move into the private scope
    #[arg(long)]
    pub to_private: bool,
    /// Destination department
    #[arg(long)]
    pub to_department: Option<DepartmentId>,
}

/// Arguments for `cp`
#[derive(Debug, Args)]
pub struct CpArgs {
    /// Folder the file is in
    pub path: String,
    /// File name
    pub name: String,
    /// Destination folder path
    #[arg(long)]
    pub to: String,
}

/// Arguments for `rename`
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Folder the object is in
    pub path: String,
    /// Current name
    pub name: String,
    /// New name
    pub new_name: String,
}

/// Arguments for `rm`
#[derive(Debug, Args)]
pub struct RmArgs {
    /// Folder the objects are in
    pub path: String,
    /// Names to delete
    #[arg(required = true)]
    pub names: Vec<String>,
}

pub async fn mv(inv: &Invocation, args: &MvArgs) -> anyhow::Result<bool> {
    let mut session = inv.session(&args.path).await?;
    for name in &args.names {
        let id = find(&session, name)?.id();
        session.select(id);
    }

    let (visibility, dest_scope) = if args.to_private {
        (Visibility::Private, VisibilityScope::private())
    } else {
        let department = args.to_department.or(inv.scope.department_id);
        (Visibility::Department, VisibilityScope::department(department))
    };
    let dest = FolderPath::parse(&args.to)?;
    let parent = inv.workspace.folder_id_at(&inv.ctx, &dest, &dest_scope).await?;
    let target = MoveTarget::folder(parent, visibility).with_department(dest_scope.department_id);

    let outcome = session
        .move_selected(&target, &CancellationToken::new())
        .await;
    output::print_bulk(&outcome, "moved", inv.format);
    let mut mutated = outcome.success > 0;

    for item in &outcome.items {
        let BulkItemStatus::Duplicate { suggested_name } = &item.status else {
            continue;
        };
        if !inv.accept_suggestion(&item.name, suggested_name)? {
            continue;
        }
        let renamed = target.clone().with_name(suggested_name.clone());
        match session.move_object(item.id, &renamed).await? {
            MoveResult::Success => {
                output::print_success(&format!("Moved '{}' as '{suggested_name}'", item.name));
                mutated = true;
            }
            other => report_move(&item.name, &other),
        }
    }
    Ok(mutated)
}

pub async fn cp(inv: &Invocation, args: &CpArgs) -> anyhow::Result<bool> {
    let mut session = inv.session(&args.path).await?;
    let id = find(&session, &args.name)?.id();
    session.copy_to_clipboard(id)?;
    session.navigate(FolderPath::parse(&args.to)?).await?;

    let mut result = session.paste().await?;
    if let CopyResult::DuplicateConflict {
        conflicting_name,
        suggested_name,
    } = &result
        && inv.accept_suggestion(conflicting_name, suggested_name)?
    {
        result = session.paste_with_name(suggested_name).await?;
    }

    match &result {
        CopyResult::Copied { file } => {
            output::print_success(&format!("Copied to '{}' ({})", file.meta.name, file.id));
            Ok(true)
        }
        CopyResult::NotCopyable { kind } => {
            output::print_error(&format!("A {kind} cannot be copied"));
            Ok(false)
        }
        CopyResult::DuplicateConflict {
            conflicting_name, ..
        } => {
            output::print_warning(&format!("'{conflicting_name}' already exists; nothing copied"));
            Ok(false)
        }
        CopyResult::Failure { failure } => {
            output::print_error(&failure.message);
            Ok(false)
        }
    }
}

pub async fn rename(inv: &Invocation, args: &RenameArgs) -> anyhow::Result<bool> {
    let mut session = inv.session(&args.path).await?;
    let id = find(&session, &args.name)?.id();

    let mut result = session.rename(id, &args.new_name).await?;
    if let MoveResult::DuplicateConflict {
        conflicting_name,
        suggested_name,
    } = &result
        && inv.accept_suggestion(conflicting_name, suggested_name)?
    {
        result = session.rename(id, suggested_name).await?;
    }

    if result.is_success() {
        output::print_success(&format!("Renamed '{}'", args.name));
        return Ok(true);
    }
    report_move(&args.name, &result);
    Ok(false)
}

pub async fn rm(inv: &Invocation, args: &RmArgs) -> anyhow::Result<bool> {
    let mut session = inv.session(&args.path).await?;
    for name in &args.names {
        let id = find(&session, name)?.id();
        session.select(id);
    }
    let prompt = format!("Move {} item(s) to the trash?", session.selection().len());
    if !inv.confirm(&prompt, false)? {
        output::print_warning("Cancelled");
        return Ok(false);
    }

    let outcome = session.delete_selected(&CancellationToken::new()).await;
    output::print_bulk(&outcome, "deleted", inv.format);
    Ok(outcome.success > 0)
}

fn report_move(name: &str, result: &MoveResult) {
    match result {
        MoveResult::Success => output::print_success(&format!("'{name}' done")),
        MoveResult::DuplicateConflict {
            conflicting_name,
            suggested_name,
        } => output::print_warning(&format!(
            "'{conflicting_name}' already exists (suggested: '{suggested_name}')"
        )),
        MoveResult::Failure { failure } => output::print_error(&format!("{name}: {}", failure.message)),
    }
}
