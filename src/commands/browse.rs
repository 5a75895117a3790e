//! Listing commands.

use anyhow::bail;
use clap::Args;

use docvault_service::{GroupContents, SaveOutcome};

use super::{Invocation, SortArgs, find};
use crate::output::{self, ObjectRow};

/// Arguments for `ls`
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Folder path (empty or "/" for the root)
    #[arg(default_value = "")]
    pub path: String,
    #[command(flatten)]
    pub sort: SortArgs,
}

/// Arguments for `open`
#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Folder the group lives in
    pub path: String,
    /// Group name
    pub group: String,
    #[command(flatten)]
    pub sort: SortArgs,
}

/// Arguments for `mkdir`
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Parent folder path
    pub path: String,
    /// Folder name
    pub name: String,
}

pub async fn ls(inv: &Invocation, args: &LsArgs) -> anyhow::Result<()> {
    let mut session = inv.session(&args.path).await?;
    session.set_sort(args.sort.resolve(inv.sort)).await?;
    let rows: Vec<ObjectRow> = session.listing().items().iter().map(ObjectRow::from).collect();
    output::print_list(&rows, inv.format);
    Ok(())
}

pub async fn open(inv: &Invocation, args: &OpenArgs) -> anyhow::Result<()> {
    let mut session = inv.session(&args.path).await?;
    session.set_sort(args.sort.resolve(inv.sort)).await?;
    let object = find(&session, &args.group)?;
    let Some(group) = object.as_group() else {
        bail!("'{}' is a {}, not a group", args.group, object.kind());
    };

    match session.enter_group(group.id).await? {
        GroupContents::Members { files } => {
            let rows: Vec<ObjectRow> = files.items().iter().map(ObjectRow::from).collect();
            output::print_list(&rows, inv.format);
        }
        GroupContents::AccessDenied { required_role } => {
            output::print_error(&format!(
                "Group '{}' is locked; {required_role} or above can open it",
                group.meta.name
            ));
        }
    }
    Ok(())
}

pub async fn mkdir(inv: &Invocation, args: &MkdirArgs) -> anyhow::Result<bool> {
    let mut session = inv.session(&args.path).await?;

    let mut outcome = session.create_folder(&args.name).await;
    if let SaveOutcome::DuplicateConflict {
        conflicting_name,
        suggested_name,
    } = &outcome
        && inv.accept_suggestion(conflicting_name, suggested_name)?
    {
        outcome = session.create_folder(suggested_name).await;
    }

    match outcome {
        SaveOutcome::Saved { value } => {
            output::print_success(&format!("Created folder '/{}'", value.full_path()?));
            Ok(true)
        }
        SaveOutcome::DuplicateConflict {
            conflicting_name, ..
        } => {
            output::print_warning(&format!("'{conflicting_name}' already exists; nothing created"));
            Ok(false)
        }
        SaveOutcome::Failure { failure } => {
            output::print_error(&failure.message);
            Ok(false)
        }
    }
}
