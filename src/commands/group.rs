//! Group management commands.

use anyhow::bail;
use clap::{Args, Subcommand};

use docvault_entity::group::DEFAULT_GROUP_COLOR;
use docvault_service::{ActionOutcome, GroupContents, SaveOutcome};

use super::{Invocation, find};
use crate::output;

/// Arguments for group commands
#[derive(Debug, Args)]
pub struct GroupArgs {
    /// Group subcommand
    #[command(subcommand)]
    pub command: GroupCommand,
}

/// Group subcommands
#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// Create a group in a folder
    Create {
        /// Folder path
        path: String,
        /// Group name
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Color as #rrggbb
        #[arg(long, default_value = DEFAULT_GROUP_COLOR)]
        color: String,
    },
    /// Add a file to a group in the same folder
    Add {
        /// Folder path
        path: String,
        /// File name
        file: String,
        /// Group name
        group: String,
    },
    /// Remove a file from a group
    Remove {
        /// Folder path
        path: String,
        /// Group name
        group: String,
        /// File name
        file: String,
    },
    /// Delete a group; its files stay where they are
    Delete {
        /// Folder path
        path: String,
        /// Group name
        group: String,
    },
}

/// Execute group commands
pub async fn execute(inv: &Invocation, args: &GroupArgs) -> anyhow::Result<bool> {
    match &args.command {
        GroupCommand::Create {
            path,
            name,
            description,
            color,
        } => {
            let mut session = inv.session(path).await?;
            let mut outcome = session.create_group(name, description.clone(), color).await;
            if let SaveOutcome::DuplicateConflict {
                conflicting_name,
                suggested_name,
            } = &outcome
                && inv.accept_suggestion(conflicting_name, suggested_name)?
            {
                outcome = session
                    .create_group(suggested_name, description.clone(), color)
                    .await;
            }
            match outcome {
                SaveOutcome::Saved { value } => {
                    output::print_success(&format!("Created group '{}' ({})", value.meta.name, value.id));
                    Ok(true)
                }
                SaveOutcome::DuplicateConflict {
                    conflicting_name, ..
                } => {
                    output::print_warning(&format!("A group named '{conflicting_name}' already exists"));
                    Ok(false)
                }
                SaveOutcome::Failure { failure } => {
                    output::print_error(&failure.message);
                    Ok(false)
                }
            }
        }
        GroupCommand::Add { path, file, group } => {
            let mut session = inv.session(path).await?;
            let file_id = find(&session, file)?.id();
            let target = find(&session, group)?;
            let Some(target) = target.as_group() else {
                bail!("'{group}' is not a group");
            };
            let outcome = session.add_to_group(file_id, target.id).await?;
            Ok(report(outcome, &format!("Added '{file}' to '{group}'")))
        }
        GroupCommand::Remove { path, group, file } => {
            let mut session = inv.session(path).await?;
            let target = find(&session, group)?;
            let Some(target) = target.as_group() else {
                bail!("'{group}' is not a group");
            };
            if let GroupContents::AccessDenied { required_role } = session.enter_group(target.id).await? {
                bail!("Group '{group}' is locked; {required_role} or above can open it");
            }
            let file_id = find(&session, file)?.id();
            let outcome = session.remove_from_current_group(file_id).await?;
            Ok(report(outcome, &format!("Removed '{file}' from '{group}'")))
        }
        GroupCommand::Delete { path, group } => {
            let mut session = inv.session(path).await?;
            let target = find(&session, group)?;
            let Some(target) = target.as_group() else {
                bail!("'{group}' is not a group");
            };
            if !inv.confirm(&format!("Delete group '{group}'? Its files are kept."), false)? {
                output::print_warning("Cancelled");
                return Ok(false);
            }
            let outcome = session.delete_group(target.id).await?;
            Ok(report(outcome, &format!("Deleted group '{group}'")))
        }
    }
}

fn report<T>(outcome: ActionOutcome<T>, done: &str) -> bool {
    match outcome {
        ActionOutcome::Done { .. } => {
            output::print_success(done);
            true
        }
        ActionOutcome::Denied {
            reason,
            required_role,
        } => {
            match required_role {
                Some(role) => output::print_error(&format!("{reason} ({role} or above required)")),
                None => output::print_error(&reason),
            }
            false
        }
        ActionOutcome::Failure { failure } => {
            output::print_error(&failure.message);
            false
        }
    }
}
