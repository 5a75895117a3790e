//! Lock, unlock, and star commands.

use clap::Args;

use docvault_entity::principal::Role;
use docvault_service::{LockOutcome, StarOutcome, UnlockOutcome};

use super::{Invocation, find};
use crate::output;

/// Arguments for `lock`
#[derive(Debug, Args)]
pub struct LockArgs {
    /// Folder the object is in
    pub path: String,
    /// Object name
    pub name: String,
    /// Password that lets others unlock it
    #[arg(long)]
    pub password: Option<String>,
    /// Lowest role that may bypass the lock (default SuperAdmin)
    #[arg(long)]
    pub role: Option<Role>,
}

/// Arguments for `unlock`
#[derive(Debug, Args)]
pub struct UnlockArgs {
    /// Folder the object is in
    pub path: String,
    /// Object name
    pub name: String,
    /// Lock password, if one is needed
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for `star`
#[derive(Debug, Args)]
pub struct StarArgs {
    /// Folder the object is in
    pub path: String,
    /// Object name
    pub name: String,
}

pub async fn lock(inv: &Invocation, args: &LockArgs) -> anyhow::Result<bool> {
    let mut session = inv.session(&args.path).await?;
    let id = find(&session, &args.name)?.id();

    match session
        .lock(id, args.password.as_deref(), args.role)
        .await?
    {
        LockOutcome::Locked => {
            output::print_success(&format!("Locked '{}'", args.name));
            Ok(true)
        }
        LockOutcome::AlreadyLocked => {
            output::print_warning(&format!("'{}' is already locked", args.name));
            Ok(false)
        }
        LockOutcome::NotLockable => {
            output::print_error(&format!("'{}' cannot be locked", args.name));
            Ok(false)
        }
        LockOutcome::Failure { failure } => {
            output::print_error(&failure.message);
            Ok(false)
        }
    }
}

pub async fn unlock(inv: &Invocation, args: &UnlockArgs) -> anyhow::Result<bool> {
    let mut session = inv.session(&args.path).await?;
    let id = find(&session, &args.name)?.id();

    let mut password = args.password.clone();
    loop {
        match session.unlock(id, password.as_deref()).await? {
            UnlockOutcome::Unlocked { by_password } => {
                let how = if by_password { " with password" } else { "" };
                output::print_success(&format!("Unlocked '{}'{how}", args.name));
                return Ok(true);
            }
            UnlockOutcome::NotLocked => {
                output::print_warning(&format!("'{}' is not locked", args.name));
                return Ok(false);
            }
            UnlockOutcome::PasswordRequired { message } => {
                output::print_warning(&message);
                if inv.yes {
                    return Ok(false);
                }
                let entered = dialoguer::Password::new()
                    .with_prompt("Lock password (empty to give up)")
                    .allow_empty_password(true)
                    .interact()?;
                if entered.is_empty() {
                    return Ok(false);
                }
                password = Some(entered);
            }
            UnlockOutcome::Denied { required_role } => {
                output::print_error(&format!(
                    "'{}' can only be unlocked by its owner, the locker, or {required_role} and above",
                    args.name
                ));
                return Ok(false);
            }
            UnlockOutcome::Failure { failure } => {
                output::print_error(&failure.message);
                return Ok(false);
            }
        }
    }
}

pub async fn star(inv: &Invocation, args: &StarArgs) -> anyhow::Result<bool> {
    let mut session = inv.session(&args.path).await?;
    let id = find(&session, &args.name)?.id();

    match session.toggle_star(id).await? {
        StarOutcome::Applied { starred } => {
            let verb = if starred { "Starred" } else { "Unstarred" };
            output::print_success(&format!("{verb} '{}'", args.name));
            Ok(true)
        }
        StarOutcome::Reverted { failure, .. } => {
            output::print_error(&format!("Star not saved: {}", failure.message));
            Ok(false)
        }
    }
}
