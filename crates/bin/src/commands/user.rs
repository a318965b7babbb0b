//! User commands: records, memberships, grants, and key files.

use std::error::Error;

use tracing::debug;

use authdir::AuthDir;

use crate::cli::{
    PubkeySetArgs, PubkeyShowArgs, UserAddArgs, UserAuthorizeArgs, UserDeauthorizeArgs, UserRmArgs,
};
use crate::commands::Context;
use crate::commands::select::{all_device_users, select_device_users};
use crate::input::acquire_pubkey;

pub fn ls(ctx: &Context) -> Result<(), Box<dyn Error>> {
    for name in ctx.dir.users().names()? {
        println!("{name}");
    }
    Ok(())
}

pub fn add(ctx: &Context, args: &UserAddArgs) -> Result<(), Box<dyn Error>> {
    let user_id = ctx.require_user(args.user_id.as_deref())?;
    let pubkey = acquire_pubkey(
        args.pubkey.as_deref(),
        args.user_id.as_deref(),
        ctx.user_id.as_deref(),
    )?;

    ctx.dir.users().add(user_id, Some(&pubkey), args.force)?;
    join_groups(&ctx.dir, user_id, &args.groups, args.force)
}

pub fn rm(ctx: &Context, args: &UserRmArgs) -> Result<(), Box<dyn Error>> {
    let user_id = ctx.require_user(args.user_id.as_deref())?;

    revoke_everywhere(&ctx.dir, user_id)?;
    leave_all_groups(&ctx.dir, user_id)?;
    ctx.dir.users().remove(user_id, true)?;
    Ok(())
}

pub fn authorize(ctx: &Context, args: &UserAuthorizeArgs) -> Result<(), Box<dyn Error>> {
    let user_id = ctx.require_user(args.user_id.as_deref())?;
    let select = &args.select;

    let selected = select_device_users(
        &ctx.dir,
        &select.to_ids,
        select.to_all,
        &select.on,
        select.always,
    )?;

    for mut du in selected {
        match du.authorize_user(user_id, args.force) {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => {
                eprintln!(
                    "Warning: user '{user_id}' already authorized to device user '{}' on '{}'; skipping",
                    du.display_name(),
                    du.display_state_name()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

pub fn deauthorize(ctx: &Context, args: &UserDeauthorizeArgs) -> Result<(), Box<dyn Error>> {
    let user_id = ctx.require_user(args.user_id.as_deref())?;
    let select = &args.select;

    // With no selection at all, sweep the grant from the whole store.
    if select.is_empty() {
        return revoke_everywhere(&ctx.dir, user_id);
    }

    let selected = select_device_users(
        &ctx.dir,
        &select.from_ids,
        select.from_any,
        &select.on,
        select.always,
    )?;

    for mut du in selected {
        match du.deauthorize_user(user_id, args.force) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                eprintln!(
                    "Warning: user '{user_id}' not authorized to device user '{}' on '{}'; skipping",
                    du.display_name(),
                    du.display_state_name()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

pub fn pubkey_set(ctx: &Context, args: &PubkeySetArgs) -> Result<(), Box<dyn Error>> {
    let user_id = ctx.require_user(args.user_id.as_deref())?;
    let pubkey = acquire_pubkey(
        args.pubkey.as_deref(),
        args.user_id.as_deref(),
        ctx.user_id.as_deref(),
    )?;

    ctx.dir.users().get(user_id)?.set_pubkey_default(&pubkey)?;
    Ok(())
}

pub fn pubkey_info(ctx: &Context, args: &PubkeyShowArgs) -> Result<(), Box<dyn Error>> {
    let user_id = ctx.require_user(args.user_id.as_deref())?;
    let user = ctx.dir.users().get(user_id)?;
    let pubkeys = user.pubkeys();

    let selected = pubkeys
        .selected_filename()
        .map_or_else(|_| "null".to_string(), |p| p.display().to_string());
    let default = pubkeys
        .default_filename()
        .map_or_else(|_| "null".to_string(), |p| p.display().to_string());

    println!("{user_id}.pubkey.selected: '{selected}'");
    println!("{user_id}.pubkey.default: '{default}'");
    Ok(())
}

pub fn pubkey_print(ctx: &Context, args: &PubkeyShowArgs) -> Result<(), Box<dyn Error>> {
    let user_id = ctx.require_user(args.user_id.as_deref())?;
    let pubkey = ctx.dir.users().get(user_id)?.pubkey()?;

    for line in pubkey.text().lines() {
        println!("{line}");
    }
    Ok(())
}

/// Revoke the user's grants from every device user of every scope.
/// Grants that are not present are skipped.
fn revoke_everywhere(dir: &AuthDir, user_id: &str) -> Result<(), Box<dyn Error>> {
    for mut du in all_device_users(dir)? {
        match du.deauthorize_user(user_id, false) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(user = user_id, device_user = %du.display_name(), "No grant to revoke");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Drop the user from every group naming it. A missing groups document
/// counts as no groups.
fn leave_all_groups(dir: &AuthDir, user_id: &str) -> Result<(), Box<dyn Error>> {
    let groups = match dir.groups().iter() {
        Ok(groups) => groups,
        Err(e) if e.is_missing_file() => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    for mut group in groups {
        match group.remove_member(user_id, false) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(user = user_id, group = group.name(), "No membership to drop");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Join the named groups. Without `force` the failures are collected so
/// one bad group does not block the others; with `force` missing groups
/// are created first.
fn join_groups(
    dir: &AuthDir,
    user_id: &str,
    group_ids: &[String],
    force: bool,
) -> Result<(), Box<dyn Error>> {
    let groups = dir.groups();
    let mut failed = Vec::new();

    for group_id in group_ids {
        if force {
            groups.ensure(group_id)?.add_member(user_id, true)?;
        } else {
            let joined = groups
                .get(group_id)
                .and_then(|mut group| group.add_member(user_id, false));
            if let Err(e) = joined {
                eprintln!("Error: cannot add '{user_id}' to group '{group_id}': {e}");
                failed.push(group_id.clone());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(format!("User '{user_id}' not added to some groups: {}", failed.join(", ")).into())
    }
}
