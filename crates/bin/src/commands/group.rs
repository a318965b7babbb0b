//! Group commands: records, members, and grants.

use std::error::Error;

use tracing::debug;

use authdir::AuthDir;

use crate::cli::{
    GroupAddArgs, GroupAuthorizeArgs, GroupDeauthorizeArgs, GroupRmArgs, MemberAddArgs,
    MemberLsArgs, MemberRmArgs,
};
use crate::commands::Context;
use crate::commands::select::{all_device_users, select_device_users};

pub fn ls(ctx: &Context) -> Result<(), Box<dyn Error>> {
    for name in ctx.dir.groups().names()? {
        println!("{name}");
    }
    Ok(())
}

pub fn add(ctx: &Context, args: &GroupAddArgs) -> Result<(), Box<dyn Error>> {
    ctx.dir.groups().add(&args.group_id, args.force)?;
    Ok(())
}

pub fn rm(ctx: &Context, args: &GroupRmArgs) -> Result<(), Box<dyn Error>> {
    revoke_everywhere(&ctx.dir, &args.group_id)?;

    match ctx.dir.groups().remove(&args.group_id) {
        Ok(_) => Ok(()),
        Err(e) if args.force && (e.is_not_found() || e.is_missing_file()) => {
            debug!(group = %args.group_id, "Removal of absent group tolerated");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn authorize(ctx: &Context, args: &GroupAuthorizeArgs) -> Result<(), Box<dyn Error>> {
    let group_id = &args.group_id;
    let select = &args.select;

    let selected = select_device_users(
        &ctx.dir,
        &select.to_ids,
        select.to_all,
        &select.on,
        select.always,
    )?;

    for mut du in selected {
        match du.authorize_group(group_id, args.force) {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => {
                eprintln!(
                    "Warning: group '{group_id}' already authorized to device user '{}' on '{}'; skipping",
                    du.display_name(),
                    du.display_state_name()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

pub fn deauthorize(ctx: &Context, args: &GroupDeauthorizeArgs) -> Result<(), Box<dyn Error>> {
    let group_id = &args.group_id;
    let select = &args.select;

    // With no selection at all, sweep the grant from the whole store.
    if select.is_empty() {
        return revoke_everywhere(&ctx.dir, group_id);
    }

    let selected = select_device_users(
        &ctx.dir,
        &select.from_ids,
        select.from_any,
        &select.on,
        select.always,
    )?;

    for mut du in selected {
        match du.deauthorize_group(group_id, args.force) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                eprintln!(
                    "Warning: group '{group_id}' not authorized to device user '{}' on '{}'; skipping",
                    du.display_name(),
                    du.display_state_name()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

pub fn member_ls(ctx: &Context, args: &MemberLsArgs) -> Result<(), Box<dyn Error>> {
    for name in ctx.dir.groups().get(&args.group_id)?.member_names() {
        println!("{name}");
    }
    Ok(())
}

pub fn member_add(ctx: &Context, args: &MemberAddArgs) -> Result<(), Box<dyn Error>> {
    let user_id = ctx.require_user(args.user_id.as_deref())?;

    let mut group = ctx.dir.groups().get(&args.group_id)?;
    group.add_member(user_id, args.force)?;
    Ok(())
}

pub fn member_rm(ctx: &Context, args: &MemberRmArgs) -> Result<(), Box<dyn Error>> {
    let mut group = ctx.dir.groups().get(&args.group_id)?;
    group.remove_member(&args.member_id, args.force)?;
    Ok(())
}

/// Revoke the group's grants from every device user of every scope.
/// Grants that are not present are skipped.
fn revoke_everywhere(dir: &AuthDir, group_id: &str) -> Result<(), Box<dyn Error>> {
    for mut du in all_device_users(dir)? {
        match du.deauthorize_group(group_id, false) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(group = group_id, device_user = %du.display_name(), "No grant to revoke");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
