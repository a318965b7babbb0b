//! CLI argument definitions for the authdir binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SSH access metadata store CLI
#[derive(Parser, Debug)]
#[command(name = "authdir")]
#[command(about = "Manage SSH users, groups, and device-user grants kept in plain files")]
#[command(version)]
pub struct Cli {
    /// Store directory to operate on, defaulting to the current directory
    #[arg(short = 'C', long, global = true, value_name = "PATH", env = "AUTHDIR_DIR")]
    pub dir: Option<PathBuf>,

    /// Default user id that user commands fall back to
    #[arg(short, long, global = true, value_name = "USER", env = "AUTHDIR_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resolved store root and default user
    Info,
    /// Manage user records and their key files
    #[command(subcommand)]
    User(UserCommands),
    /// Manage group records and their members
    #[command(subcommand)]
    Group(GroupCommands),
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List user ids
    Ls,
    /// Add a user record and install its public key
    Add(UserAddArgs),
    /// Remove a user together with its key files, memberships, and grants
    Rm(UserRmArgs),
    /// Grant a user access to device users on selected scopes
    Authorize(UserAuthorizeArgs),
    /// Revoke a user's grants
    Deauthorize(UserDeauthorizeArgs),
    /// Inspect or replace a user's public key
    #[command(subcommand)]
    Pubkey(PubkeyCommands),
}

/// Arguments for the user add command
#[derive(clap::Args, Debug)]
pub struct UserAddArgs {
    /// User id, defaulting to the global --user
    #[arg(value_name = "USER")]
    pub user_id: Option<String>,

    /// Public key: '-' reads stdin, a readable path reads that file,
    /// anything else is taken as the key text itself
    #[arg(value_name = "KEY")]
    pub pubkey: Option<String>,

    /// Group to join; repeatable
    #[arg(short, long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Tolerate an existing record and create missing groups
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the user rm command
#[derive(clap::Args, Debug)]
pub struct UserRmArgs {
    /// User id, defaulting to the global --user
    #[arg(value_name = "USER")]
    pub user_id: Option<String>,
}

/// Arguments for the user authorize command
#[derive(clap::Args, Debug)]
pub struct UserAuthorizeArgs {
    /// User id, defaulting to the global --user
    #[arg(value_name = "USER")]
    pub user_id: Option<String>,

    #[command(flatten)]
    pub select: GrantSelectArgs,

    /// Tolerate grants that are already present
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the user deauthorize command
#[derive(clap::Args, Debug)]
pub struct UserDeauthorizeArgs {
    /// User id, defaulting to the global --user
    #[arg(value_name = "USER")]
    pub user_id: Option<String>,

    #[command(flatten)]
    pub select: RevokeSelectArgs,

    /// Tolerate grants that are already absent
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Subcommand, Debug)]
pub enum PubkeyCommands {
    /// Install a new key at the user's write location
    Set(PubkeySetArgs),
    /// Print the resolved read and write key paths
    Info(PubkeyShowArgs),
    /// Print the key a read of the user resolves to
    Print(PubkeyShowArgs),
}

/// Arguments for the pubkey set command
#[derive(clap::Args, Debug)]
pub struct PubkeySetArgs {
    /// User id, defaulting to the global --user
    #[arg(value_name = "USER")]
    pub user_id: Option<String>,

    /// Public key: '-' reads stdin, a readable path reads that file,
    /// anything else is taken as the key text itself
    #[arg(value_name = "KEY")]
    pub pubkey: Option<String>,
}

/// Arguments for the pubkey info and print commands
#[derive(clap::Args, Debug)]
pub struct PubkeyShowArgs {
    /// User id, defaulting to the global --user
    #[arg(value_name = "USER")]
    pub user_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// List group ids
    Ls,
    /// Add a group record
    Add(GroupAddArgs),
    /// Remove a group and revoke its grants everywhere
    Rm(GroupRmArgs),
    /// Grant a group access to device users on selected scopes
    Authorize(GroupAuthorizeArgs),
    /// Revoke a group's grants
    Deauthorize(GroupDeauthorizeArgs),
    /// Manage group members
    #[command(subcommand)]
    Member(MemberCommands),
}

/// Arguments for the group add command
#[derive(clap::Args, Debug)]
pub struct GroupAddArgs {
    /// Group id
    #[arg(value_name = "GROUP")]
    pub group_id: String,

    /// Tolerate an existing record
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the group rm command
#[derive(clap::Args, Debug)]
pub struct GroupRmArgs {
    /// Group id
    #[arg(value_name = "GROUP")]
    pub group_id: String,

    /// Tolerate a group that is already absent
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the group authorize command
#[derive(clap::Args, Debug)]
pub struct GroupAuthorizeArgs {
    /// Group id
    #[arg(value_name = "GROUP")]
    pub group_id: String,

    #[command(flatten)]
    pub select: GrantSelectArgs,

    /// Tolerate grants that are already present
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the group deauthorize command
#[derive(clap::Args, Debug)]
pub struct GroupDeauthorizeArgs {
    /// Group id
    #[arg(value_name = "GROUP")]
    pub group_id: String,

    #[command(flatten)]
    pub select: RevokeSelectArgs,

    /// Tolerate grants that are already absent
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// List members of a group
    Ls(MemberLsArgs),
    /// Add a user to a group
    Add(MemberAddArgs),
    /// Remove a user from a group
    Rm(MemberRmArgs),
}

/// Arguments for the member ls command
#[derive(clap::Args, Debug)]
pub struct MemberLsArgs {
    /// Group id
    #[arg(value_name = "GROUP")]
    pub group_id: String,
}

/// Arguments for the member add command
#[derive(clap::Args, Debug)]
pub struct MemberAddArgs {
    /// Group id
    #[arg(value_name = "GROUP")]
    pub group_id: String,

    /// User id, defaulting to the global --user
    #[arg(value_name = "USER")]
    pub user_id: Option<String>,

    /// Tolerate a membership that is already present
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the member rm command
#[derive(clap::Args, Debug)]
pub struct MemberRmArgs {
    /// Group id
    #[arg(value_name = "GROUP")]
    pub group_id: String,

    /// Member user id
    #[arg(value_name = "USER")]
    pub member_id: String,

    /// Tolerate a membership that is already absent
    #[arg(short, long)]
    pub force: bool,
}

/// Device user and state selection for the authorize commands.
///
/// Both a device user indication (--to or --to-all) and a state
/// indication (--on or --always) are required; missing device user
/// records are created on the fly.
#[derive(clap::Args, Debug)]
pub struct GrantSelectArgs {
    /// Device user to authorize to; repeatable
    #[arg(long = "to", value_name = "DEVICE_USER")]
    pub to_ids: Vec<String>,

    /// Authorize through the match-all record covering every device user
    #[arg(long, conflicts_with = "to_ids")]
    pub to_all: bool,

    /// Constrain the grant to a device state; repeatable
    #[arg(long, value_name = "STATE")]
    pub on: Vec<String>,

    /// Grant regardless of device state
    #[arg(long, conflicts_with = "on")]
    pub always: bool,
}

/// Device user and state selection for the deauthorize commands.
#[derive(clap::Args, Debug)]
pub struct RevokeSelectArgs {
    /// Device user to revoke from; repeatable
    #[arg(long = "from", value_name = "DEVICE_USER")]
    pub from_ids: Vec<String>,

    /// Revoke from the match-all record
    #[arg(long, conflicts_with = "from_ids")]
    pub from_any: bool,

    /// Constrain the revocation to a device state; repeatable
    #[arg(long, value_name = "STATE")]
    pub on: Vec<String>,

    /// Target the state-independent grants
    #[arg(long, conflicts_with = "on")]
    pub always: bool,
}

impl RevokeSelectArgs {
    /// Whether no selection was given at all, which the deauthorize
    /// commands treat as a store-wide sweep.
    pub fn is_empty(&self) -> bool {
        self.from_ids.is_empty() && !self.from_any && self.on.is_empty() && !self.always
    }
}
