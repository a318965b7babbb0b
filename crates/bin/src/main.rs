use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod input;

use cli::{Cli, Commands, GroupCommands, MemberCommands, PubkeyCommands, UserCommands};
use commands::Context;

fn main() {
    // Logs go to stderr so command output stays scriptable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("authdir=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::resolve(cli.dir, cli.user)?;

    match cli.command {
        Commands::Info => commands::info::run(&ctx),
        Commands::User(command) => match command {
            UserCommands::Ls => commands::user::ls(&ctx),
            UserCommands::Add(args) => commands::user::add(&ctx, &args),
            UserCommands::Rm(args) => commands::user::rm(&ctx, &args),
            UserCommands::Authorize(args) => commands::user::authorize(&ctx, &args),
            UserCommands::Deauthorize(args) => commands::user::deauthorize(&ctx, &args),
            UserCommands::Pubkey(command) => match command {
                PubkeyCommands::Set(args) => commands::user::pubkey_set(&ctx, &args),
                PubkeyCommands::Info(args) => commands::user::pubkey_info(&ctx, &args),
                PubkeyCommands::Print(args) => commands::user::pubkey_print(&ctx, &args),
            },
        },
        Commands::Group(command) => match command {
            GroupCommands::Ls => commands::group::ls(&ctx),
            GroupCommands::Add(args) => commands::group::add(&ctx, &args),
            GroupCommands::Rm(args) => commands::group::rm(&ctx, &args),
            GroupCommands::Authorize(args) => commands::group::authorize(&ctx, &args),
            GroupCommands::Deauthorize(args) => commands::group::deauthorize(&ctx, &args),
            GroupCommands::Member(command) => match command {
                MemberCommands::Ls(args) => commands::group::member_ls(&ctx, &args),
                MemberCommands::Add(args) => commands::group::member_add(&ctx, &args),
                MemberCommands::Rm(args) => commands::group::member_rm(&ctx, &args),
            },
        },
    }
}
