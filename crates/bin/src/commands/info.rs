//! Store info command - shows the resolved root and default user.

use crate::commands::Context;

pub fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    println!("dir: '{}'", ctx.dir.root().display());
    if let Some(user_id) = &ctx.user_id {
        println!("user: '{user_id}'");
    }
    Ok(())
}
