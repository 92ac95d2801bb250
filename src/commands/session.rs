use super::Context;
use crate::error::{ErrorKind, Result};
use filestation_controller::Notice;

/// Credentials are sent before any command runs; this only reports whether
/// they took.
pub async fn login(ctx: &Context) -> Result<()> {
    let username = require_session(ctx).await?;
    println!("Logged in as {username}.");
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    ctx.api.logout().await.map_err(ErrorKind::client)?;
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    match ctx.api.check_session().await.map_err(ErrorKind::client)? {
        Some(username) => println!("{username}"),
        None => println!("Not logged in."),
    }
    Ok(())
}

async fn require_session(ctx: &Context) -> Result<String> {
    match ctx.api.check_session().await.map_err(ErrorKind::client)? {
        Some(username) => Ok(username),
        None => exn::bail!(ErrorKind::Notice(Notice::LoginRequired)),
    }
}
