//! Refresh command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(_args: RefreshArgs, ctx: &Context) -> Result<()> {
    eprintln!("{}", "Refreshing session...".dimmed());

    ctx.client
        .refresh_session()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    output::field("Session", ctx.session_path.display());

    Ok(())
}
