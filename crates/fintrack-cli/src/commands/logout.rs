//! Logout command implementation.

use anyhow::{Result, bail};
use clap::Args;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, ctx: &Context) -> Result<()> {
    let response = ctx.client.sign_out().await;
    if !response.success {
        bail!(
            "Failed to logout: {}",
            response.message.as_deref().unwrap_or("unknown error")
        );
    }

    output::success("Logged out");
    Ok(())
}
