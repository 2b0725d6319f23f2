//! Whoami command implementation.

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Args;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, ctx: &Context) -> Result<()> {
    let session = ctx
        .client
        .current_session()
        .await
        .context("Failed to load session")?
        .context("No active session. Run 'fintrack login' first.")?;

    if let Some(user) = &session.user {
        if let Some(email) = user.get("email").and_then(|v| v.as_str()) {
            output::field("Email", email);
        }
        if let Some(id) = user.get("id").and_then(|v| v.as_str()) {
            output::field("User ID", id);
        }
    }
    output::field("API", ctx.client.config().base_url());
    output::field("Saved", session.saved_at.to_rfc3339());

    let age = Utc::now().signed_duration_since(session.saved_at);
    output::field("Age", format!("{}m", age.num_minutes().max(0)));

    Ok(())
}
