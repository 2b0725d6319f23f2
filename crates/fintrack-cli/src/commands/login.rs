//! Login command implementation.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use fintrack::Credentials;

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "FINTRACK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, ctx: &Context) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let response = ctx.client.sign_in(credentials).await;
    if !response.success {
        bail!(
            "Failed to login: {}",
            response.message.as_deref().unwrap_or("unknown error")
        );
    }

    output::success("Logged in successfully");
    println!();
    output::field("Email", &args.email);
    output::field("API", ctx.client.config().base_url());
    output::field("Session", ctx.session_path.display());

    Ok(())
}
