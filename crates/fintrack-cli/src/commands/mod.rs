//! Subcommand implementations.

mod login;
mod logout;
mod refresh;
mod request;
mod upload;
mod whoami;

use anyhow::{Result, bail};
use clap::Subcommand;

use fintrack::ApiResponse;

use crate::output;
use crate::session::Context;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session
    Login(login::LoginArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    Refresh(refresh::RefreshArgs),

    /// Sign out and forget the stored session
    Logout(logout::LogoutArgs),

    /// Send a request to an API endpoint
    Request(request::RequestArgs),

    /// Upload files as multipart form data
    Upload(upload::UploadArgs),
}

pub async fn handle(cmd: Commands, ctx: &Context) -> Result<()> {
    match cmd {
        Commands::Login(args) => login::run(args, ctx).await,
        Commands::Whoami(args) => whoami::run(args, ctx).await,
        Commands::Refresh(args) => refresh::run(args, ctx).await,
        Commands::Logout(args) => logout::run(args, ctx).await,
        Commands::Request(args) => request::run(args, ctx).await,
        Commands::Upload(args) => upload::run(args, ctx).await,
    }
}

/// Print the response envelope and fail the command if the call failed.
fn print_response(response: &ApiResponse, compact: bool) -> Result<()> {
    output::envelope(response, compact)?;

    if response.needs_login {
        bail!("Not signed in. Run 'fintrack login' first.");
    }
    if !response.success {
        bail!(
            "{}",
            response.message.as_deref().unwrap_or("Request failed")
        );
    }
    Ok(())
}
