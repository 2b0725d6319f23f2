//! Client construction and session file location.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use tracing::debug;

use fintrack::{ApiClient, BaseUrl, ClientConfig, FileStore};

use crate::cli::Cli;

/// Everything a command needs.
pub struct Context {
    pub client: ApiClient,
    pub session_path: PathBuf,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let base_url = BaseUrl::new(&cli.api_url).context("Invalid API URL")?;
        let session_path = match &cli.session_file {
            Some(path) => path.clone(),
            None => default_session_path()?,
        };

        debug!(api = %base_url, session = %session_path.display(), "Using session file");

        let config = ClientConfig::new(base_url)
            .with_timeout(Duration::from_secs(cli.timeout))
            .with_user_agent(concat!("fintrack-cli/", env!("FINTRACK_VERSION")));
        let store = Arc::new(FileStore::new(&session_path));
        let client = ApiClient::new(config, store).context("Failed to create API client")?;

        Ok(Self {
            client,
            session_path,
        })
    }
}

/// Get the default session file path.
fn default_session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "fintrack").context("Could not determine data directory")?;

    Ok(dirs.data_dir().join("session.json"))
}
