//! Client construction and session storage location.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tienda_core::Navigator;
use tienda_file::FileCredentialStore;
use tienda_rest::{ApiClient, ClientConfig, NavigationHook};

use crate::cli::ConnectionArgs;
use crate::output;

/// Reports session transitions on the terminal.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn reset_to_unauthenticated(&self) {
        output::warning("Signed out. Run 'tienda auth login' to sign in again.");
    }

    fn reset_to_authenticated(&self) {
        tracing::debug!("session started");
    }
}

/// Default credential file path.
fn default_credentials_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "tienda").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("credentials.json"))
}

/// Build an API client over the stored session.
pub fn connect(args: &ConnectionArgs) -> Result<ApiClient> {
    let path = match &args.credentials {
        Some(path) => path.clone(),
        None => default_credentials_path()?,
    };
    let store = FileCredentialStore::open(&path)
        .with_context(|| format!("Failed to open credential file {}", path.display()))?;

    let config = ClientConfig::from_url(&args.api_url)
        .context("Invalid API URL")?
        .with_timeout(Duration::from_secs(args.timeout_secs));

    let navigation = Arc::new(NavigationHook::new());
    navigation.mount(Arc::new(TerminalNavigator));

    ApiClient::new(&config, Arc::new(store), navigation).context("Failed to create API client")
}
