//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tienda_rest::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(client: &ApiClient, _args: RefreshArgs) -> Result<()> {
    client
        .auth()
        .refresh_session()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed");

    Ok(())
}
