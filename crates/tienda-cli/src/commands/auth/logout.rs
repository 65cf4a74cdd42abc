//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tienda_rest::ApiClient;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(client: &ApiClient, _args: LogoutArgs) -> Result<()> {
    client
        .auth()
        .logout()
        .await
        .context("Failed to erase stored session")
}
