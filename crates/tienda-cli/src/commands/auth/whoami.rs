//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tienda_rest::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(client: &ApiClient, _args: WhoamiArgs) -> Result<()> {
    let profile = client
        .auth()
        .current_profile()
        .await
        .context("Failed to read stored session")?
        .context("No active session. Run 'tienda auth login' first.")?;

    output::field("User", &profile.user_id);
    output::field("Email", &profile.email);
    output::field("Name", format!("{} {}", profile.first_name, profile.last_name).trim());
    output::field("Role", &profile.role);

    Ok(())
}
