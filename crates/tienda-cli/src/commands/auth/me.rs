//! Me command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tienda_rest::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct MeArgs {
    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(client: &ApiClient, args: MeArgs) -> Result<()> {
    let profile = client.auth().me().await.context("Failed to fetch profile")?;

    if args.pretty {
        output::json_pretty(&profile)
    } else {
        output::json(&profile)
    }
}
