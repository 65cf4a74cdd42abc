//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;

use tienda_core::Credentials;
use tienda_rest::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// First name
    #[arg(long)]
    pub first_name: String,

    /// Last name
    #[arg(long)]
    pub last_name: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "TIENDA_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(client: &ApiClient, args: RegisterArgs) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    let message = client
        .auth()
        .register(&args.first_name, &args.last_name, &credentials)
        .await
        .context("Failed to register")?;

    output::success(message.as_deref().unwrap_or("Account created"));
    println!("Run 'tienda auth login --email {}' to sign in.", args.email);

    Ok(())
}
