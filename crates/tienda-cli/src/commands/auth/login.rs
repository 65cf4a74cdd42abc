//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tienda_core::Credentials;
use tienda_rest::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "TIENDA_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(client: &ApiClient, args: LoginArgs) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Signing in...".dimmed());

    let profile = client
        .auth()
        .login(&credentials)
        .await
        .context("Failed to sign in")?;

    output::success("Signed in successfully");
    println!();
    output::field("User", &profile.user_id);
    output::field("Email", &profile.email);
    output::field("Role", &profile.role);

    Ok(())
}
