//! Auth subcommand implementations.

mod login;
mod logout;
mod me;
mod refresh;
mod register;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};
use tienda_rest::ApiClient;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Sign in and store the session
    Login(login::LoginArgs),

    /// Create an account
    Register(register::RegisterArgs),

    /// Erase the stored session
    Logout(logout::LogoutArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Fetch the signed-in user's profile from the API
    Me(me::MeArgs),

    /// Refresh the session tokens now
    Refresh(refresh::RefreshArgs),
}

pub async fn handle(client: &ApiClient, cmd: AuthCommand) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(client, args).await,
        AuthSubcommand::Register(args) => register::run(client, args).await,
        AuthSubcommand::Logout(args) => logout::run(client, args).await,
        AuthSubcommand::Whoami(args) => whoami::run(client, args).await,
        AuthSubcommand::Me(args) => me::run(client, args).await,
        AuthSubcommand::Refresh(args) => refresh::run(client, args).await,
    }
}
