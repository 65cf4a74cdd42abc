//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::auth::AuthCommand;
use crate::commands::dashboard::DashboardArgs;
use crate::commands::resource::ResourceCommand;

/// Command-line client for the tienda marketplace API.
#[derive(Parser, Debug)]
#[command(name = "tienda")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the API lives and where the session is kept.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// API base URL
    #[arg(long, env = "TIENDA_API_URL", default_value = tienda_rest::DEFAULT_BASE_URL, global = true)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "TIENDA_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    /// Credential file (defaults to the user data directory)
    #[arg(long, env = "TIENDA_CREDENTIALS", global = true)]
    pub credentials: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and inspect the session
    Auth(AuthCommand),

    /// Manage users
    Users(ResourceCommand),

    /// Manage stores
    Stores(ResourceCommand),

    /// Manage products
    Products(ResourceCommand),

    /// Manage orders
    Orders(ResourceCommand),

    /// Manage order items
    OrderItems(ResourceCommand),

    /// Manage reviews
    Reviews(ResourceCommand),

    /// Show marketplace counters
    Dashboard(DashboardArgs),
}
