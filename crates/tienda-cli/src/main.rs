//! tienda - command-line client for the tienda marketplace API.
//!
//! A thin wrapper over `tienda-rest`: the session is kept in a credential
//! file between runs and refreshed transparently when the API rejects it.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{auth, dashboard, resource};
use tienda_core::models::{Order, OrderItem, Product, Review, Store, User};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let client = session::connect(&cli.connection)?;

    match cli.command {
        Commands::Auth(cmd) => auth::handle(&client, cmd).await,
        Commands::Users(cmd) => resource::handle::<User>(&client, cmd).await,
        Commands::Stores(cmd) => resource::handle::<Store>(&client, cmd).await,
        Commands::Products(cmd) => resource::handle::<Product>(&client, cmd).await,
        Commands::Orders(cmd) => resource::handle::<Order>(&client, cmd).await,
        Commands::OrderItems(cmd) => resource::handle::<OrderItem>(&client, cmd).await,
        Commands::Reviews(cmd) => resource::handle::<Review>(&client, cmd).await,
        Commands::Dashboard(args) => dashboard::run(&client, args).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
