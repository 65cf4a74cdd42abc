//! CRUD subcommands shared by every entity collection.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use tienda_core::models::Resource;
use tienda_rest::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct ResourceCommand {
    #[command(subcommand)]
    pub command: ResourceSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ResourceSubcommand {
    /// List the collection
    List {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Fetch one entity
    Get {
        /// Entity id
        id: i64,
    },

    /// Create an entity from a JSON document
    Create {
        /// JSON body, e.g. '{"name":"Lamp","price":19.5,"stock":3,"storeId":1}'
        #[arg(long)]
        data: String,
    },

    /// Replace an entity from a JSON document
    Update {
        /// Entity id
        id: i64,

        /// JSON body
        #[arg(long)]
        data: String,
    },

    /// Delete an entity
    Delete {
        /// Entity id
        id: i64,
    },
}

fn parse_input<R: Resource>(data: &str) -> Result<R::Input>
where
    R::Input: serde::de::DeserializeOwned,
{
    serde_json::from_str(data).with_context(|| format!("Invalid {} JSON", R::NAME))
}

pub async fn handle<R>(client: &ApiClient, cmd: ResourceCommand) -> Result<()>
where
    R: Resource,
    R::Input: serde::de::DeserializeOwned,
{
    let api = client.resource::<R>();

    match cmd.command {
        ResourceSubcommand::List { pretty } => {
            let items = api
                .list()
                .await
                .with_context(|| format!("Failed to list {}s", R::NAME))?;

            if items.is_empty() {
                eprintln!("{}", "No entries found.".dimmed());
                return Ok(());
            }
            for item in &items {
                if pretty {
                    output::json_pretty(item)?;
                } else {
                    output::json(item)?;
                }
            }
        }
        ResourceSubcommand::Get { id } => {
            let item = api
                .get(id)
                .await
                .with_context(|| format!("Failed to fetch {} {}", R::NAME, id))?;
            output::json_pretty(&item)?;
        }
        ResourceSubcommand::Create { data } => {
            let input = parse_input::<R>(&data)?;
            let item = api
                .create(&input)
                .await
                .with_context(|| format!("Failed to create {}", R::NAME))?;
            output::success(&format!("Created {}", R::NAME));
            output::json_pretty(&item)?;
        }
        ResourceSubcommand::Update { id, data } => {
            let input = parse_input::<R>(&data)?;
            let item = api
                .update(id, &input)
                .await
                .with_context(|| format!("Failed to update {} {}", R::NAME, id))?;
            output::success(&format!("Updated {} {}", R::NAME, id));
            output::json_pretty(&item)?;
        }
        ResourceSubcommand::Delete { id } => {
            let message = api
                .delete(id)
                .await
                .with_context(|| format!("Failed to delete {} {}", R::NAME, id))?;
            if message.trim().is_empty() {
                output::success(&format!("Deleted {} {}", R::NAME, id));
            } else {
                output::success(message.trim());
            }
        }
    }

    Ok(())
}
