//! Dashboard command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tienda_rest::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Print the raw counters as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(client: &ApiClient, args: DashboardArgs) -> Result<()> {
    let stats = client
        .dashboard()
        .stats()
        .await
        .context("Failed to fetch dashboard")?;

    if args.json {
        return output::json_pretty(&stats);
    }

    output::field("Users", &stats.total_users.to_string());
    output::field("Products", &stats.total_products.to_string());
    output::field("Orders", &stats.total_orders.to_string());
    output::field("Reviews", &stats.total_reviews.to_string());

    if !stats.products_by_store.is_empty() {
        println!();
        println!("{}", "Products by store".bold());
        let max = stats.max_store_count();
        for store in &stats.products_by_store {
            output::bar(&store.store_name, store.product_count, max, 30);
        }
    }

    Ok(())
}
