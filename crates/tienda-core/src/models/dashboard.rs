use serde::{Deserialize, Serialize};

/// Aggregate counters shown on the dashboard.
///
/// Every field defaults when the server omits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_reviews: u64,
    pub products_by_store: Vec<StoreProductCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreProductCount {
    pub store_id: i64,
    pub store_name: String,
    pub product_count: u64,
}

impl DashboardStats {
    /// Largest per-store product count, at least 1 so it can scale bars.
    pub fn max_store_count(&self) -> u64 {
        self.products_by_store
            .iter()
            .map(|s| s.product_count)
            .max()
            .unwrap_or(0)
            .max(1)
    }
}
