use serde::{Deserialize, Serialize};

use super::{Resource, Validate, require_id, require_non_negative, require_text};
use crate::Result;

/// A product listed in a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub store_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub store_id: i64,
}

impl Validate for ProductInput {
    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_non_negative("price", self.price)?;
        require_non_negative("stock", self.stock as f64)?;
        require_id("storeId", self.store_id)
    }
}

impl Resource for Product {
    type Input = ProductInput;
    const PATH: &'static str = "products";
    const NAME: &'static str = "product";
}
