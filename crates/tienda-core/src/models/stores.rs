use serde::{Deserialize, Serialize};

use super::{Resource, Validate, require_text};
use crate::Result;

/// A store selling products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for StoreInput {
    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)
    }
}

impl Resource for Store {
    type Input = StoreInput;
    const PATH: &'static str = "stores";
    const NAME: &'static str = "store";
}
