use serde::{Deserialize, Serialize};

use super::{Resource, Validate, require_id};
use crate::Result;
use crate::error::InvalidInputError;

/// A product review left by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
    pub product_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub product_id: i64,
    pub user_id: i64,
}

impl Validate for ReviewInput {
    fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(InvalidInputError::Field {
                field: "rating",
                reason: format!("must be between 1 and 5, got {}", self.rating),
            }
            .into());
        }
        require_id("productId", self.product_id)?;
        require_id("userId", self.user_id)
    }
}

impl Resource for Review {
    type Input = ReviewInput;
    const PATH: &'static str = "reviews";
    const NAME: &'static str = "review";
}
