//! Marketplace entity models.
//!
//! Each entity has a read model (what the API returns) and an input model
//! (what create and update send). Input models validate themselves before
//! any request is issued.

mod dashboard;
mod orders;
mod products;
mod reviews;
mod stores;
mod users;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use dashboard::{DashboardStats, StoreProductCount};
pub use orders::{Order, OrderInput, OrderItem, OrderItemInput};
pub use products::{Product, ProductInput};
pub use reviews::{Review, ReviewInput};
pub use stores::{Store, StoreInput};
pub use users::{User, UserInput};

use crate::Result;
use crate::error::InvalidInputError;

/// Client-side validation of an input model.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// An entity exposed as a REST collection.
pub trait Resource: DeserializeOwned + Serialize + Send + 'static {
    /// Payload for create and update.
    type Input: Serialize + Validate + Send + Sync;

    /// Collection path relative to the API base.
    const PATH: &'static str;

    /// Human-readable singular name.
    const NAME: &'static str;
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(InvalidInputError::Field {
            field,
            reason: "is required".to_string(),
        }
        .into());
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(InvalidInputError::Field {
            field,
            reason: format!("must be a non-negative number, got {}", value),
        }
        .into());
    }
    Ok(())
}

pub(crate) fn require_id(field: &'static str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(InvalidInputError::Field {
            field,
            reason: format!("must be a positive id, got {}", value),
        }
        .into());
    }
    Ok(())
}
