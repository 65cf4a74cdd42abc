use serde::{Deserialize, Serialize};

use super::{Resource, Validate, require_id, require_non_negative, require_text};
use crate::Result;
use crate::error::InvalidInputError;

/// An order placed by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub status: String,
    pub total: f64,
    pub user_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub status: String,
    pub total: f64,
    pub user_id: i64,
}

impl Validate for OrderInput {
    fn validate(&self) -> Result<()> {
        require_text("status", &self.status)?;
        require_non_negative("total", self.total)?;
        require_id("userId", self.user_id)
    }
}

impl Resource for Order {
    type Input = OrderInput;
    const PATH: &'static str = "orders";
    const NAME: &'static str = "order";
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub quantity: i64,
    pub price: f64,
    pub subtotal: f64,
    pub order_id: i64,
    pub product_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub quantity: i64,
    pub price: f64,
    pub subtotal: f64,
    pub order_id: i64,
    pub product_id: i64,
}

impl OrderItemInput {
    /// Build an input whose subtotal is `quantity * price`.
    pub fn priced(quantity: i64, price: f64, order_id: i64, product_id: i64) -> Self {
        Self {
            quantity,
            price,
            subtotal: quantity as f64 * price,
            order_id,
            product_id,
        }
    }
}

impl Validate for OrderItemInput {
    fn validate(&self) -> Result<()> {
        if self.quantity <= 0 {
            return Err(InvalidInputError::Field {
                field: "quantity",
                reason: format!("must be at least 1, got {}", self.quantity),
            }
            .into());
        }
        require_non_negative("price", self.price)?;
        require_non_negative("subtotal", self.subtotal)?;
        require_id("orderId", self.order_id)?;
        require_id("productId", self.product_id)
    }
}

impl Resource for OrderItem {
    type Input = OrderItemInput;
    const PATH: &'static str = "orderItems";
    const NAME: &'static str = "order item";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priced_computes_subtotal() {
        let item = OrderItemInput::priced(3, 2.5, 10, 20);
        assert_eq!(item.subtotal, 7.5);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let item = OrderItemInput::priced(0, 2.5, 10, 20);
        assert!(item.validate().is_err());
    }

    #[test]
    fn blank_status_is_rejected() {
        let order = OrderInput {
            status: "  ".to_string(),
            total: 10.0,
            user_id: 1,
        };
        assert!(order.validate().is_err());
    }
}
