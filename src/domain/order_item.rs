use serde::{Deserialize, Serialize};

/// Domain representation of a line item belonging to an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    /// Unique identifier of the line item.
    pub id: i32,
    /// Owning order identifier.
    pub order_id: i32,
    /// Product description.
    pub product: String,
    /// Units ordered; always at least 1.
    pub quantity: i32,
    /// Price per unit, in cents.
    pub unit_price_cents: i64,
    /// Line total (quantity x unit price), in cents.
    pub total_cents: i64,
}

/// Payload required to insert a new line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    /// Product description.
    pub product: String,
    /// Units ordered.
    pub quantity: i32,
    /// Price per unit, in cents.
    pub unit_price_cents: i64,
}

impl NewOrderItem {
    /// Build a new line item payload.
    pub fn new(product: impl Into<String>, quantity: i32, unit_price_cents: i64) -> Self {
        Self {
            product: product.into(),
            quantity,
            unit_price_cents,
        }
    }

    /// Line total derived from quantity and unit price, in cents.
    pub fn total_cents(&self) -> i64 {
        i64::from(self.quantity) * self.unit_price_cents
    }
}

/// One row of the line-item grid as handed to the save operation. Rows
/// carrying an `id` update the matching stored item; rows without one
/// insert a new item; stored items absent from the submitted rows are
/// deleted.
#[derive(Debug, Clone)]
pub struct OrderItemInput {
    /// Identifier of the stored item this row edits, if any.
    pub id: Option<i32>,
    /// Product description.
    pub product: String,
    /// Units ordered.
    pub quantity: i32,
    /// Price per unit, in cents.
    pub unit_price_cents: i64,
}

impl OrderItemInput {
    /// Line total derived from quantity and unit price, in cents.
    pub fn total_cents(&self) -> i64 {
        i64::from(self.quantity) * self.unit_price_cents
    }
}
