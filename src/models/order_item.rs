use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::order_item::OrderItem as DomainOrderItem;
use crate::models::order::Order;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem<'a> {
    pub order_id: i32,
    pub product: &'a str,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_cents: i64,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::order_items)]
pub struct UpdateOrderItem<'a> {
    pub product: &'a str,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub updated_at: NaiveDateTime,
}

impl OrderItem {
    pub fn into_domain(self) -> DomainOrderItem {
        DomainOrderItem {
            id: self.id,
            order_id: self.order_id,
            product: self.product,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            total_cents: self.total_cents,
        }
    }
}

impl<'a> NewOrderItem<'a> {
    pub fn from_parts(
        order_id: i32,
        product: &'a str,
        quantity: i32,
        unit_price_cents: i64,
    ) -> Self {
        Self {
            order_id,
            product,
            quantity,
            unit_price_cents,
            total_cents: i64::from(quantity) * unit_price_cents,
        }
    }
}
