use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::order::{
    NewOrder as DomainNewOrder, Order as DomainOrder, OrderSummary,
    UpdateOrder as DomainUpdateOrder,
};
use crate::models::order_item::OrderItem;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub code: String,
    pub customer_id: i32,
    pub order_date: NaiveDateTime,
    pub sales_channel: Option<String>,
    pub payment_method: Option<String>,
    pub document_type: Option<String>,
    pub delivery_method: Option<String>,
    pub status: String,
    pub paid_cents: i64,
    pub balance_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub code: &'a str,
    pub customer_id: i32,
    pub order_date: NaiveDateTime,
    pub sales_channel: Option<&'a str>,
    pub payment_method: Option<&'a str>,
    pub document_type: Option<&'a str>,
    pub delivery_method: Option<&'a str>,
    pub status: &'a str,
    pub paid_cents: i64,
    pub balance_cents: i64,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::orders)]
pub struct UpdateOrder<'a> {
    pub customer_id: Option<i32>,
    pub order_date: Option<NaiveDateTime>,
    pub sales_channel: Option<Option<&'a str>>,
    pub payment_method: Option<Option<&'a str>>,
    pub document_type: Option<Option<&'a str>>,
    pub delivery_method: Option<Option<&'a str>>,
    pub status: Option<String>,
    pub paid_cents: Option<i64>,
    pub balance_cents: Option<i64>,
    pub updated_at: NaiveDateTime,
}

impl Order {
    pub fn into_domain(self, items: Vec<OrderItem>) -> DomainOrder {
        DomainOrder {
            id: self.id,
            code: self.code,
            customer_id: self.customer_id,
            order_date: self.order_date,
            sales_channel: self.sales_channel,
            payment_method: self.payment_method,
            document_type: self.document_type,
            delivery_method: self.delivery_method,
            status: self.status.as_str().into(),
            paid_cents: self.paid_cents,
            balance_cents: self.balance_cents,
            items: items.into_iter().map(OrderItem::into_domain).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn into_summary(self, customer_name: String, customer_phone: Option<String>) -> OrderSummary {
        OrderSummary {
            id: self.id,
            code: self.code,
            customer_id: self.customer_id,
            customer_name,
            customer_phone,
            order_date: self.order_date,
            status: self.status.as_str().into(),
            paid_cents: self.paid_cents,
            balance_cents: self.balance_cents,
        }
    }
}

impl From<(Order, Vec<OrderItem>)> for DomainOrder {
    fn from(value: (Order, Vec<OrderItem>)) -> Self {
        value.0.into_domain(value.1)
    }
}

impl<'a> From<&'a DomainNewOrder> for NewOrder<'a> {
    fn from(value: &'a DomainNewOrder) -> Self {
        Self {
            code: value.code.as_str(),
            customer_id: value.customer_id,
            order_date: value.order_date,
            sales_channel: value.sales_channel.as_deref(),
            payment_method: value.payment_method.as_deref(),
            document_type: value.document_type.as_deref(),
            delivery_method: value.delivery_method.as_deref(),
            status: value.status.as_str(),
            paid_cents: value.paid_cents,
            balance_cents: value.balance_cents,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateOrder> for UpdateOrder<'a> {
    fn from(value: &'a DomainUpdateOrder) -> Self {
        Self {
            customer_id: value.customer_id,
            order_date: value.order_date,
            sales_channel: value
                .sales_channel
                .as_ref()
                .map(|channel| channel.as_deref()),
            payment_method: value
                .payment_method
                .as_ref()
                .map(|method| method.as_deref()),
            document_type: value
                .document_type
                .as_ref()
                .map(|document| document.as_deref()),
            delivery_method: value
                .delivery_method
                .as_ref()
                .map(|delivery| delivery.as_deref()),
            status: value.status.as_ref().map(String::from),
            paid_cents: value.paid_cents,
            balance_cents: value.balance_cents,
            updated_at: value.updated_at,
        }
    }
}
