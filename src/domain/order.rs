use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::order_item::{NewOrderItem, OrderItem};

/// Lifecycle states for an order. Stored as text; values written by older
/// revisions or free-form imports round-trip through [`OrderStatus::Other`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been registered but not started.
    Pending,
    /// Order is being prepared.
    Preparing,
    /// Order is packed and ready for dispatch.
    ReadyForDispatch,
    /// Order is on its way to the customer.
    InDispatch,
    /// Order has been delivered.
    Delivered,
    /// Order has been cancelled.
    Cancelled,
    /// Any status string not covered by the fixed set.
    Other(String),
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl OrderStatus {
    /// Text stored in the database for this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::ReadyForDispatch => "ready_for_dispatch",
            Self::InDispatch => "in_dispatch",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "preparing" => Self::Preparing,
            "ready_for_dispatch" => Self::ReadyForDispatch,
            "in_dispatch" => Self::InDispatch,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<&OrderStatus> for String {
    fn from(value: &OrderStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Domain representation of an order, with its line items loaded.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    /// Unique identifier of the order.
    pub id: i32,
    /// Unique order code, immutable once assigned.
    pub code: String,
    /// Owning customer identifier.
    pub customer_id: i32,
    /// Date the order was placed.
    pub order_date: NaiveDateTime,
    /// Optional sales channel (store, Instagram, fair, ...).
    pub sales_channel: Option<String>,
    /// Optional payment method.
    pub payment_method: Option<String>,
    /// Optional document type (receipt, invoice).
    pub document_type: Option<String>,
    /// Optional delivery method.
    pub delivery_method: Option<String>,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Amount already paid, in cents.
    pub paid_cents: i64,
    /// Remaining balance owed, in cents.
    pub balance_cents: i64,
    /// Line items belonging to the order.
    pub items: Vec<OrderItem>,
    /// Timestamp for when the order record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the order record.
    pub updated_at: NaiveDateTime,
}

/// Flattened row used by the order list and its in-memory search: the
/// order header joined with the owning customer's name and phone.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderSummary {
    /// Unique identifier of the order.
    pub id: i32,
    /// Unique order code.
    pub code: String,
    /// Owning customer identifier.
    pub customer_id: i32,
    /// Name of the owning customer.
    pub customer_name: String,
    /// Phone of the owning customer, digits only.
    pub customer_phone: Option<String>,
    /// Date the order was placed.
    pub order_date: NaiveDateTime,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Amount already paid, in cents.
    pub paid_cents: i64,
    /// Remaining balance owed, in cents.
    pub balance_cents: i64,
}

/// Payload required to insert a new order with its initial line items.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Unique order code assigned at creation time.
    pub code: String,
    /// Owning customer identifier.
    pub customer_id: i32,
    /// Date the order was placed.
    pub order_date: NaiveDateTime,
    /// Optional sales channel.
    pub sales_channel: Option<String>,
    /// Optional payment method.
    pub payment_method: Option<String>,
    /// Optional document type.
    pub document_type: Option<String>,
    /// Optional delivery method.
    pub delivery_method: Option<String>,
    /// Initial lifecycle status.
    pub status: OrderStatus,
    /// Amount already paid, in cents.
    pub paid_cents: i64,
    /// Remaining balance owed, in cents.
    pub balance_cents: i64,
    /// Line items created together with the order.
    pub items: Vec<NewOrderItem>,
    /// Timestamp captured when the order payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewOrder {
    /// Build a new order payload for a customer with the supplied code.
    pub fn new(code: impl Into<String>, customer_id: i32, order_date: NaiveDateTime) -> Self {
        let now = chrono::Local::now().naive_utc();
        Self {
            code: code.into(),
            customer_id,
            order_date,
            sales_channel: None,
            payment_method: None,
            document_type: None,
            delivery_method: None,
            status: OrderStatus::default(),
            paid_cents: 0,
            balance_cents: 0,
            items: Vec::new(),
            updated_at: now,
        }
    }

    /// Attach a sales channel to the payload.
    pub fn with_sales_channel(mut self, channel: impl Into<String>) -> Self {
        self.sales_channel = Some(channel.into());
        self
    }

    /// Attach a payment method to the payload.
    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    /// Attach a document type to the payload.
    pub fn with_document_type(mut self, document: impl Into<String>) -> Self {
        self.document_type = Some(document.into());
        self
    }

    /// Attach a delivery method to the payload.
    pub fn with_delivery_method(mut self, delivery: impl Into<String>) -> Self {
        self.delivery_method = Some(delivery.into());
        self
    }

    /// Override the default status for the new order.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Record an amount already paid, in cents.
    pub fn with_paid_cents(mut self, paid_cents: i64) -> Self {
        self.paid_cents = paid_cents;
        self
    }

    /// Override the stored balance, in cents.
    pub fn with_balance_cents(mut self, balance_cents: i64) -> Self {
        self.balance_cents = balance_cents;
        self
    }

    /// Attach the initial line items.
    pub fn with_items(mut self, items: Vec<NewOrderItem>) -> Self {
        self.items = items;
        self
    }
}

/// Patch data applied when updating an existing order. The order code is
/// deliberately absent: codes are immutable once assigned.
#[derive(Debug, Clone)]
pub struct UpdateOrder {
    /// Optional customer reassignment.
    pub customer_id: Option<i32>,
    /// Optional order date update.
    pub order_date: Option<NaiveDateTime>,
    /// Optional sales channel update.
    pub sales_channel: Option<Option<String>>,
    /// Optional payment method update.
    pub payment_method: Option<Option<String>>,
    /// Optional document type update.
    pub document_type: Option<Option<String>>,
    /// Optional delivery method update.
    pub delivery_method: Option<Option<String>>,
    /// Optional status update.
    pub status: Option<OrderStatus>,
    /// Optional paid amount update, in cents.
    pub paid_cents: Option<i64>,
    /// Optional balance override, in cents.
    pub balance_cents: Option<i64>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateOrder {
    /// Create a new patch object with no changes applied yet.
    pub fn new() -> Self {
        let now = chrono::Local::now().naive_utc();
        Self {
            customer_id: None,
            order_date: None,
            sales_channel: None,
            payment_method: None,
            document_type: None,
            delivery_method: None,
            status: None,
            paid_cents: None,
            balance_cents: None,
            updated_at: now,
        }
    }

    /// Reassign the order to another customer.
    pub fn customer_id(mut self, customer_id: i32) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Update the order date.
    pub fn order_date(mut self, order_date: NaiveDateTime) -> Self {
        self.order_date = Some(order_date);
        self
    }

    /// Update the sales channel, using `None` to clear an existing value.
    pub fn sales_channel(mut self, channel: Option<impl Into<String>>) -> Self {
        self.sales_channel = Some(channel.map(|value| value.into()));
        self
    }

    /// Update the payment method, using `None` to clear an existing value.
    pub fn payment_method(mut self, method: Option<impl Into<String>>) -> Self {
        self.payment_method = Some(method.map(|value| value.into()));
        self
    }

    /// Update the document type, using `None` to clear an existing value.
    pub fn document_type(mut self, document: Option<impl Into<String>>) -> Self {
        self.document_type = Some(document.map(|value| value.into()));
        self
    }

    /// Update the delivery method, using `None` to clear an existing value.
    pub fn delivery_method(mut self, delivery: Option<impl Into<String>>) -> Self {
        self.delivery_method = Some(delivery.map(|value| value.into()));
        self
    }

    /// Update the order status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Update the paid amount, in cents.
    pub fn paid_cents(mut self, paid_cents: i64) -> Self {
        self.paid_cents = Some(paid_cents);
        self
    }

    /// Override the stored balance, in cents.
    pub fn balance_cents(mut self, balance_cents: i64) -> Self {
        self.balance_cents = Some(balance_cents);
        self
    }
}

/// Search modes for the order list dialog.
#[derive(Debug, Clone)]
pub enum OrderSearch {
    /// Substring match against the order code.
    Code(String),
    /// Substring match against the customer name or phone.
    Customer(String),
    /// Exact status match.
    Status(OrderStatus),
    /// Inclusive date range; reversed bounds are swapped.
    DateRange { from: NaiveDate, to: NaiveDate },
}

/// Filter an order snapshot according to a search mode.
///
/// Matching is case-insensitive for the substring modes. Result order
/// follows the snapshot order (date descending as loaded).
pub fn filter_orders(orders: Vec<OrderSummary>, search: &OrderSearch) -> Vec<OrderSummary> {
    match search {
        OrderSearch::Code(term) => {
            let needle = term.trim().to_lowercase();
            if needle.is_empty() {
                return orders;
            }
            orders
                .into_iter()
                .filter(|order| order.code.to_lowercase().contains(&needle))
                .collect()
        }
        OrderSearch::Customer(term) => {
            let needle = term.trim().to_lowercase();
            if needle.is_empty() {
                return orders;
            }
            orders
                .into_iter()
                .filter(|order| {
                    order.customer_name.to_lowercase().contains(&needle)
                        || order
                            .customer_phone
                            .as_deref()
                            .is_some_and(|phone| phone.to_lowercase().contains(&needle))
                })
                .collect()
        }
        OrderSearch::Status(status) => orders
            .into_iter()
            .filter(|order| order.status == *status)
            .collect(),
        OrderSearch::DateRange { from, to } => {
            let (from, to) = if from <= to { (*from, *to) } else { (*to, *from) };
            orders
                .into_iter()
                .filter(|order| {
                    let date = order.order_date.date();
                    from <= date && date <= to
                })
                .collect()
        }
    }
}

/// Prefix shared by every order code generated for `date`: `P` followed
/// by the date as `YYYYMMDD`.
pub fn order_code_prefix(date: NaiveDate) -> String {
    format!("P{}", date.format("%Y%m%d"))
}

/// Render an order code from its date and daily sequence number.
pub fn format_order_code(date: NaiveDate, sequence: u32) -> String {
    format!("{}-{sequence:03}", order_code_prefix(date))
}

/// Sequence number to assign next, given the greatest existing code for
/// the day. Starts at 1 when there is no prior code or its suffix does
/// not parse.
///
/// Codes are compared as text upstream, so the greatest code is only the
/// latest one while suffixes stay three digits wide; past 999 orders in a
/// single day the ordering (and therefore this increment) degrades.
pub fn next_sequence(last_code: Option<&str>) -> u32 {
    last_code
        .and_then(|code| code.rsplit('-').next())
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map(|sequence| sequence + 1)
        .unwrap_or(1)
}

/// Remaining balance in cents: line totals minus the paid amount,
/// clamped at zero. Pure; integer arithmetic only.
pub fn compute_balance_cents(line_totals: impl IntoIterator<Item = i64>, paid_cents: i64) -> i64 {
    let total: i64 = line_totals.into_iter().sum();
    (total - paid_cents).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn summary(id: i32, code: &str, name: &str, status: OrderStatus, day: u32) -> OrderSummary {
        OrderSummary {
            id,
            code: code.to_string(),
            customer_id: 1,
            customer_name: name.to_string(),
            customer_phone: Some("987654321".to_string()),
            order_date: date(2025, 3, day).and_hms_opt(0, 0, 0).expect("valid time"),
            status,
            paid_cents: 0,
            balance_cents: 0,
        }
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::ReadyForDispatch,
            OrderStatus::InDispatch,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Other("on hold".to_string()),
        ] {
            assert_eq!(OrderStatus::from(status.as_str()), status);
        }
    }

    #[test]
    fn code_prefix_and_formatting() {
        let day = date(2025, 8, 7);
        assert_eq!(order_code_prefix(day), "P20250807");
        assert_eq!(format_order_code(day, 1), "P20250807-001");
        assert_eq!(format_order_code(day, 42), "P20250807-042");
    }

    #[test]
    fn next_sequence_increments_greatest_suffix() {
        assert_eq!(next_sequence(None), 1);
        assert_eq!(next_sequence(Some("P20250807-007")), 8);
        assert_eq!(next_sequence(Some("P20250807-999")), 1000);
    }

    #[test]
    fn next_sequence_falls_back_on_unparseable_suffix() {
        assert_eq!(next_sequence(Some("P20250807-abc")), 1);
        assert_eq!(next_sequence(Some("garbage")), 1);
    }

    #[test]
    fn sequence_width_overflows_past_three_digits() {
        // 1000th order of the day renders with a four-digit suffix; text
        // ordering of codes is no longer reliable from here on.
        let code = format_order_code(date(2025, 8, 7), next_sequence(Some("P20250807-999")));
        assert_eq!(code, "P20250807-1000");
    }

    #[test]
    fn balance_is_total_minus_paid() {
        assert_eq!(compute_balance_cents([150_000, 50_000], 80_000), 120_000);
    }

    #[test]
    fn balance_is_never_negative() {
        assert_eq!(compute_balance_cents([10_000], 25_000), 0);
        assert_eq!(compute_balance_cents([], 1), 0);
    }

    #[test]
    fn filter_by_code_is_case_insensitive() {
        let snapshot = vec![
            summary(1, "P20250301-001", "Ana", OrderStatus::Pending, 1),
            summary(2, "P20250302-001", "Bernardo", OrderStatus::Pending, 2),
        ];

        let found = filter_orders(snapshot, &OrderSearch::Code("p20250302".to_string()));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn filter_by_customer_matches_name_or_phone() {
        let snapshot = vec![
            summary(1, "P20250301-001", "Ana Pérez", OrderStatus::Pending, 1),
            summary(2, "P20250302-001", "Bernardo Soto", OrderStatus::Pending, 2),
        ];

        assert_eq!(
            filter_orders(snapshot.clone(), &OrderSearch::Customer("pérez".to_string())).len(),
            1
        );
        assert_eq!(
            filter_orders(snapshot, &OrderSearch::Customer("98765".to_string())).len(),
            2
        );
    }

    #[test]
    fn filter_by_status_is_exact() {
        let snapshot = vec![
            summary(1, "P20250301-001", "Ana", OrderStatus::Pending, 1),
            summary(2, "P20250302-001", "Bernardo", OrderStatus::Delivered, 2),
        ];

        let found = filter_orders(snapshot, &OrderSearch::Status(OrderStatus::Delivered));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn filter_by_date_range_swaps_reversed_bounds() {
        let snapshot = vec![
            summary(1, "P20250301-001", "Ana", OrderStatus::Pending, 1),
            summary(2, "P20250305-001", "Bernardo", OrderStatus::Pending, 5),
            summary(3, "P20250310-001", "Carla", OrderStatus::Pending, 10),
        ];

        let found = filter_orders(
            snapshot,
            &OrderSearch::DateRange {
                from: date(2025, 3, 9),
                to: date(2025, 3, 2),
            },
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }
}
