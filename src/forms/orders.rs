use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::order::{NewOrder, OrderStatus, UpdateOrder};
use crate::domain::order_item::OrderItemInput;
use crate::forms::{ParseNumberError, parse_money_cents, parse_quantity, sanitize_inline_text};

/// Result type returned by the order form helpers.
pub type OrderFormResult<T> = Result<T, OrderFormError>;

/// Errors that can occur while processing order forms.
#[derive(Debug, Error)]
pub enum OrderFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// No customer was selected for the order.
    #[error("an order requires a customer")]
    MissingCustomer,
    /// A money or quantity field did not parse.
    #[error(transparent)]
    Number(#[from] ParseNumberError),
}

/// Form payload emitted when creating an order. The order code is not
/// part of the form: it is generated and passed in by the caller.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AddOrderForm {
    /// Selected customer, if any.
    pub customer_id: Option<i32>,
    /// Date the order was placed.
    pub order_date: Option<NaiveDate>,
    /// Sales channel text.
    pub sales_channel: Option<String>,
    /// Payment method text.
    pub payment_method: Option<String>,
    /// Document type text.
    pub document_type: Option<String>,
    /// Delivery method text.
    pub delivery_method: Option<String>,
    /// Status as stored text; unknown values are kept verbatim.
    pub status: Option<String>,
    /// Paid amount as typed.
    pub paid: Option<String>,
    /// Balance override as typed; blank leaves the balance computed.
    pub balance: Option<String>,
}

impl AddOrderForm {
    /// Validates and parses the payload into a domain `NewOrder` carrying
    /// the supplied generated code.
    pub fn into_new_order(self, code: impl Into<String>) -> OrderFormResult<NewOrder> {
        self.validate()?;

        let customer_id = self.customer_id.ok_or(OrderFormError::MissingCustomer)?;
        let order_date = self
            .order_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default();

        let paid_cents = parse_money_cents(self.paid.as_deref().unwrap_or_default())?;
        let balance_cents = match self.balance.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => parse_money_cents(text)?,
            _ => 0,
        };

        let mut new_order = NewOrder::new(code, customer_id, order_date)
            .with_paid_cents(paid_cents)
            .with_balance_cents(balance_cents);

        if let Some(channel) = sanitize_optional_text(self.sales_channel.as_deref()) {
            new_order = new_order.with_sales_channel(channel);
        }
        if let Some(method) = sanitize_optional_text(self.payment_method.as_deref()) {
            new_order = new_order.with_payment_method(method);
        }
        if let Some(document) = sanitize_optional_text(self.document_type.as_deref()) {
            new_order = new_order.with_document_type(document);
        }
        if let Some(delivery) = sanitize_optional_text(self.delivery_method.as_deref()) {
            new_order = new_order.with_delivery_method(delivery);
        }
        if let Some(status) = sanitize_optional_text(self.status.as_deref()) {
            new_order = new_order.with_status(OrderStatus::from(status.as_str()));
        }

        Ok(new_order)
    }
}

/// Form payload emitted when editing an order. The code is immutable and
/// therefore absent. Absent fields are left untouched; empty strings
/// clear the stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditOrderForm {
    /// Optional customer reassignment.
    pub customer_id: Option<i32>,
    /// Optional order date update.
    pub order_date: Option<NaiveDate>,
    /// Optional sales channel update.
    pub sales_channel: Option<String>,
    /// Optional payment method update.
    pub payment_method: Option<String>,
    /// Optional document type update.
    pub document_type: Option<String>,
    /// Optional delivery method update.
    pub delivery_method: Option<String>,
    /// Optional status update.
    pub status: Option<String>,
    /// Optional paid amount update.
    pub paid: Option<String>,
    /// Optional balance override.
    pub balance: Option<String>,
}

impl EditOrderForm {
    /// Validates and parses the payload into a domain `UpdateOrder`.
    pub fn into_update_order(self) -> OrderFormResult<UpdateOrder> {
        self.validate()?;

        let mut updates = UpdateOrder::new();

        if let Some(customer_id) = self.customer_id {
            updates = updates.customer_id(customer_id);
        }

        if let Some(date) = self.order_date {
            updates = updates.order_date(date.and_hms_opt(0, 0, 0).unwrap_or_default());
        }

        if let Some(value) = self.sales_channel {
            updates = updates.sales_channel(sanitize_optional_text(Some(value.as_str())));
        }
        if let Some(value) = self.payment_method {
            updates = updates.payment_method(sanitize_optional_text(Some(value.as_str())));
        }
        if let Some(value) = self.document_type {
            updates = updates.document_type(sanitize_optional_text(Some(value.as_str())));
        }
        if let Some(value) = self.delivery_method {
            updates = updates.delivery_method(sanitize_optional_text(Some(value.as_str())));
        }

        if let Some(status) = self
            .status
            .as_deref()
            .map(sanitize_inline_text)
            .filter(|value| !value.is_empty())
        {
            updates = updates.status(OrderStatus::from(status.as_str()));
        }

        if let Some(paid) = self.paid.as_deref() {
            updates = updates.paid_cents(parse_money_cents(paid)?);
        }

        if let Some(balance) = self.balance.as_deref() {
            updates = updates.balance_cents(parse_money_cents(balance)?);
        }

        Ok(updates)
    }
}

/// One row of the line-item grid as typed by the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemRowForm {
    /// Identifier of the stored item this row edits, if any.
    pub id: Option<i32>,
    /// Product description cell.
    pub product: String,
    /// Quantity cell as typed.
    pub quantity: String,
    /// Unit price cell as typed.
    pub unit_price: String,
}

/// Convert grid rows into the save payload. Rows with a blank product
/// are ignored, matching the grid's behavior of skipping empty rows;
/// bad numbers are reported, never coerced.
pub fn items_from_grid(rows: Vec<ItemRowForm>) -> OrderFormResult<Vec<OrderItemInput>> {
    let mut inputs = Vec::with_capacity(rows.len());

    for row in rows {
        let product = sanitize_inline_text(&row.product);
        if product.is_empty() {
            continue;
        }

        let quantity = parse_quantity(&row.quantity)?;
        let unit_price_cents = parse_money_cents(&row.unit_price)?;

        inputs.push(OrderItemInput {
            id: row.id,
            product,
            quantity,
            unit_price_cents,
        });
    }

    Ok(inputs)
}

fn sanitize_optional_text(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_inline_text)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn add_order_form_requires_a_customer() {
        let form = AddOrderForm {
            customer_id: None,
            ..AddOrderForm::default()
        };

        assert!(matches!(
            form.into_new_order("P20250807-001"),
            Err(OrderFormError::MissingCustomer)
        ));
    }

    #[test]
    fn add_order_form_parses_amounts_and_status() {
        let form = AddOrderForm {
            customer_id: Some(7),
            order_date: Some(date(2025, 8, 7)),
            sales_channel: Some(" Instagram ".to_string()),
            payment_method: Some("Transferencia".to_string()),
            document_type: None,
            delivery_method: Some("Retiro en tienda".to_string()),
            status: Some("pending".to_string()),
            paid: Some("$ 45.000".to_string()),
            balance: None,
        };

        let new_order = form
            .into_new_order("P20250807-003")
            .expect("expected success");

        assert_eq!(new_order.code, "P20250807-003");
        assert_eq!(new_order.customer_id, 7);
        assert_eq!(new_order.sales_channel.as_deref(), Some("Instagram"));
        assert_eq!(new_order.status, OrderStatus::Pending);
        assert_eq!(new_order.paid_cents, 4_500_000);
        assert_eq!(new_order.balance_cents, 0);
    }

    #[test]
    fn add_order_form_rejects_bad_amounts() {
        let form = AddOrderForm {
            customer_id: Some(7),
            paid: Some("mucho".to_string()),
            ..AddOrderForm::default()
        };

        assert!(matches!(
            form.into_new_order("P20250807-001"),
            Err(OrderFormError::Number(ParseNumberError::Amount(value))) if value == "mucho"
        ));
    }

    #[test]
    fn edit_order_form_keeps_unknown_status_verbatim() {
        let form = EditOrderForm {
            status: Some("en espera de stock".to_string()),
            ..EditOrderForm::default()
        };

        let updates = form.into_update_order().expect("expected success");

        assert_eq!(
            updates.status,
            Some(OrderStatus::Other("en espera de stock".to_string()))
        );
    }

    #[test]
    fn grid_rows_skip_blank_products() {
        let rows = vec![
            ItemRowForm {
                id: Some(3),
                product: " Mesa raíz ".to_string(),
                quantity: "2".to_string(),
                unit_price: "45.000".to_string(),
            },
            ItemRowForm {
                id: None,
                product: "   ".to_string(),
                quantity: "1".to_string(),
                unit_price: "0".to_string(),
            },
            ItemRowForm {
                id: None,
                product: "Lámpara".to_string(),
                quantity: "".to_string(),
                unit_price: "".to_string(),
            },
        ];

        let inputs = items_from_grid(rows).expect("expected success");

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].product, "Mesa raíz");
        assert_eq!(inputs[0].quantity, 2);
        assert_eq!(inputs[0].unit_price_cents, 4_500_000);
        assert_eq!(inputs[1].product, "Lámpara");
        assert_eq!(inputs[1].quantity, 1);
        assert_eq!(inputs[1].unit_price_cents, 0);
    }

    #[test]
    fn grid_rows_reject_bad_quantity() {
        let rows = vec![ItemRowForm {
            id: None,
            product: "Mesa".to_string(),
            quantity: "0".to_string(),
            unit_price: "100".to_string(),
        }];

        assert!(matches!(
            items_from_grid(rows),
            Err(OrderFormError::Number(ParseNumberError::Quantity(value))) if value == "0"
        ));
    }
}
