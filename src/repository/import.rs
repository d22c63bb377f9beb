use diesel::prelude::*;

use crate::{
    domain::import::{ImportRow, ImportSummary},
    models::customer::{Customer as DbCustomer, NewCustomer as DbNewCustomer},
    models::order::{NewOrder as DbNewOrder, Order as DbOrder},
    models::order_item::{NewOrderItem as DbNewOrderItem, OrderItem as DbOrderItem},
    repository::{DieselRepository, ImportWriter, RepositoryError, RepositoryResult},
};

impl ImportWriter for DieselRepository {
    fn import_rows(&self, rows: &[ImportRow]) -> RepositoryResult<ImportSummary> {
        let mut conn = self.conn()?;

        conn.transaction::<ImportSummary, RepositoryError, _>(|conn| {
            let mut summary = ImportSummary::default();

            for row in rows {
                let customer_id = upsert_customer(conn, row, &mut summary)?;
                let order_id = upsert_order(conn, row, customer_id, &mut summary)?;

                if let Some(product) = row.product.as_deref() {
                    if insert_item_if_missing(
                        conn,
                        order_id,
                        product,
                        row.quantity,
                        row.unit_price_cents,
                    )? {
                        summary.items_created += 1;
                    }
                }
            }

            Ok(summary)
        })
    }
}

/// Match by exact name; create when absent, otherwise fill blank contact
/// fields from the row.
fn upsert_customer(
    conn: &mut SqliteConnection,
    row: &ImportRow,
    summary: &mut ImportSummary,
) -> RepositoryResult<i32> {
    use crate::schema::customers;

    let existing = customers::table
        .filter(customers::name.eq(row.customer_name.as_str()))
        .first::<DbCustomer>(conn)
        .optional()?;

    let Some(customer) = existing else {
        let payload = DbNewCustomer {
            name: row.customer_name.as_str(),
            rut: None,
            phone: row.phone.as_deref(),
            email: row.email.as_deref(),
            address: row.address.as_deref(),
            comuna: row.comuna.as_deref(),
        };
        let created = diesel::insert_into(customers::table)
            .values(&payload)
            .get_result::<DbCustomer>(conn)?;
        summary.customers_created += 1;
        return Ok(created.id);
    };

    let phone = customer.phone.clone().or_else(|| row.phone.clone());
    let email = customer.email.clone().or_else(|| row.email.clone());
    let address = customer.address.clone().or_else(|| row.address.clone());
    let comuna = customer.comuna.clone().or_else(|| row.comuna.clone());

    let changed = phone != customer.phone
        || email != customer.email
        || address != customer.address
        || comuna != customer.comuna;

    if changed {
        diesel::update(customers::table.filter(customers::id.eq(customer.id)))
            .set((
                customers::phone.eq(phone),
                customers::email.eq(email),
                customers::address.eq(address),
                customers::comuna.eq(comuna),
                customers::updated_at.eq(chrono::Local::now().naive_utc()),
            ))
            .execute(conn)?;
    }

    Ok(customer.id)
}

/// Match by exact code; create when absent, otherwise backfill header
/// fields that are still blank.
fn upsert_order(
    conn: &mut SqliteConnection,
    row: &ImportRow,
    customer_id: i32,
    summary: &mut ImportSummary,
) -> RepositoryResult<i32> {
    use crate::schema::orders;

    let existing = orders::table
        .filter(orders::code.eq(row.code.as_str()))
        .first::<DbOrder>(conn)
        .optional()?;

    let Some(order) = existing else {
        let status = row.status.clone().unwrap_or_else(|| "pending".to_string());
        let payload = DbNewOrder {
            code: row.code.as_str(),
            customer_id,
            order_date: row.order_date,
            sales_channel: row.sales_channel.as_deref(),
            payment_method: row.payment_method.as_deref(),
            document_type: row.document_type.as_deref(),
            delivery_method: row.delivery_method.as_deref(),
            status: status.as_str(),
            paid_cents: row.paid_cents.unwrap_or(0),
            balance_cents: row.balance_cents.unwrap_or(0),
            updated_at: chrono::Local::now().naive_utc(),
        };
        let created = diesel::insert_into(orders::table)
            .values(&payload)
            .get_result::<DbOrder>(conn)?;
        summary.orders_created += 1;
        return Ok(created.id);
    };

    let sales_channel = order
        .sales_channel
        .clone()
        .or_else(|| row.sales_channel.clone());
    let payment_method = order
        .payment_method
        .clone()
        .or_else(|| row.payment_method.clone());
    let document_type = order
        .document_type
        .clone()
        .or_else(|| row.document_type.clone());

    let changed = sales_channel != order.sales_channel
        || payment_method != order.payment_method
        || document_type != order.document_type;

    if changed {
        diesel::update(orders::table.filter(orders::id.eq(order.id)))
            .set((
                orders::sales_channel.eq(sales_channel),
                orders::payment_method.eq(payment_method),
                orders::document_type.eq(document_type),
                orders::updated_at.eq(chrono::Local::now().naive_utc()),
            ))
            .execute(conn)?;
    }

    Ok(order.id)
}

/// Insert a line item unless an identical (product, quantity, unit
/// price) tuple already exists on the order; this is what makes
/// re-importing an unchanged sheet a no-op.
pub(crate) fn insert_item_if_missing(
    conn: &mut SqliteConnection,
    order_id: i32,
    product: &str,
    quantity: i32,
    unit_price_cents: i64,
) -> RepositoryResult<bool> {
    use crate::schema::order_items;

    let duplicate = order_items::table
        .filter(order_items::order_id.eq(order_id))
        .filter(order_items::product.eq(product))
        .filter(order_items::quantity.eq(quantity))
        .filter(order_items::unit_price_cents.eq(unit_price_cents))
        .first::<DbOrderItem>(conn)
        .optional()?;

    if duplicate.is_some() {
        return Ok(false);
    }

    let payload = DbNewOrderItem::from_parts(order_id, product, quantity, unit_price_cents);
    diesel::insert_into(order_items::table)
        .values(&payload)
        .execute(conn)?;

    Ok(true)
}
