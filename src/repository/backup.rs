use std::collections::HashMap;
use std::path::Path;

use diesel::prelude::*;

use crate::{
    domain::import::MergeSummary,
    domain::rut,
    models::customer::{Customer as DbCustomer, NewCustomer as DbNewCustomer},
    models::order::{NewOrder as DbNewOrder, Order as DbOrder},
    models::order_item::OrderItem as DbOrderItem,
    repository::{DieselRepository, MergeWriter, RepositoryError, RepositoryResult},
};

impl MergeWriter for DieselRepository {
    fn merge_store(&self, source: &Path) -> RepositoryResult<MergeSummary> {
        let (ext_customers, ext_orders, ext_items) = read_external_store(source)?;

        let mut conn = self.conn()?;

        conn.transaction::<MergeSummary, RepositoryError, _>(|conn| {
            let mut summary = MergeSummary::default();

            // External customer id -> live customer id.
            let mut customer_map: HashMap<i32, i32> = HashMap::new();
            for customer in &ext_customers {
                let live_id = match find_live_customer(conn, customer)? {
                    Some(id) => id,
                    None => {
                        let created = insert_customer(conn, customer)?;
                        summary.customers_added += 1;
                        created
                    }
                };
                customer_map.insert(customer.id, live_id);
            }

            // External order id -> live order id.
            let mut order_map: HashMap<i32, i32> = HashMap::new();
            for order in &ext_orders {
                use crate::schema::orders;

                let existing = orders::table
                    .filter(orders::code.eq(order.code.as_str()))
                    .select(orders::id)
                    .first::<i32>(conn)
                    .optional()?;

                let live_id = match existing {
                    Some(id) => id,
                    None => {
                        let Some(&customer_id) = customer_map.get(&order.customer_id) else {
                            log::warn!(
                                "skipping order {} from {}: its customer is not in the source file",
                                order.code,
                                source.display()
                            );
                            continue;
                        };
                        let created = insert_order(conn, order, customer_id)?;
                        summary.orders_added += 1;
                        created
                    }
                };
                order_map.insert(order.id, live_id);
            }

            for item in &ext_items {
                let Some(&order_id) = order_map.get(&item.order_id) else {
                    continue;
                };
                if super::import::insert_item_if_missing(
                    conn,
                    order_id,
                    item.product.as_str(),
                    item.quantity,
                    item.unit_price_cents,
                )? {
                    summary.items_added += 1;
                }
            }

            Ok(summary)
        })
    }
}

/// Load everything from the external store over a direct, short-lived
/// connection. The external file is never written.
fn read_external_store(
    source: &Path,
) -> RepositoryResult<(Vec<DbCustomer>, Vec<DbOrder>, Vec<DbOrderItem>)> {
    use crate::schema::{customers, order_items, orders};

    let mut conn = SqliteConnection::establish(&source.to_string_lossy())?;

    let ext_customers = customers::table.load::<DbCustomer>(&mut conn)?;
    let ext_orders = orders::table.load::<DbOrder>(&mut conn)?;
    let ext_items = order_items::table.load::<DbOrderItem>(&mut conn)?;

    Ok((ext_customers, ext_orders, ext_items))
}

/// De-duplicate against the live directory: normalized RUT first, exact
/// name second.
fn find_live_customer(
    conn: &mut SqliteConnection,
    customer: &DbCustomer,
) -> RepositoryResult<Option<i32>> {
    use crate::schema::customers;

    if let Some(ext_rut) = customer.rut.as_deref() {
        let normalized = rut::normalize(ext_rut);
        if !normalized.is_empty() {
            let by_rut = customers::table
                .filter(customers::rut.eq(normalized.as_str()))
                .select(customers::id)
                .first::<i32>(conn)
                .optional()?;
            if by_rut.is_some() {
                return Ok(by_rut);
            }
        }
    }

    let by_name = customers::table
        .filter(customers::name.eq(customer.name.as_str()))
        .select(customers::id)
        .first::<i32>(conn)
        .optional()?;

    Ok(by_name)
}

fn insert_customer(conn: &mut SqliteConnection, customer: &DbCustomer) -> RepositoryResult<i32> {
    use crate::schema::customers;

    let normalized_rut = customer.rut.as_deref().map(rut::normalize);
    let payload = DbNewCustomer {
        name: customer.name.as_str(),
        rut: normalized_rut.as_deref().filter(|value| !value.is_empty()),
        phone: customer.phone.as_deref(),
        email: customer.email.as_deref(),
        address: customer.address.as_deref(),
        comuna: customer.comuna.as_deref(),
    };

    let created = diesel::insert_into(customers::table)
        .values(&payload)
        .get_result::<DbCustomer>(conn)?;

    Ok(created.id)
}

fn insert_order(
    conn: &mut SqliteConnection,
    order: &DbOrder,
    customer_id: i32,
) -> RepositoryResult<i32> {
    use crate::schema::orders;

    let payload = DbNewOrder {
        code: order.code.as_str(),
        customer_id,
        order_date: order.order_date,
        sales_channel: order.sales_channel.as_deref(),
        payment_method: order.payment_method.as_deref(),
        document_type: order.document_type.as_deref(),
        delivery_method: order.delivery_method.as_deref(),
        status: order.status.as_str(),
        paid_cents: order.paid_cents,
        balance_cents: order.balance_cents,
        updated_at: chrono::Local::now().naive_utc(),
    };

    let created = diesel::insert_into(orders::table)
        .values(&payload)
        .get_result::<DbOrder>(conn)?;

    Ok(created.id)
}
