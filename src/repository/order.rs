use std::collections::HashMap;

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::{
    domain::order::{
        self, NewOrder as DomainNewOrder, Order as DomainOrder, OrderSummary,
        UpdateOrder as DomainUpdateOrder,
    },
    domain::order_item::OrderItemInput,
    models::order::{NewOrder as DbNewOrder, Order as DbOrder, UpdateOrder as DbUpdateOrder},
    models::order_item::{
        NewOrderItem as DbNewOrderItem, OrderItem as DbOrderItem,
        UpdateOrderItem as DbUpdateOrderItem,
    },
    repository::{DieselRepository, OrderReader, OrderWriter, RepositoryError, RepositoryResult},
};

impl OrderReader for DieselRepository {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<DomainOrder>> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;
        let order = orders::table
            .filter(orders::id.eq(id))
            .first::<DbOrder>(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = order_items::table
            .filter(order_items::order_id.eq(order.id))
            .order(order_items::id.asc())
            .load::<DbOrderItem>(&mut conn)?;

        Ok(Some(DomainOrder::from((order, items))))
    }

    fn find_order_by_code(&self, code: &str) -> RepositoryResult<Option<DomainOrder>> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;
        let order = orders::table
            .filter(orders::code.eq(code))
            .first::<DbOrder>(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = order_items::table
            .filter(order_items::order_id.eq(order.id))
            .order(order_items::id.asc())
            .load::<DbOrderItem>(&mut conn)?;

        Ok(Some(DomainOrder::from((order, items))))
    }

    fn list_orders(&self) -> RepositoryResult<Vec<OrderSummary>> {
        use crate::schema::{customers, orders};

        let mut conn = self.conn()?;
        let rows = orders::table
            .inner_join(customers::table)
            .order(orders::order_date.desc())
            .select((
                DbOrder::as_select(),
                customers::name,
                customers::phone,
            ))
            .load::<(DbOrder, String, Option<String>)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(order, name, phone)| order.into_summary(name, phone))
            .collect())
    }

    fn list_orders_for_customer(&self, customer_id: i32) -> RepositoryResult<Vec<OrderSummary>> {
        use crate::schema::{customers, orders};

        let mut conn = self.conn()?;
        let rows = orders::table
            .inner_join(customers::table)
            .filter(orders::customer_id.eq(customer_id))
            .order(orders::order_date.desc())
            .select((
                DbOrder::as_select(),
                customers::name,
                customers::phone,
            ))
            .load::<(DbOrder, String, Option<String>)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(order, name, phone)| order.into_summary(name, phone))
            .collect())
    }

    fn next_order_code(&self, date: NaiveDate) -> RepositoryResult<String> {
        use crate::schema::orders;

        let mut conn = self.conn()?;
        let prefix = order::order_code_prefix(date);
        let pattern = format!("{prefix}-%");

        // Text comparison; the greatest code carries the greatest suffix
        // only while suffixes stay three digits wide.
        let last = orders::table
            .filter(orders::code.like(pattern))
            .select(orders::code)
            .order(orders::code.desc())
            .first::<String>(&mut conn)
            .optional()?;

        let sequence = order::next_sequence(last.as_deref());
        Ok(order::format_order_code(date, sequence))
    }
}

impl OrderWriter for DieselRepository {
    fn create_order(&self, new_order: &DomainNewOrder) -> RepositoryResult<DomainOrder> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;

        conn.transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let db_new = DbNewOrder::from(new_order);

            let created = diesel::insert_into(orders::table)
                .values(&db_new)
                .get_result::<DbOrder>(conn)?;

            let order_id = created.id;

            if !new_order.items.is_empty() {
                let payload: Vec<DbNewOrderItem> = new_order
                    .items
                    .iter()
                    .map(|item| {
                        DbNewOrderItem::from_parts(
                            order_id,
                            item.product.as_str(),
                            item.quantity,
                            item.unit_price_cents,
                        )
                    })
                    .collect();

                diesel::insert_into(order_items::table)
                    .values(&payload)
                    .execute(conn)?;
            }

            let items = order_items::table
                .filter(order_items::order_id.eq(order_id))
                .order(order_items::id.asc())
                .load::<DbOrderItem>(conn)?;

            Ok(DomainOrder::from((created, items)))
        })
    }

    fn update_order(
        &self,
        order_id: i32,
        updates: &DomainUpdateOrder,
    ) -> RepositoryResult<DomainOrder> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;

        conn.transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let db_updates = DbUpdateOrder::from(updates);

            let updated = diesel::update(orders::table.filter(orders::id.eq(order_id)))
                .set(&db_updates)
                .get_result::<DbOrder>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            let items = order_items::table
                .filter(order_items::order_id.eq(order_id))
                .order(order_items::id.asc())
                .load::<DbOrderItem>(conn)?;

            Ok(DomainOrder::from((updated, items)))
        })
    }

    fn delete_order(&self, order_id: i32) -> RepositoryResult<()> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(orders::table.filter(orders::id.eq(order_id))).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn replace_order_items(
        &self,
        order_id: i32,
        items: &[OrderItemInput],
    ) -> RepositoryResult<DomainOrder> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;

        conn.transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let order = orders::table
                .filter(orders::id.eq(order_id))
                .first::<DbOrder>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            let existing = order_items::table
                .filter(order_items::order_id.eq(order_id))
                .load::<DbOrderItem>(conn)?;
            let mut remaining: HashMap<i32, DbOrderItem> =
                existing.into_iter().map(|item| (item.id, item)).collect();

            let now = chrono::Local::now().naive_utc();

            for input in items {
                match input.id.filter(|id| remaining.contains_key(id)) {
                    Some(item_id) => {
                        remaining.remove(&item_id);
                        let changes = DbUpdateOrderItem {
                            product: input.product.as_str(),
                            quantity: input.quantity,
                            unit_price_cents: input.unit_price_cents,
                            total_cents: input.total_cents(),
                            updated_at: now,
                        };
                        diesel::update(order_items::table.filter(order_items::id.eq(item_id)))
                            .set(&changes)
                            .execute(conn)?;
                    }
                    None => {
                        let payload = DbNewOrderItem::from_parts(
                            order_id,
                            input.product.as_str(),
                            input.quantity,
                            input.unit_price_cents,
                        );
                        diesel::insert_into(order_items::table)
                            .values(&payload)
                            .execute(conn)?;
                    }
                }
            }

            // Rows no longer present in the grid are removed.
            let stale_ids: Vec<i32> = remaining.into_keys().collect();
            if !stale_ids.is_empty() {
                diesel::delete(order_items::table.filter(order_items::id.eq_any(stale_ids)))
                    .execute(conn)?;
            }

            let saved = order_items::table
                .filter(order_items::order_id.eq(order_id))
                .order(order_items::id.asc())
                .load::<DbOrderItem>(conn)?;

            let balance = order::compute_balance_cents(
                saved.iter().map(|item| item.total_cents),
                order.paid_cents,
            );

            let updated = diesel::update(orders::table.filter(orders::id.eq(order_id)))
                .set((
                    orders::balance_cents.eq(balance),
                    orders::updated_at.eq(now),
                ))
                .get_result::<DbOrder>(conn)?;

            Ok(DomainOrder::from((updated, saved)))
        })
    }
}
