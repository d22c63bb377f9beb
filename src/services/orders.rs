use crate::domain::order::{Order, OrderSearch, OrderSummary, filter_orders};
use crate::forms::orders::{AddOrderForm, EditOrderForm, ItemRowForm, items_from_grid};
use crate::repository::{CustomerReader, OrderReader, OrderWriter};
use crate::services::{ServiceError, ServiceResult};

/// Creates an order for an existing customer. The order code is
/// generated here, from the ledger's state for the order date; a
/// generation failure aborts the operation and reaches the caller.
pub fn create_order<R>(repo: &R, form: AddOrderForm) -> ServiceResult<Order>
where
    R: CustomerReader + OrderReader + OrderWriter + ?Sized,
{
    let customer_id = form
        .customer_id
        .ok_or_else(|| ServiceError::Form("an order requires a customer".to_string()))?;

    if repo.get_customer_by_id(customer_id)?.is_none() {
        return Err(ServiceError::Form(format!(
            "customer {customer_id} does not exist"
        )));
    }

    let order_date = form
        .order_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let code = repo.next_order_code(order_date)?;

    let new_order = form
        .into_new_order(code)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let created = repo.create_order(&new_order)?;
    log::info!("order {} created for customer {customer_id}", created.code);

    Ok(created)
}

/// Applies an edit form to an existing order. The code cannot change.
pub fn update_order<R>(repo: &R, order_id: i32, form: EditOrderForm) -> ServiceResult<Order>
where
    R: CustomerReader + OrderWriter + ?Sized,
{
    if let Some(customer_id) = form.customer_id {
        if repo.get_customer_by_id(customer_id)?.is_none() {
            return Err(ServiceError::Form(format!(
                "customer {customer_id} does not exist"
            )));
        }
    }

    let updates = form
        .into_update_order()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    Ok(repo.update_order(order_id, &updates)?)
}

/// Deletes an order; its items go with it.
pub fn delete_order<R>(repo: &R, order_id: i32) -> ServiceResult<()>
where
    R: OrderWriter + ?Sized,
{
    repo.delete_order(order_id)?;
    log::info!("order {order_id} deleted");

    Ok(())
}

/// Loads an order with its items.
pub fn get_order<R>(repo: &R, order_id: i32) -> ServiceResult<Order>
where
    R: OrderReader + ?Sized,
{
    repo.get_order_by_id(order_id)?.ok_or(ServiceError::NotFound)
}

/// Saves the line-item grid for an order: rows with an id update the
/// stored item, rows without one are inserted, stored items missing from
/// the grid are deleted. The balance is recomputed in the same
/// transaction.
pub fn save_order_items<R>(
    repo: &R,
    order_id: i32,
    rows: Vec<ItemRowForm>,
) -> ServiceResult<Order>
where
    R: OrderWriter + ?Sized,
{
    let inputs = items_from_grid(rows).map_err(|err| ServiceError::Form(err.to_string()))?;

    let order = repo.replace_order_items(order_id, &inputs)?;
    log::info!(
        "order {} now has {} items, balance {} cents",
        order.code,
        order.items.len(),
        order.balance_cents
    );

    Ok(order)
}

/// Full ledger snapshot, date descending.
pub fn list_orders<R>(repo: &R) -> ServiceResult<Vec<OrderSummary>>
where
    R: OrderReader + ?Sized,
{
    Ok(repo.list_orders()?)
}

/// Search over a fresh ledger snapshot. Result order follows the
/// snapshot (date descending).
pub fn search_orders<R>(repo: &R, search: &OrderSearch) -> ServiceResult<Vec<OrderSummary>>
where
    R: OrderReader + ?Sized,
{
    let snapshot = repo.list_orders()?;
    Ok(filter_orders(snapshot, search))
}
