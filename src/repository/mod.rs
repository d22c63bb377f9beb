use std::path::Path;

use chrono::NaiveDate;

use crate::db::{DbConnection, DbPool};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::import::{ImportRow, ImportSummary, MergeSummary};
use crate::domain::order::{NewOrder, Order, OrderSummary, UpdateOrder};
use crate::domain::order_item::OrderItemInput;

pub mod backup;
pub mod customer;
pub mod errors;
pub mod import;
pub mod order;

#[cfg(test)]
pub mod mock;

pub use errors::{RepositoryError, RepositoryResult};

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over the customer directory.
pub trait CustomerReader {
    fn get_customer_by_id(&self, id: i32) -> RepositoryResult<Option<Customer>>;
    fn find_customer_by_name(&self, name: &str) -> RepositoryResult<Option<Customer>>;
    fn find_customer_by_rut(&self, rut: &str) -> RepositoryResult<Option<Customer>>;
    /// Full directory snapshot, name ascending.
    fn list_customers(&self) -> RepositoryResult<Vec<Customer>>;
}

/// Write operations over the customer directory.
pub trait CustomerWriter {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
    fn update_customer(
        &self,
        customer_id: i32,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer>;
    /// Deletes the customer together with its orders and their items.
    fn delete_customer(&self, customer_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over the order ledger.
pub trait OrderReader {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
    fn find_order_by_code(&self, code: &str) -> RepositoryResult<Option<Order>>;
    /// Full ledger snapshot joined with customer name/phone, date descending.
    fn list_orders(&self) -> RepositoryResult<Vec<OrderSummary>>;
    /// Purchase history of one customer, date descending.
    fn list_orders_for_customer(&self, customer_id: i32) -> RepositoryResult<Vec<OrderSummary>>;
    /// Next free order code for `date`: day prefix plus max existing
    /// suffix incremented by one.
    fn next_order_code(&self, date: NaiveDate) -> RepositoryResult<String>;
}

/// Write operations over the order ledger.
pub trait OrderWriter {
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
    fn update_order(&self, order_id: i32, updates: &UpdateOrder) -> RepositoryResult<Order>;
    /// Deletes the order together with its items.
    fn delete_order(&self, order_id: i32) -> RepositoryResult<()>;
    /// Diff the submitted grid rows against the stored items (update by
    /// id, insert rows without one, delete the rest), then recompute the
    /// balance. One transaction.
    fn replace_order_items(
        &self,
        order_id: i32,
        items: &[OrderItemInput],
    ) -> RepositoryResult<Order>;
}

/// Batch application of cleaned spreadsheet rows.
pub trait ImportWriter {
    /// Apply every row in one transaction; any failure rolls the whole
    /// batch back.
    fn import_rows(&self, rows: &[ImportRow]) -> RepositoryResult<ImportSummary>;
}

/// Merge of an external store file into the live store.
pub trait MergeWriter {
    /// De-duplicates customers by RUT then name, orders by code and
    /// items by (product, quantity, unit price) tuple. One transaction.
    fn merge_store(&self, source: &Path) -> RepositoryResult<MergeSummary>;
}
