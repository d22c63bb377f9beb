use std::path::Path;

use chrono::NaiveDate;
use mockall::mock;

use super::{
    CustomerReader, CustomerWriter, ImportWriter, MergeWriter, OrderReader, OrderWriter,
    RepositoryResult,
};
use crate::domain::{
    customer::{Customer, NewCustomer, UpdateCustomer},
    import::{ImportRow, ImportSummary, MergeSummary},
    order::{NewOrder, Order, OrderSummary, UpdateOrder},
    order_item::OrderItemInput,
};

mock! {
    pub CustomerReader {}

    impl CustomerReader for CustomerReader {
        fn get_customer_by_id(&self, id: i32) -> RepositoryResult<Option<Customer>>;
        fn find_customer_by_name(&self, name: &str) -> RepositoryResult<Option<Customer>>;
        fn find_customer_by_rut(&self, rut: &str) -> RepositoryResult<Option<Customer>>;
        fn list_customers(&self) -> RepositoryResult<Vec<Customer>>;
    }
}

mock! {
    pub CustomerWriter {}

    impl CustomerWriter for CustomerWriter {
        fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
        fn update_customer(&self, customer_id: i32, updates: &UpdateCustomer) -> RepositoryResult<Customer>;
        fn delete_customer(&self, customer_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub OrderReader {}

    impl OrderReader for OrderReader {
        fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
        fn find_order_by_code(&self, code: &str) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self) -> RepositoryResult<Vec<OrderSummary>>;
        fn list_orders_for_customer(&self, customer_id: i32) -> RepositoryResult<Vec<OrderSummary>>;
        fn next_order_code(&self, date: NaiveDate) -> RepositoryResult<String>;
    }
}

mock! {
    pub OrderWriter {}

    impl OrderWriter for OrderWriter {
        fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
        fn update_order(&self, order_id: i32, updates: &UpdateOrder) -> RepositoryResult<Order>;
        fn delete_order(&self, order_id: i32) -> RepositoryResult<()>;
        fn replace_order_items(&self, order_id: i32, items: &[OrderItemInput]) -> RepositoryResult<Order>;
    }
}

mock! {
    pub ImportWriter {}

    impl ImportWriter for ImportWriter {
        fn import_rows(&self, rows: &[ImportRow]) -> RepositoryResult<ImportSummary>;
    }
}

mock! {
    pub MergeWriter {}

    impl MergeWriter for MergeWriter {
        fn merge_store(&self, source: &Path) -> RepositoryResult<MergeSummary>;
    }
}
