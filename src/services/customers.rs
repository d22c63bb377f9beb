use crate::domain::customer::{Customer, filter_customers};
use crate::domain::order::OrderSummary;
use crate::domain::rut;
use crate::forms::customers::{AddCustomerForm, EditCustomerForm};
use crate::repository::{CustomerReader, CustomerWriter, OrderReader};
use crate::services::{ServiceError, ServiceResult};

/// Registers a new customer. A RUT, when present, must not already
/// belong to another customer.
pub fn create_customer<R>(repo: &R, form: AddCustomerForm) -> ServiceResult<Customer>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    let new_customer = form
        .into_new_customer()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if let Some(rut_value) = new_customer.rut.as_deref() {
        if let Some(existing) = repo.find_customer_by_rut(rut_value)? {
            return Err(ServiceError::Form(format!(
                "a customer with RUT {} already exists: {}",
                rut::format(rut_value),
                existing.name
            )));
        }
    }

    let created = repo.create_customer(&new_customer)?;
    log::info!("customer {} registered (id {})", created.name, created.id);

    Ok(created)
}

/// Applies an edit form to an existing customer.
pub fn update_customer<R>(
    repo: &R,
    customer_id: i32,
    form: EditCustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    let updates = form
        .into_update_customer()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if let Some(Some(rut_value)) = updates.rut.as_ref().map(|rut| rut.as_deref()) {
        if let Some(existing) = repo.find_customer_by_rut(rut_value)? {
            if existing.id != customer_id {
                return Err(ServiceError::Form(format!(
                    "a customer with RUT {} already exists: {}",
                    rut::format(rut_value),
                    existing.name
                )));
            }
        }
    }

    Ok(repo.update_customer(customer_id, &updates)?)
}

/// Deletes a customer; its orders and their items go with it.
pub fn delete_customer<R>(repo: &R, customer_id: i32) -> ServiceResult<()>
where
    R: CustomerWriter + ?Sized,
{
    repo.delete_customer(customer_id)?;
    log::info!("customer {customer_id} deleted with its orders");

    Ok(())
}

/// Loads a customer by id.
pub fn get_customer<R>(repo: &R, customer_id: i32) -> ServiceResult<Customer>
where
    R: CustomerReader + ?Sized,
{
    repo.get_customer_by_id(customer_id)?
        .ok_or(ServiceError::NotFound)
}

/// Full directory snapshot, name ascending.
pub fn list_customers<R>(repo: &R) -> ServiceResult<Vec<Customer>>
where
    R: CustomerReader + ?Sized,
{
    Ok(repo.list_customers()?)
}

/// Case-insensitive substring search over a fresh directory snapshot.
/// Matches name, phone, email and comuna; result order follows the
/// snapshot (name ascending).
pub fn search_customers<R>(repo: &R, term: &str) -> ServiceResult<Vec<Customer>>
where
    R: CustomerReader + ?Sized,
{
    let snapshot = repo.list_customers()?;
    Ok(filter_customers(snapshot, term))
}

/// Purchase history of one customer, date descending.
pub fn customer_history<R>(repo: &R, customer_id: i32) -> ServiceResult<Vec<OrderSummary>>
where
    R: CustomerReader + OrderReader + ?Sized,
{
    if repo.get_customer_by_id(customer_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    Ok(repo.list_orders_for_customer(customer_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::repository::RepositoryResult;
    use crate::repository::mock::{MockCustomerReader, MockCustomerWriter};

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn sample_customer(id: i32, name: &str, rut: Option<&str>) -> Customer {
        Customer {
            id,
            name: name.to_string(),
            rut: rut.map(str::to_string),
            phone: None,
            email: None,
            address: None,
            comuna: None,
            created_at: datetime(),
            updated_at: datetime(),
        }
    }

    struct FakeRepo {
        reader: MockCustomerReader,
        writer: MockCustomerWriter,
    }

    impl FakeRepo {
        fn new() -> Self {
            Self {
                reader: MockCustomerReader::new(),
                writer: MockCustomerWriter::new(),
            }
        }
    }

    impl CustomerReader for FakeRepo {
        fn get_customer_by_id(&self, id: i32) -> RepositoryResult<Option<Customer>> {
            self.reader.get_customer_by_id(id)
        }

        fn find_customer_by_name(&self, name: &str) -> RepositoryResult<Option<Customer>> {
            self.reader.find_customer_by_name(name)
        }

        fn find_customer_by_rut(&self, rut: &str) -> RepositoryResult<Option<Customer>> {
            self.reader.find_customer_by_rut(rut)
        }

        fn list_customers(&self) -> RepositoryResult<Vec<Customer>> {
            self.reader.list_customers()
        }
    }

    impl CustomerWriter for FakeRepo {
        fn create_customer(
            &self,
            new_customer: &crate::domain::customer::NewCustomer,
        ) -> RepositoryResult<Customer> {
            self.writer.create_customer(new_customer)
        }

        fn update_customer(
            &self,
            customer_id: i32,
            updates: &crate::domain::customer::UpdateCustomer,
        ) -> RepositoryResult<Customer> {
            self.writer.update_customer(customer_id, updates)
        }

        fn delete_customer(&self, customer_id: i32) -> RepositoryResult<()> {
            self.writer.delete_customer(customer_id)
        }
    }

    fn add_form(name: &str, rut: Option<&str>) -> AddCustomerForm {
        AddCustomerForm {
            name: name.to_string(),
            rut: rut.map(str::to_string),
            phone: None,
            email: None,
            address: None,
            comuna: None,
        }
    }

    #[test]
    fn create_customer_persists_normalized_rut() {
        let mut repo = FakeRepo::new();

        repo.reader
            .expect_find_customer_by_rut()
            .times(1)
            .withf(|rut| rut == "123456785")
            .returning(|_| Ok(None));

        repo.writer
            .expect_create_customer()
            .times(1)
            .withf(|new_customer| {
                assert_eq!(new_customer.name, "Ana Pérez");
                assert_eq!(new_customer.rut.as_deref(), Some("123456785"));
                true
            })
            .returning(|new_customer| {
                Ok(sample_customer(
                    1,
                    new_customer.name.as_str(),
                    new_customer.rut.as_deref(),
                ))
            });

        let created = create_customer(&repo, add_form(" Ana  Pérez ", Some("12.345.678-5")))
            .expect("expected success");

        assert_eq!(created.id, 1);
        assert_eq!(created.rut.as_deref(), Some("123456785"));
    }

    #[test]
    fn create_customer_rejects_duplicate_rut() {
        let mut repo = FakeRepo::new();

        repo.reader
            .expect_find_customer_by_rut()
            .times(1)
            .returning(|_| Ok(Some(sample_customer(9, "Ana Pérez", Some("123456785")))));

        let result = create_customer(&repo, add_form("Otra Ana", Some("12.345.678-5")));

        assert!(matches!(result, Err(ServiceError::Form(message)) if message.contains("Ana Pérez")));
    }

    #[test]
    fn create_customer_rejects_invalid_form_before_any_write() {
        let repo = FakeRepo::new();

        let result = create_customer(&repo, add_form("   ", None));

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn update_customer_allows_keeping_own_rut() {
        let mut repo = FakeRepo::new();

        repo.reader
            .expect_find_customer_by_rut()
            .times(1)
            .returning(|_| Ok(Some(sample_customer(5, "Ana Pérez", Some("123456785")))));

        repo.writer
            .expect_update_customer()
            .times(1)
            .returning(|id, _| Ok(sample_customer(id, "Ana Pérez", Some("123456785"))));

        let form = EditCustomerForm {
            name: None,
            rut: Some("12.345.678-5".to_string()),
            phone: None,
            email: None,
            address: None,
            comuna: None,
        };

        let updated = update_customer(&repo, 5, form).expect("expected success");
        assert_eq!(updated.id, 5);
    }

    #[test]
    fn search_filters_the_snapshot_in_memory() {
        let mut repo = FakeRepo::new();

        repo.reader.expect_list_customers().times(1).returning(|| {
            Ok(vec![
                sample_customer(1, "Ana Pérez", None),
                sample_customer(2, "Bernardo Soto", None),
            ])
        });

        let found = search_customers(&repo, "ana").expect("expected success");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ana Pérez");
    }
}
