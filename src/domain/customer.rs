use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Domain representation of a customer in the directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    /// Unique identifier of the customer.
    pub id: i32,
    /// Display name of the customer. Required; also the match key for
    /// spreadsheet imports.
    pub name: String,
    /// Optional national ID (RUT), stored normalized: digits plus check
    /// character, no dots or hyphen.
    pub rut: Option<String>,
    /// Optional phone number, digits only.
    pub phone: Option<String>,
    /// Optional email address.
    pub email: Option<String>,
    /// Optional street address.
    pub address: Option<String>,
    /// Optional comuna (municipal subdivision).
    pub comuna: Option<String>,
    /// Timestamp for when the customer record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the customer record.
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    /// Display name of the customer.
    pub name: String,
    /// Optional normalized RUT.
    pub rut: Option<String>,
    /// Optional phone number, digits only.
    pub phone: Option<String>,
    /// Optional email address.
    pub email: Option<String>,
    /// Optional street address.
    pub address: Option<String>,
    /// Optional comuna.
    pub comuna: Option<String>,
}

impl NewCustomer {
    /// Build a new customer payload with only the required name set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rut: None,
            phone: None,
            email: None,
            address: None,
            comuna: None,
        }
    }

    /// Attach a normalized RUT to the payload.
    #[must_use]
    pub fn with_rut(mut self, rut: impl Into<String>) -> Self {
        self.rut = Some(rut.into());
        self
    }

    /// Attach a phone number to the payload.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Attach an email address to the payload.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach a street address to the payload.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Attach a comuna to the payload.
    #[must_use]
    pub fn with_comuna(mut self, comuna: impl Into<String>) -> Self {
        self.comuna = Some(comuna.into());
        self
    }
}

/// Patch data applied when updating an existing customer.
#[derive(Debug, Clone)]
pub struct UpdateCustomer {
    /// Optional name update.
    pub name: Option<String>,
    /// Optional RUT update, using the inner `None` to clear the value.
    pub rut: Option<Option<String>>,
    /// Optional phone update, using the inner `None` to clear the value.
    pub phone: Option<Option<String>>,
    /// Optional email update, using the inner `None` to clear the value.
    pub email: Option<Option<String>>,
    /// Optional address update, using the inner `None` to clear the value.
    pub address: Option<Option<String>>,
    /// Optional comuna update, using the inner `None` to clear the value.
    pub comuna: Option<Option<String>>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateCustomer {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateCustomer {
    /// Create a new patch object with no changes applied yet.
    pub fn new() -> Self {
        let now = chrono::Local::now().naive_utc();
        Self {
            name: None,
            rut: None,
            phone: None,
            email: None,
            address: None,
            comuna: None,
            updated_at: now,
        }
    }

    /// Update the customer name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Update the RUT, using `None` to clear an existing value.
    pub fn rut(mut self, rut: Option<impl Into<String>>) -> Self {
        self.rut = Some(rut.map(|value| value.into()));
        self
    }

    /// Update the phone number, using `None` to clear an existing value.
    pub fn phone(mut self, phone: Option<impl Into<String>>) -> Self {
        self.phone = Some(phone.map(|value| value.into()));
        self
    }

    /// Update the email address, using `None` to clear an existing value.
    pub fn email(mut self, email: Option<impl Into<String>>) -> Self {
        self.email = Some(email.map(|value| value.into()));
        self
    }

    /// Update the street address, using `None` to clear an existing value.
    pub fn address(mut self, address: Option<impl Into<String>>) -> Self {
        self.address = Some(address.map(|value| value.into()));
        self
    }

    /// Update the comuna, using `None` to clear an existing value.
    pub fn comuna(mut self, comuna: Option<impl Into<String>>) -> Self {
        self.comuna = Some(comuna.map(|value| value.into()));
        self
    }
}

/// Case-insensitive substring filter over a directory snapshot.
///
/// Matches name, phone, email and comuna. An empty term keeps every
/// record. Result order follows the snapshot order (name ascending as
/// loaded), unaffected by filtering.
pub fn filter_customers(customers: Vec<Customer>, term: &str) -> Vec<Customer> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return customers;
    }

    customers
        .into_iter()
        .filter(|customer| customer_matches(customer, &needle))
        .collect()
}

fn customer_matches(customer: &Customer, needle: &str) -> bool {
    let fields = [
        Some(customer.name.as_str()),
        customer.phone.as_deref(),
        customer.email.as_deref(),
        customer.comuna.as_deref(),
    ];

    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}
