use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::customer::{NewCustomer, UpdateCustomer};
use crate::domain::rut;
use crate::forms::{clean_phone, sanitize_inline_text};

/// Maximum allowed length for a customer name.
const NAME_MAX_LEN: u64 = 100;

/// Result type returned by the customer form helpers.
pub type CustomerFormResult<T> = Result<T, CustomerFormError>;

/// Errors that can occur while processing customer forms.
#[derive(Debug, Error)]
pub enum CustomerFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("customer name cannot be empty")]
    EmptyName,
    /// The provided RUT fails the check-digit validation.
    #[error("invalid RUT `{value}`")]
    InvalidRut { value: String },
    /// The provided phone contains something other than digits.
    #[error("phone may only contain digits, got `{value}`")]
    InvalidPhone { value: String },
}

/// Form payload emitted when registering a new customer.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCustomerForm {
    /// Name entered by the user.
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    /// Optional RUT in any punctuation.
    pub rut: Option<String>,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional email address.
    pub email: Option<String>,
    /// Optional street address.
    pub address: Option<String>,
    /// Optional comuna.
    pub comuna: Option<String>,
}

impl AddCustomerForm {
    /// Validates and sanitizes the payload into a domain `NewCustomer`.
    /// The RUT, when present, is check-digit validated and stored
    /// normalized.
    pub fn into_new_customer(self) -> CustomerFormResult<NewCustomer> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(CustomerFormError::EmptyName);
        }

        let mut new_customer = NewCustomer::new(name);

        if let Some(normalized) = sanitize_rut(self.rut.as_deref())? {
            new_customer = new_customer.with_rut(normalized);
        }
        if let Some(phone) = sanitize_phone(self.phone.as_deref())? {
            new_customer = new_customer.with_phone(phone);
        }
        if let Some(email) = sanitize_email(self.email.as_deref()) {
            new_customer = new_customer.with_email(email);
        }
        if let Some(address) = sanitize_optional_text(self.address.as_deref()) {
            new_customer = new_customer.with_address(address);
        }
        if let Some(comuna) = sanitize_optional_text(self.comuna.as_deref()) {
            new_customer = new_customer.with_comuna(comuna);
        }

        Ok(new_customer)
    }
}

/// Form payload emitted when editing an existing customer. Absent fields
/// are left untouched; an empty string clears the stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct EditCustomerForm {
    /// Optional new name.
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: Option<String>,
    /// Optional RUT update (empty string clears it).
    pub rut: Option<String>,
    /// Optional phone update (empty string clears it).
    pub phone: Option<String>,
    /// Optional email update (empty string clears it).
    pub email: Option<String>,
    /// Optional address update (empty string clears it).
    pub address: Option<String>,
    /// Optional comuna update (empty string clears it).
    pub comuna: Option<String>,
}

impl EditCustomerForm {
    /// Validates and sanitizes the payload into a domain `UpdateCustomer`.
    pub fn into_update_customer(self) -> CustomerFormResult<UpdateCustomer> {
        self.validate()?;

        let mut updates = UpdateCustomer::new();

        if let Some(name) = self.name {
            let sanitized = sanitize_inline_text(&name);
            if sanitized.is_empty() {
                return Err(CustomerFormError::EmptyName);
            }
            updates = updates.name(sanitized);
        }

        if let Some(value) = self.rut {
            updates = updates.rut(sanitize_rut(Some(value.as_str()))?);
        }

        if let Some(value) = self.phone {
            updates = updates.phone(sanitize_phone(Some(value.as_str()))?);
        }

        if let Some(value) = self.email {
            updates = updates.email(sanitize_email(Some(value.as_str())));
        }

        if let Some(value) = self.address {
            updates = updates.address(sanitize_optional_text(Some(value.as_str())));
        }

        if let Some(value) = self.comuna {
            updates = updates.comuna(sanitize_optional_text(Some(value.as_str())));
        }

        Ok(updates)
    }
}

fn sanitize_rut(input: Option<&str>) -> CustomerFormResult<Option<String>> {
    let Some(raw) = input else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if !rut::is_valid(trimmed) {
        return Err(CustomerFormError::InvalidRut {
            value: trimmed.to_string(),
        });
    }

    Ok(Some(rut::normalize(trimmed)))
}

fn sanitize_phone(input: Option<&str>) -> CustomerFormResult<Option<String>> {
    let Some(raw) = input else {
        return Ok(None);
    };

    let cleaned = clean_phone(raw);
    if cleaned.is_empty() {
        return Ok(None);
    }

    if !cleaned.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(CustomerFormError::InvalidPhone {
            value: raw.trim().to_string(),
        });
    }

    Ok(Some(cleaned))
}

fn sanitize_email(input: Option<&str>) -> Option<String> {
    input
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
}

fn sanitize_optional_text(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_inline_text)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_customer_form_converts_successfully() {
        let form = AddCustomerForm {
            name: "  Ana   Pérez ".to_string(),
            rut: Some("12.345.678-5".to_string()),
            phone: Some("9 5228-8367".to_string()),
            email: Some(" Ana@Example.COM ".to_string()),
            address: Some(" Av. Italia 1234 ".to_string()),
            comuna: Some("Ñuñoa".to_string()),
        };

        let new_customer = form.into_new_customer().expect("expected success");

        assert_eq!(new_customer.name, "Ana Pérez");
        assert_eq!(new_customer.rut.as_deref(), Some("123456785"));
        assert_eq!(new_customer.phone.as_deref(), Some("952288367"));
        assert_eq!(new_customer.email.as_deref(), Some("ana@example.com"));
        assert_eq!(new_customer.address.as_deref(), Some("Av. Italia 1234"));
        assert_eq!(new_customer.comuna.as_deref(), Some("Ñuñoa"));
    }

    #[test]
    fn add_customer_form_rejects_blank_name() {
        let form = AddCustomerForm {
            name: "   ".to_string(),
            rut: None,
            phone: None,
            email: None,
            address: None,
            comuna: None,
        };

        assert!(matches!(
            form.into_new_customer(),
            Err(CustomerFormError::EmptyName)
        ));
    }

    #[test]
    fn add_customer_form_rejects_bad_rut() {
        let form = AddCustomerForm {
            name: "Ana".to_string(),
            rut: Some("12.345.678-6".to_string()),
            phone: None,
            email: None,
            address: None,
            comuna: None,
        };

        assert!(matches!(
            form.into_new_customer(),
            Err(CustomerFormError::InvalidRut { value }) if value == "12.345.678-6"
        ));
    }

    #[test]
    fn add_customer_form_rejects_alphabetic_phone() {
        let form = AddCustomerForm {
            name: "Ana".to_string(),
            rut: None,
            phone: Some("no tengo".to_string()),
            email: None,
            address: None,
            comuna: None,
        };

        assert!(matches!(
            form.into_new_customer(),
            Err(CustomerFormError::InvalidPhone { .. })
        ));
    }

    #[test]
    fn edit_customer_form_clears_with_empty_strings() {
        let form = EditCustomerForm {
            name: Some("Ana Pérez".to_string()),
            rut: Some("".to_string()),
            phone: Some(" ".to_string()),
            email: None,
            address: Some("Nueva dirección 55".to_string()),
            comuna: None,
        };

        let updates = form.into_update_customer().expect("expected success");

        assert_eq!(updates.name.as_deref(), Some("Ana Pérez"));
        assert!(matches!(updates.rut, Some(None)));
        assert!(matches!(updates.phone, Some(None)));
        assert!(updates.email.is_none());
        assert_eq!(
            updates.address.as_ref().and_then(|value| value.as_deref()),
            Some("Nueva dirección 55")
        );
        assert!(updates.comuna.is_none());
    }
}
