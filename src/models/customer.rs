use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::customer::{
    Customer as DomainCustomer, NewCustomer as DomainNewCustomer,
    UpdateCustomer as DomainUpdateCustomer,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::customers)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub rut: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub comuna: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
pub struct NewCustomer<'a> {
    pub name: &'a str,
    pub rut: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub comuna: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::customers)]
pub struct UpdateCustomer<'a> {
    pub name: Option<&'a str>,
    pub rut: Option<Option<&'a str>>,
    pub phone: Option<Option<&'a str>>,
    pub email: Option<Option<&'a str>>,
    pub address: Option<Option<&'a str>>,
    pub comuna: Option<Option<&'a str>>,
    pub updated_at: NaiveDateTime,
}

impl From<Customer> for DomainCustomer {
    fn from(value: Customer) -> Self {
        Self {
            id: value.id,
            name: value.name,
            rut: value.rut,
            phone: value.phone,
            email: value.email,
            address: value.address,
            comuna: value.comuna,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewCustomer> for NewCustomer<'a> {
    fn from(value: &'a DomainNewCustomer) -> Self {
        Self {
            name: value.name.as_str(),
            rut: value.rut.as_deref(),
            phone: value.phone.as_deref(),
            email: value.email.as_deref(),
            address: value.address.as_deref(),
            comuna: value.comuna.as_deref(),
        }
    }
}

impl<'a> From<&'a DomainUpdateCustomer> for UpdateCustomer<'a> {
    fn from(value: &'a DomainUpdateCustomer) -> Self {
        Self {
            name: value.name.as_deref(),
            rut: value.rut.as_ref().map(|rut| rut.as_deref()),
            phone: value.phone.as_ref().map(|phone| phone.as_deref()),
            email: value.email.as_ref().map(|email| email.as_deref()),
            address: value.address.as_ref().map(|address| address.as_deref()),
            comuna: value.comuna.as_ref().map(|comuna| comuna.as_deref()),
            updated_at: value.updated_at,
        }
    }
}
