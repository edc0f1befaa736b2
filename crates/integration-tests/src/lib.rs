//! Integration tests for Cadastro.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cadastro-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `address_book` - Registry scenarios across customers and addresses
//! - `snapshot` - Export/import round trips and untrusted documents
//! - `principal_invariant` - Property tests over random operation sequences
//!
//! This library only holds the fixtures those tests share.

use cadastro_core::{AddressFields, CustomerFields, CustomerId, Registry};
use chrono::NaiveDate;

/// Customer form with a distinct CPF derived from `n`.
///
/// # Panics
///
/// Panics if `n` is larger than 99.
#[must_use]
pub fn customer_fields(n: u8) -> CustomerFields {
    assert!(n < 100, "fixture CPFs use two digits");
    CustomerFields {
        name: format!("Cliente {n}"),
        cpf: format!("{n:02}{n:02}{n:02}{n:02}{n:02}0"),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default(),
        phone: "(11) 1111-1111".to_owned(),
        mobile: "(11) 99999-9999".to_owned(),
    }
}

/// Valid address form with the given street.
#[must_use]
pub fn address_fields(street: &str) -> AddressFields {
    AddressFields {
        postal_code: "12345-678".to_owned(),
        street: street.to_owned(),
        neighborhood: "Bairro B".to_owned(),
        city: "Cidade C".to_owned(),
        state: "Estado D".to_owned(),
        country: "Brasil".to_owned(),
    }
}

/// Register `n` customers, returning their ids in registration order.
///
/// # Panics
///
/// Panics if a fixture customer is rejected.
#[must_use]
pub fn registry_with_customers(n: u8) -> (Registry, Vec<CustomerId>) {
    let mut registry = Registry::new();
    let ids = (1..=n)
        .map(|i| {
            registry
                .register_customer(&customer_fields(i))
                .unwrap_or_else(|e| panic!("fixture customer {i} rejected: {e}"))
        })
        .collect();
    (registry, ids)
}

/// `(address id, principal)` pairs of a customer, oldest first.
#[must_use]
pub fn principal_flags(registry: &Registry, customer: CustomerId) -> Vec<(i32, bool)> {
    registry
        .list_addresses(customer)
        .iter()
        .map(|a| (a.id.as_i32(), a.principal))
        .collect()
}
