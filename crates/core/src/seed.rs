//! Default records for a fresh installation.

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::models::{AddressFields, CustomerFields};
use crate::registry::{Registry, ServiceError};

/// Sign-in credentials of the seeded administrator.
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "123456";

fn sample_customer() -> CustomerFields {
    CustomerFields {
        name: "João da Silva".to_owned(),
        cpf: "123.456.890-10".to_owned(),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default(),
        phone: "(11) 1111-1111".to_owned(),
        mobile: "(11) 99999-9999".to_owned(),
    }
}

fn sample_address() -> AddressFields {
    AddressFields {
        postal_code: "12345-678".to_owned(),
        street: "Rua A".to_owned(),
        neighborhood: "Bairro B".to_owned(),
        city: "Cidade C".to_owned(),
        state: "Estado D".to_owned(),
        country: "Brasil".to_owned(),
    }
}

/// Load the administrator, a sample customer and its principal address when
/// no user exists yet.
///
/// Returns `true` if the records were added.
///
/// # Errors
///
/// Returns a [`ServiceError`] if the sample records conflict with existing
/// customers, e.g. a store holding customers but no users.
#[instrument(skip_all)]
pub fn seed_if_empty(registry: &mut Registry) -> Result<bool, ServiceError> {
    if !registry.store().users().is_empty() {
        return Ok(false);
    }

    registry.register_user("Administrador", ADMIN_USERNAME, ADMIN_PASSWORD)?;
    let customer = registry.register_customer(&sample_customer())?;
    registry.create_address(customer, &sample_address(), true)?;

    info!("Seed data loaded");
    Ok(true)
}

impl Registry {
    /// A registry holding only the seed records.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`seed_if_empty`], which cannot happen on an
    /// empty registry unless the sample data itself is invalid.
    pub fn with_seed_data() -> Result<Self, ServiceError> {
        let mut registry = Self::new();
        seed_if_empty(&mut registry)?;
        Ok(registry)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_fresh_registry() {
        let registry = Registry::with_seed_data().unwrap();

        assert!(registry.login(ADMIN_USERNAME, ADMIN_PASSWORD).is_some());

        let customers = registry.list_customers();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].cpf.as_str(), "123.456.890-10");
        assert_eq!(
            customers[0].birth_date,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
        );

        let address = registry.principal_address(customers[0].id).unwrap();
        assert_eq!(address.street, "Rua A");
        assert_eq!(address.country, "Brasil");
    }

    #[test]
    fn test_seed_skips_when_users_exist() {
        let mut registry = Registry::new();
        registry.register_user("Ana", "ana", "pw").unwrap();

        assert!(!seed_if_empty(&mut registry).unwrap());
        assert!(registry.list_customers().is_empty());
    }

    #[test]
    fn test_seed_is_idempotent() {
        let mut registry = Registry::with_seed_data().unwrap();
        assert!(!seed_if_empty(&mut registry).unwrap());
        assert_eq!(registry.store().users().len(), 1);
    }
}
