//! Address management commands.
//!
//! # Usage
//!
//! ```bash
//! cadastro address create 1 --cep 01310100 --street "Av. Paulista" \
//!     --neighborhood "Bela Vista" --city "São Paulo" --state SP --principal
//! cadastro address update 2 --street "Av. Paulista, 1000" --principal true
//! cadastro address delete 2
//! cadastro address list 1
//! ```

use std::io::Write;

use cadastro_core::{
    Address, AddressFields, AddressId, CustomerId, FieldKind, Notice, Registry, ServiceError,
};
use clap::Args;

use super::{Outcome, masked};
use crate::error::CliError;
use crate::render;

/// Every address field, as typed on the command line.
#[derive(Debug, Clone, Args)]
pub struct AddressForm {
    /// Postal code (CEP), `NNNNN-NNN` or 8 digits
    #[arg(long)]
    pub cep: String,

    #[arg(long)]
    pub street: String,

    #[arg(long)]
    pub neighborhood: String,

    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub state: String,

    #[arg(long, default_value = "Brasil")]
    pub country: String,
}

impl AddressForm {
    pub fn to_fields(&self) -> AddressFields {
        AddressFields {
            postal_code: masked(FieldKind::PostalCode, &self.cep),
            street: self.street.clone(),
            neighborhood: self.neighborhood.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
        }
    }
}

/// Address fields to change; omitted ones keep their current value.
#[derive(Debug, Clone, Default, Args)]
pub struct AddressPatch {
    #[arg(long)]
    pub cep: Option<String>,

    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub neighborhood: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub country: Option<String>,
}

impl AddressPatch {
    fn apply_to(&self, current: &Address) -> AddressFields {
        AddressFields {
            postal_code: self.cep.as_deref().map_or_else(
                || current.postal_code.clone(),
                |cep| masked(FieldKind::PostalCode, cep),
            ),
            street: self.street.clone().unwrap_or_else(|| current.street.clone()),
            neighborhood: self
                .neighborhood
                .clone()
                .unwrap_or_else(|| current.neighborhood.clone()),
            city: self.city.clone().unwrap_or_else(|| current.city.clone()),
            state: self.state.clone().unwrap_or_else(|| current.state.clone()),
            country: self.country.clone().unwrap_or_else(|| current.country.clone()),
        }
    }
}

/// Add an address to a customer.
///
/// # Errors
///
/// Returns `CliError::Service` for invalid fields or an unknown customer.
pub fn create(
    registry: &mut Registry,
    customer_id: CustomerId,
    form: &AddressForm,
    principal: bool,
) -> Result<Outcome, CliError> {
    let id = registry.create_address(customer_id, &form.to_fields(), principal)?;
    Ok(Outcome::changed(created_notice(registry, id)))
}

/// Change an address. `principal` of `None` keeps the current flag.
///
/// # Errors
///
/// Returns `CliError::Service` for invalid fields or an unknown address.
pub fn update(
    registry: &mut Registry,
    id: AddressId,
    patch: &AddressPatch,
    principal: Option<bool>,
) -> Result<Outcome, CliError> {
    let current = registry
        .store()
        .addresses()
        .get(id)
        .ok_or(ServiceError::AddressNotFound(id))?;
    let fields = patch.apply_to(current);
    let requested = principal.unwrap_or(current.principal);

    registry.update_address(id, &fields, requested)?;

    let granted = registry
        .store()
        .addresses()
        .get(id)
        .is_some_and(|a| a.principal);
    let notice = if granted && !requested {
        Notice::info(format!(
            "Address {id} updated; it stays principal because the customer has no other principal address"
        ))
    } else {
        Notice::success(format!("Address {id} updated"))
    };
    Ok(Outcome::changed(notice))
}

/// Delete an address.
///
/// # Errors
///
/// Returns `CliError::Service` for an unknown address.
pub fn delete(registry: &mut Registry, id: AddressId) -> Result<Outcome, CliError> {
    let notice = match registry.delete_address(id)? {
        Some(promoted) => Notice::info(format!(
            "Address {id} deleted; address {promoted} is now principal"
        )),
        None => Notice::success(format!("Address {id} deleted")),
    };
    Ok(Outcome::changed(notice))
}

/// Print a customer's addresses.
///
/// # Errors
///
/// Returns `CliError::Service` for an unknown customer.
pub fn list(
    registry: &Registry,
    customer_id: CustomerId,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    let customer = registry
        .get_customer(customer_id)
        .ok_or(ServiceError::CustomerNotFound(customer_id))?;
    render::addresses(out, customer, &registry.list_addresses(customer_id))
        .map_err(CliError::Output)?;
    Ok(Outcome::read_only())
}

fn created_notice(registry: &Registry, id: AddressId) -> Notice {
    let principal = registry
        .store()
        .addresses()
        .get(id)
        .is_some_and(|a| a.principal);
    if principal {
        Notice::success(format!("Address {id} created as principal"))
    } else {
        Notice::success(format!("Address {id} created"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(street: &str) -> AddressForm {
        AddressForm {
            cep: "01310100".to_owned(),
            street: street.to_owned(),
            neighborhood: "Bela Vista".to_owned(),
            city: "São Paulo".to_owned(),
            state: "SP".to_owned(),
            country: "Brasil".to_owned(),
        }
    }

    fn seeded() -> (Registry, CustomerId) {
        let registry = Registry::with_seed_data().unwrap();
        let customer = registry.list_customers()[0].id;
        (registry, customer)
    }

    #[test]
    fn test_create_masks_postal_code() {
        let (mut registry, customer) = seeded();
        create(&mut registry, customer, &form("Av. Paulista"), false).unwrap();

        let addresses = registry.list_addresses(customer);
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[1].postal_code, "01310-100");
        assert!(!addresses[1].principal);
    }

    #[test]
    fn test_update_keeps_flag_and_unchanged_fields() {
        let (mut registry, customer) = seeded();
        let principal = registry.principal_address(customer).unwrap().id;

        let patch = AddressPatch {
            street: Some("Rua Nova".to_owned()),
            ..AddressPatch::default()
        };
        update(&mut registry, principal, &patch, None).unwrap();

        let address = registry.principal_address(customer).unwrap();
        assert_eq!(address.id, principal);
        assert_eq!(address.street, "Rua Nova");
        assert_eq!(address.city, "Cidade C");
    }

    #[test]
    fn test_update_reports_overridden_unset() {
        let (mut registry, customer) = seeded();
        let principal = registry.principal_address(customer).unwrap().id;

        let outcome = update(
            &mut registry,
            principal,
            &AddressPatch::default(),
            Some(false),
        )
        .unwrap();
        assert_eq!(outcome.notice.unwrap().level, cadastro_core::NoticeLevel::Info);
        assert!(registry.principal_address(customer).is_some());
    }

    #[test]
    fn test_delete_reports_promotion() {
        let (mut registry, customer) = seeded();
        let first = registry.principal_address(customer).unwrap().id;
        create(&mut registry, customer, &form("Av. Paulista"), false).unwrap();

        let outcome = delete(&mut registry, first).unwrap();
        assert!(outcome.notice.unwrap().message.contains("is now principal"));
    }

    #[test]
    fn test_list_unknown_customer() {
        let registry = Registry::new();
        let mut out = Vec::new();
        let err = list(&registry, CustomerId::new(1), &mut out).unwrap_err();
        assert!(matches!(err, CliError::Service(ServiceError::CustomerNotFound(_))));
    }
}
