//! Address domain types.

use serde::{Deserialize, Serialize};

use crate::store::{Record, TableName};
use crate::types::{AddressId, CustomerId};
use crate::validation::{FieldKind, FormValidator, ValidationErrors};

/// A customer address.
///
/// `principal` is a guarded flag: it is only ever changed through the
/// primary-address engine, which keeps exactly one principal address per
/// customer that has any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning customer.
    #[serde(rename = "clienteId")]
    pub customer_id: CustomerId,
    /// Postal code (CEP).
    #[serde(rename = "cep")]
    pub postal_code: String,
    #[serde(rename = "rua")]
    pub street: String,
    #[serde(rename = "bairro")]
    pub neighborhood: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
    #[serde(rename = "pais")]
    pub country: String,
    /// Whether this is the customer's primary address.
    #[serde(default)]
    pub principal: bool,
}

impl Record for Address {
    type Id = AddressId;
    const TABLE: TableName = TableName::Addresses;

    fn id(&self) -> AddressId {
        self.id
    }
}

/// Editable address fields as entered by a user.
///
/// The principal flag is requested separately since the engine may override it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
    pub postal_code: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl AddressFields {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns all field errors found in the form.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        FormValidator::new()
            .field("cep", FieldKind::PostalCode, &self.postal_code)
            .field("rua", FieldKind::Text, &self.street)
            .field("bairro", FieldKind::Text, &self.neighborhood)
            .field("cidade", FieldKind::Text, &self.city)
            .field("estado", FieldKind::Text, &self.state)
            .field("pais", FieldKind::Text, &self.country)
            .finish()
    }

    pub(crate) fn apply(&self, address: &mut Address, principal: bool) {
        address.postal_code = self.postal_code.trim().to_owned();
        address.street = self.street.trim().to_owned();
        address.neighborhood = self.neighborhood.trim().to_owned();
        address.city = self.city.trim().to_owned();
        address.state = self.state.trim().to_owned();
        address.country = self.country.trim().to_owned();
        address.principal = principal;
    }

    pub(crate) fn to_address(&self, id: AddressId, customer_id: CustomerId, principal: bool) -> Address {
        let mut address = Address {
            id,
            customer_id,
            postal_code: String::new(),
            street: String::new(),
            neighborhood: String::new(),
            city: String::new(),
            state: String::new(),
            country: String::new(),
            principal,
        };
        self.apply(&mut address, principal);
        address
    }
}
