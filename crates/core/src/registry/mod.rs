//! Registry services for users, customers and addresses.
//!
//! The [`Registry`] owns the record store and is the only way to mutate it.
//! Every address mutation goes through the [primary-address
//! engine](crate::principal), so a customer with addresses always has exactly
//! one principal address once a call returns.
//!
//! # Example
//!
//! ```
//! use cadastro_core::{AddressFields, CustomerFields, Registry};
//! use chrono::NaiveDate;
//!
//! let mut registry = Registry::new();
//! let customer = registry
//!     .register_customer(&CustomerFields {
//!         name: "Maria Souza".to_owned(),
//!         cpf: "98765432100".to_owned(),
//!         birth_date: NaiveDate::from_ymd_opt(1985, 4, 12).unwrap(),
//!         phone: "(11) 3333-4444".to_owned(),
//!         mobile: "(11) 98888-7777".to_owned(),
//!     })
//!     .unwrap();
//!
//! let home = AddressFields {
//!     postal_code: "01310-100".to_owned(),
//!     street: "Av. Paulista".to_owned(),
//!     neighborhood: "Bela Vista".to_owned(),
//!     city: "São Paulo".to_owned(),
//!     state: "SP".to_owned(),
//!     country: "Brasil".to_owned(),
//! };
//!
//! // The first address is principal even when not requested.
//! let id = registry.create_address(customer, &home, false).unwrap();
//! assert_eq!(registry.principal_address(customer).unwrap().id, id);
//! ```

pub mod error;
pub mod session;

use tracing::{debug, info, instrument, warn};

use crate::models::{Address, AddressFields, Customer, CustomerFields, User};
use crate::principal;
use crate::snapshot::{ImportReport, Snapshot};
use crate::store::{RecordStore, StoreError};
use crate::types::{AddressId, CustomerId, UserId};
use crate::validation::{FieldKind, FormValidator};

pub use error::ServiceError;
pub use session::{AddressSession, Confirm, CustomerSession};

/// Users, customers and addresses, with the rules that keep them consistent.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    store: RecordStore,
}

impl Registry {
    /// Create a registry over an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing store.
    #[must_use]
    pub const fn from_store(store: RecordStore) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    #[must_use]
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> RecordStore {
        self.store
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Register a user who can sign in.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for blank fields and
    /// [`ServiceError::UsernameTaken`] if the username exists.
    #[instrument(skip_all, fields(username = %username.trim()))]
    pub fn register_user(
        &mut self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<UserId, ServiceError> {
        FormValidator::new()
            .field("nome", FieldKind::Text, name)
            .field("usuario", FieldKind::Text, username)
            .field("senha", FieldKind::Text, password)
            .finish()?;

        let id = self
            .store
            .users_mut()
            .insert_with(|id| User {
                id,
                name: name.trim().to_owned(),
                username: username.trim().to_owned(),
                password: password.trim().to_owned(),
            })
            .map_err(|e| on_duplicate(e, || ServiceError::UsernameTaken))?;

        info!(user_id = %id, "User registered");
        Ok(id)
    }

    /// Find the user matching both credentials.
    #[must_use]
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Option<&User> {
        let username = username.trim();
        let password = password.trim();
        let user = self
            .store
            .users()
            .find(|u| u.username == username && u.password_matches(password));

        if user.is_some() {
            info!("Login succeeded");
        } else {
            warn!("Login failed");
        }
        user
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for invalid fields and
    /// [`ServiceError::CpfTaken`] if another customer has the same CPF. Nothing
    /// is stored on error.
    #[instrument(skip_all)]
    pub fn register_customer(&mut self, fields: &CustomerFields) -> Result<CustomerId, ServiceError> {
        let cpf = fields.validate()?;

        let id = self
            .store
            .customers_mut()
            .insert_with(|id| fields.to_customer(id, cpf.clone()))
            .map_err(|e| on_duplicate(e, || ServiceError::CpfTaken(cpf.clone())))?;

        info!(customer_id = %id, "Customer registered");
        Ok(id)
    }

    /// Replace every field of an existing customer.
    ///
    /// The CPF stays unique: it may only collide with the customer's own.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::CustomerNotFound`], [`ServiceError::Validation`]
    /// or [`ServiceError::CpfTaken`]. Nothing changes on error.
    #[instrument(skip_all, fields(customer_id = %id))]
    pub fn update_customer(
        &mut self,
        id: CustomerId,
        fields: &CustomerFields,
    ) -> Result<(), ServiceError> {
        if !self.store.customers().contains(id) {
            return Err(ServiceError::CustomerNotFound(id));
        }
        let cpf = fields.validate()?;
        let taken = cpf.clone();

        self.store
            .customers_mut()
            .update(id, |customer| fields.apply(customer, cpf))
            .map_err(|e| on_duplicate(e, || ServiceError::CpfTaken(taken)))?;

        info!("Customer updated");
        Ok(())
    }

    /// Register or update a customer depending on the edit session.
    ///
    /// # Errors
    ///
    /// See [`Registry::register_customer`] and [`Registry::update_customer`].
    pub fn save_customer(
        &mut self,
        session: CustomerSession,
        fields: &CustomerFields,
    ) -> Result<CustomerId, ServiceError> {
        match session {
            CustomerSession::New => self.register_customer(fields),
            CustomerSession::Editing(id) => self.update_customer(id, fields).map(|()| id),
        }
    }

    /// Delete a customer and all of its addresses once `confirm` agrees.
    ///
    /// Returns `false` if the user declined, in which case nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::CustomerNotFound`] for an unknown id; the
    /// confirmation is not requested in that case.
    #[instrument(skip_all, fields(customer_id = %id))]
    pub fn delete_customer(
        &mut self,
        id: CustomerId,
        confirm: &impl Confirm,
    ) -> Result<bool, ServiceError> {
        let Some(customer) = self.store.customers().get(id) else {
            return Err(ServiceError::CustomerNotFound(id));
        };

        if !confirm.confirm(&format!("Delete customer {}?", customer.name)) {
            info!("Customer deletion cancelled");
            return Ok(false);
        }

        self.store.customers_mut().delete(id)?;

        let owned: Vec<AddressId> = self.list_addresses(id).iter().map(|a| a.id).collect();
        for &address in &owned {
            self.store.addresses_mut().delete(address)?;
        }

        info!(addresses = owned.len(), "Customer deleted");
        Ok(true)
    }

    /// Drop a customer whose registration was abandoned before its first
    /// address was saved.
    ///
    /// Returns `false` and keeps the customer if it already has an address.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::CustomerNotFound`] for an unknown id.
    #[instrument(skip_all, fields(customer_id = %id))]
    pub fn discard_incomplete_customer(&mut self, id: CustomerId) -> Result<bool, ServiceError> {
        if !self.store.customers().contains(id) {
            return Err(ServiceError::CustomerNotFound(id));
        }
        if !self.list_addresses(id).is_empty() {
            return Ok(false);
        }

        self.store.customers_mut().delete(id)?;
        info!("Incomplete customer registration discarded");
        Ok(true)
    }

    /// All customers in registration order.
    #[must_use]
    pub fn list_customers(&self) -> Vec<&Customer> {
        self.store.customers().iter().collect()
    }

    #[must_use]
    pub fn get_customer(&self, id: CustomerId) -> Option<&Customer> {
        self.store.customers().get(id)
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Add an address to a customer.
    ///
    /// `requested_principal` is advisory: a customer's first address is always
    /// principal, and a granted request demotes the previous principal.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for invalid fields and
    /// [`ServiceError::CustomerNotFound`] for an unknown customer.
    #[instrument(skip_all, fields(customer_id = %customer_id, requested = requested_principal))]
    pub fn create_address(
        &mut self,
        customer_id: CustomerId,
        fields: &AddressFields,
        requested_principal: bool,
    ) -> Result<AddressId, ServiceError> {
        fields.validate()?;
        if !self.store.customers().contains(customer_id) {
            return Err(ServiceError::CustomerNotFound(customer_id));
        }

        let placement =
            principal::place_new(&self.list_addresses(customer_id), requested_principal);
        log_override(requested_principal, placement.principal);

        let id = self
            .store
            .addresses_mut()
            .insert_with(|id| fields.to_address(id, customer_id, placement.principal))?;
        self.demote(&placement.demote)?;

        info!(address_id = %id, principal = placement.principal, "Address created");
        Ok(id)
    }

    /// Replace the fields of an address.
    ///
    /// Requesting principal demotes the customer's other addresses. Giving up
    /// principal is ignored when no other address of the customer holds it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for invalid fields and
    /// [`ServiceError::AddressNotFound`] for an unknown id.
    #[instrument(skip_all, fields(address_id = %id, requested = requested_principal))]
    pub fn update_address(
        &mut self,
        id: AddressId,
        fields: &AddressFields,
        requested_principal: bool,
    ) -> Result<(), ServiceError> {
        let customer_id = self
            .store
            .addresses()
            .get(id)
            .map(|a| a.customer_id)
            .ok_or(ServiceError::AddressNotFound(id))?;
        fields.validate()?;

        let placement = principal::place_existing(
            &self
                .store
                .addresses()
                .query(|a| a.customer_id == customer_id && a.id != id),
            requested_principal,
        );
        log_override(requested_principal, placement.principal);

        self.demote(&placement.demote)?;
        self.store
            .addresses_mut()
            .update(id, |address| fields.apply(address, placement.principal))?;

        info!(principal = placement.principal, "Address updated");
        Ok(())
    }

    /// Create or update an address depending on the edit session.
    ///
    /// # Errors
    ///
    /// See [`Registry::create_address`] and [`Registry::update_address`].
    pub fn save_address(
        &mut self,
        session: AddressSession,
        fields: &AddressFields,
        requested_principal: bool,
    ) -> Result<AddressId, ServiceError> {
        match session {
            AddressSession::New(customer_id) => {
                self.create_address(customer_id, fields, requested_principal)
            }
            AddressSession::Editing(id) => self
                .update_address(id, fields, requested_principal)
                .map(|()| id),
        }
    }

    /// Delete an address, promoting the customer's oldest remaining address
    /// if the deleted one was principal.
    ///
    /// Returns the promoted address, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AddressNotFound`] for an unknown id.
    #[instrument(skip_all, fields(address_id = %id))]
    pub fn delete_address(&mut self, id: AddressId) -> Result<Option<AddressId>, ServiceError> {
        let removed = self.store.addresses_mut().delete(id).map_err(|e| match e {
            StoreError::NotFound { .. } => ServiceError::AddressNotFound(id),
            other => other.into(),
        })?;

        let promoted = principal::successor(&self.list_addresses(removed.customer_id));
        if let Some(next) = promoted {
            self.store
                .addresses_mut()
                .update(next, |address| address.principal = true)?;
            info!(promoted = %next, "Principal address reassigned");
        }

        info!("Address deleted");
        Ok(promoted)
    }

    /// A customer's addresses, oldest first.
    #[must_use]
    pub fn list_addresses(&self, customer_id: CustomerId) -> Vec<&Address> {
        self.store
            .addresses()
            .query(|a| a.customer_id == customer_id)
    }

    /// The customer's principal address, if it has any address.
    #[must_use]
    pub fn principal_address(&self, customer_id: CustomerId) -> Option<&Address> {
        self.store
            .addresses()
            .find(|a| a.customer_id == customer_id && a.principal)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Serialize-ready copy of every table.
    #[must_use]
    pub fn export_snapshot(&self) -> Snapshot {
        self.store.export_snapshot()
    }

    /// Replace every table with the snapshot's contents.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Snapshot`] if the document is inconsistent; the
    /// store is left untouched in that case.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> Result<ImportReport, ServiceError> {
        Ok(self.store.import_snapshot(snapshot)?)
    }

    fn demote(&mut self, ids: &[AddressId]) -> Result<(), StoreError> {
        for &id in ids {
            self.store
                .addresses_mut()
                .update(id, |address| address.principal = false)?;
            debug!(address_id = %id, "Principal flag removed");
        }
        Ok(())
    }
}

/// Map a uniqueness violation onto a service-level error.
fn on_duplicate(err: StoreError, conflict: impl FnOnce() -> ServiceError) -> ServiceError {
    match err {
        StoreError::DuplicateKey { .. } => conflict(),
        other => ServiceError::Store(other),
    }
}

fn log_override(requested: bool, granted: bool) {
    if requested != granted {
        debug!(requested, granted, "Principal request overridden");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn customer_fields(cpf: &str) -> CustomerFields {
        CustomerFields {
            name: "João da Silva".to_owned(),
            cpf: cpf.to_owned(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            phone: "(11) 1111-1111".to_owned(),
            mobile: "(11) 99999-9999".to_owned(),
        }
    }

    fn address_fields(street: &str) -> AddressFields {
        AddressFields {
            postal_code: "12345-678".to_owned(),
            street: street.to_owned(),
            neighborhood: "Bairro B".to_owned(),
            city: "Cidade C".to_owned(),
            state: "Estado D".to_owned(),
            country: "Brasil".to_owned(),
        }
    }

    fn flags(registry: &Registry, customer: CustomerId) -> Vec<(i32, bool)> {
        registry
            .list_addresses(customer)
            .iter()
            .map(|a| (a.id.as_i32(), a.principal))
            .collect()
    }

    #[test]
    fn test_register_user_and_login() {
        let mut registry = Registry::new();
        let id = registry
            .register_user("Administrador", "admin", "123456")
            .unwrap();

        assert_eq!(registry.login("admin", "123456").unwrap().id, id);
        assert!(registry.login("admin", "wrong").is_none());
        assert!(registry.login("nobody", "123456").is_none());
    }

    #[test]
    fn test_duplicate_username_is_rejected() {
        let mut registry = Registry::new();
        registry.register_user("Ana", "ana", "pw").unwrap();

        let err = registry.register_user("Outra Ana", " ana ", "pw2").unwrap_err();
        assert!(matches!(err, ServiceError::UsernameTaken));
        assert_eq!(registry.store().users().len(), 1);
    }

    #[test]
    fn test_register_user_requires_all_fields() {
        let mut registry = Registry::new();
        let err = registry.register_user("", "ana", " ").unwrap_err();

        let ServiceError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.contains("nome"));
        assert!(errors.contains("senha"));
        assert!(!errors.contains("usuario"));
    }

    #[test]
    fn test_register_customer_normalizes_cpf() {
        let mut registry = Registry::new();
        let id = registry
            .register_customer(&customer_fields("11111111111"))
            .unwrap();

        assert_eq!(
            registry.get_customer(id).unwrap().cpf.as_str(),
            "111.111.111-11"
        );
    }

    #[test]
    fn test_update_customer_keeps_own_cpf() {
        let mut registry = Registry::new();
        let id = registry
            .register_customer(&customer_fields("111.111.111-11"))
            .unwrap();

        let mut fields = customer_fields("111.111.111-11");
        fields.name = "João Silva".to_owned();
        registry.update_customer(id, &fields).unwrap();

        assert_eq!(registry.get_customer(id).unwrap().name, "João Silva");
    }

    #[test]
    fn test_update_customer_rejects_other_cpf() {
        let mut registry = Registry::new();
        registry
            .register_customer(&customer_fields("111.111.111-11"))
            .unwrap();
        let second = registry
            .register_customer(&customer_fields("222.222.222-22"))
            .unwrap();

        let err = registry
            .update_customer(second, &customer_fields("111.111.111-11"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::CpfTaken(_)));
        assert_eq!(
            registry.get_customer(second).unwrap().cpf.as_str(),
            "222.222.222-22"
        );
    }

    #[test]
    fn test_update_missing_customer() {
        let mut registry = Registry::new();
        let err = registry
            .update_customer(CustomerId::new(99), &customer_fields("111.111.111-11"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_save_customer_follows_session() {
        let mut registry = Registry::new();
        let id = registry
            .save_customer(CustomerSession::New, &customer_fields("111.111.111-11"))
            .unwrap();

        let mut fields = customer_fields("111.111.111-11");
        fields.mobile = "(21) 98888-7777".to_owned();
        let same = registry
            .save_customer(CustomerSession::Editing(id), &fields)
            .unwrap();

        assert_eq!(same, id);
        assert_eq!(registry.list_customers().len(), 1);
        assert_eq!(registry.get_customer(id).unwrap().mobile, "(21) 98888-7777");
    }

    #[test]
    fn test_delete_customer_cascades_to_addresses() {
        let mut registry = Registry::new();
        let keep = registry
            .register_customer(&customer_fields("111.111.111-11"))
            .unwrap();
        let gone = registry
            .register_customer(&customer_fields("222.222.222-22"))
            .unwrap();
        registry
            .create_address(keep, &address_fields("Rua A"), true)
            .unwrap();
        registry
            .create_address(gone, &address_fields("Rua B"), true)
            .unwrap();
        registry
            .create_address(gone, &address_fields("Rua C"), false)
            .unwrap();

        assert!(registry.delete_customer(gone, &|_: &str| true).unwrap());

        assert!(registry.get_customer(gone).is_none());
        assert!(registry.list_addresses(gone).is_empty());
        assert_eq!(registry.store().addresses().len(), 1);
    }

    #[test]
    fn test_declined_delete_changes_nothing() {
        let mut registry = Registry::new();
        let id = registry
            .register_customer(&customer_fields("111.111.111-11"))
            .unwrap();

        let asked = std::cell::Cell::new(false);
        let decline = |prompt: &str| {
            asked.set(prompt.contains("João da Silva"));
            false
        };

        assert!(!registry.delete_customer(id, &decline).unwrap());
        assert!(asked.get());
        assert!(registry.get_customer(id).is_some());
    }

    #[test]
    fn test_delete_missing_customer_does_not_ask() {
        let mut registry = Registry::new();
        let err = registry
            .delete_customer(CustomerId::new(5), &|_: &str| -> bool { panic!("must not ask") })
            .unwrap_err();
        assert!(matches!(err, ServiceError::CustomerNotFound(_)));
    }

    #[test]
    fn test_discard_incomplete_customer() {
        let mut registry = Registry::new();
        let pending = registry
            .register_customer(&customer_fields("111.111.111-11"))
            .unwrap();
        let complete = registry
            .register_customer(&customer_fields("222.222.222-22"))
            .unwrap();
        registry
            .create_address(complete, &address_fields("Rua A"), false)
            .unwrap();

        assert!(registry.discard_incomplete_customer(pending).unwrap());
        assert!(!registry.discard_incomplete_customer(complete).unwrap());
        assert!(registry.get_customer(pending).is_none());
        assert!(registry.get_customer(complete).is_some());
    }

    #[test]
    fn test_address_lifecycle_keeps_one_principal() {
        let mut registry = Registry::new();
        let customer = registry
            .register_customer(&customer_fields("111.111.111-11"))
            .unwrap();

        let a1 = registry
            .create_address(customer, &address_fields("Rua A"), false)
            .unwrap();
        let a2 = registry
            .create_address(customer, &address_fields("Rua B"), false)
            .unwrap();
        assert_eq!(flags(&registry, customer), [(1, true), (2, false)]);

        registry
            .update_address(a2, &address_fields("Rua B"), true)
            .unwrap();
        assert_eq!(flags(&registry, customer), [(1, false), (2, true)]);

        registry
            .update_address(a2, &address_fields("Rua B"), false)
            .unwrap();
        assert_eq!(flags(&registry, customer), [(1, false), (2, true)]);

        assert_eq!(registry.delete_address(a2).unwrap(), Some(a1));
        assert_eq!(flags(&registry, customer), [(1, true)]);
    }

    #[test]
    fn test_create_address_for_missing_customer() {
        let mut registry = Registry::new();
        let err = registry
            .create_address(CustomerId::new(3), &address_fields("Rua A"), true)
            .unwrap_err();
        assert!(matches!(err, ServiceError::CustomerNotFound(_)));
        assert!(registry.store().addresses().is_empty());
    }

    #[test]
    fn test_invalid_address_is_not_stored() {
        let mut registry = Registry::new();
        let customer = registry
            .register_customer(&customer_fields("111.111.111-11"))
            .unwrap();
        let mut fields = address_fields("Rua A");
        fields.postal_code = "123".to_owned();

        let err = registry.create_address(customer, &fields, true).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(registry.list_addresses(customer).is_empty());
    }

    #[test]
    fn test_missing_address_operations() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.delete_address(AddressId::new(1)),
            Err(ServiceError::AddressNotFound(_))
        ));
        assert!(matches!(
            registry.update_address(AddressId::new(1), &address_fields("Rua A"), true),
            Err(ServiceError::AddressNotFound(_))
        ));
    }

    #[test]
    fn test_save_address_follows_session() {
        let mut registry = Registry::new();
        let customer = registry
            .register_customer(&customer_fields("111.111.111-11"))
            .unwrap();

        let id = registry
            .save_address(AddressSession::New(customer), &address_fields("Rua A"), false)
            .unwrap();
        registry
            .save_address(AddressSession::Editing(id), &address_fields("Rua Nova"), false)
            .unwrap();

        let address = registry.principal_address(customer).unwrap();
        assert_eq!(address.id, id);
        assert_eq!(address.street, "Rua Nova");
    }
}
