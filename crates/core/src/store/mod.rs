//! In-memory record store.
//!
//! # Tables
//!
//! - `usuarios` - Users who can sign in (unique `usuario`)
//! - `clientes` - Customers (unique `cpf`)
//! - `enderecos` - Customer addresses
//!
//! The store is the single owner of every record. Callers read through shared
//! references and mutate only through the registry services, which keep the
//! primary-address invariant intact. The store itself enforces identity and
//! uniqueness, nothing more.

pub mod table;

use core::fmt;

use thiserror::Error;

use crate::models::{Address, Customer, User};

pub use table::{Record, Table, UniqueKey};

/// Names of the store's tables, as they appear in snapshot documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    Users,
    Customers,
    Addresses,
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Users => write!(f, "usuarios"),
            Self::Customers => write!(f, "clientes"),
            Self::Addresses => write!(f, "enderecos"),
        }
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Unique constraint violation (username, CPF).
    #[error("duplicate {field} in {table}: {value}")]
    DuplicateKey {
        table: TableName,
        field: &'static str,
        value: String,
    },

    /// No row with the requested id.
    #[error("{table} record {id} not found")]
    NotFound { table: TableName, id: i32 },

    /// Two rows would share an identity.
    #[error("duplicate id in {table}: {id}")]
    DuplicateId { table: TableName, id: i32 },

    /// Every identity value has been handed out.
    #[error("no identity values left in {table}")]
    IdExhausted { table: TableName },
}

/// The three tables backing the registry.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    users: Table<User>,
    customers: Table<Customer>,
    addresses: Table<Address>,
}

impl RecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn users(&self) -> &Table<User> {
        &self.users
    }

    pub const fn users_mut(&mut self) -> &mut Table<User> {
        &mut self.users
    }

    #[must_use]
    pub const fn customers(&self) -> &Table<Customer> {
        &self.customers
    }

    pub const fn customers_mut(&mut self) -> &mut Table<Customer> {
        &mut self.customers
    }

    #[must_use]
    pub const fn addresses(&self) -> &Table<Address> {
        &self.addresses
    }

    pub const fn addresses_mut(&mut self) -> &mut Table<Address> {
        &mut self.addresses
    }

    /// Whether all three tables are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.customers.is_empty() && self.addresses.is_empty()
    }

    /// Replace every table at once.
    pub(crate) fn replace(
        &mut self,
        users: Table<User>,
        customers: Table<Customer>,
        addresses: Table<Address>,
    ) {
        self.users = users;
        self.customers = customers;
        self.addresses = addresses;
    }
}
