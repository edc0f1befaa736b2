//! JSON snapshot export and import.
//!
//! A snapshot is the whole store serialized as one document:
//!
//! ```json
//! {
//!   "usuarios": [{ "id": 1, "nome": "...", "usuario": "...", "senha": "..." }],
//!   "clientes": [{ "id": 1, "nome": "...", "cpf": "...", "dataNascimento": "1990-01-01",
//!                  "telefone": "...", "celular": "..." }],
//!   "enderecos": [{ "id": 1, "clienteId": 1, "cep": "...", "rua": "...", "bairro": "...",
//!                   "cidade": "...", "estado": "...", "pais": "...", "principal": true }],
//!   "proximosIds": { "usuarios": 2, "clientes": 2, "enderecos": 2 }
//! }
//! ```
//!
//! `proximosIds` carries the identity counters so a store rebuilt from its own
//! export never reissues the id of a deleted record. Documents without it are
//! accepted; the counters then resume after the highest id present.
//!
//! Imports are parse-then-apply: the new tables are fully built before the old
//! ones are replaced, so a rejected document leaves the store untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Address, Customer, User};
use crate::principal::{self, FlagChange};
use crate::store::{RecordStore, StoreError, Table};
use crate::types::AddressId;

/// Errors that can occur while reading or applying a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The document is not valid JSON or does not have the snapshot shape.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Records in the document conflict with each other.
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(#[from] StoreError),
}

/// Every table of the store, records in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "usuarios", default)]
    pub users: Vec<User>,
    #[serde(rename = "clientes", default)]
    pub customers: Vec<Customer>,
    #[serde(rename = "enderecos", default)]
    pub addresses: Vec<Address>,
    #[serde(rename = "proximosIds", default, skip_serializing_if = "Option::is_none")]
    pub next_ids: Option<NextIds>,
}

/// Next identity of each table at export time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextIds {
    #[serde(rename = "usuarios")]
    pub users: i64,
    #[serde(rename = "clientes")]
    pub customers: i64,
    #[serde(rename = "enderecos")]
    pub addresses: i64,
}

impl Snapshot {
    /// File name used for exported snapshots.
    pub const DEFAULT_FILE_NAME: &'static str = "banco.json";

    /// Parse a snapshot document.
    ///
    /// Missing collections are treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] for invalid JSON or wrong shape.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of records across all collections.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.users.len() + self.customers.len() + self.addresses.len()
    }
}

/// What an import loaded and fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub users: usize,
    pub customers: usize,
    pub addresses: usize,
    /// Principal flags changed to restore the one-principal-per-customer rule.
    pub repaired: Vec<FlagChange>,
    /// Addresses whose customer is not in the document. They are kept.
    pub orphaned: Vec<AddressId>,
}

impl RecordStore {
    /// Copy every table into a snapshot.
    #[must_use]
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.users().iter().cloned().collect(),
            customers: self.customers().iter().cloned().collect(),
            addresses: self.addresses().iter().cloned().collect(),
            next_ids: Some(NextIds {
                users: self.users().next_id(),
                customers: self.customers().next_id(),
                addresses: self.addresses().next_id(),
            }),
        }
    }

    /// Replace every table with the snapshot's records, keeping their ids.
    ///
    /// After loading, principal flags are repaired per customer. Identity
    /// counters never move backwards and never fall below the document's
    /// `proximosIds`, so ids handed out before the export or the import are
    /// not reused.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Inconsistent`] for duplicate ids or duplicate
    /// unique keys within a collection. The store is unchanged on error.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> Result<ImportReport, SnapshotError> {
        let floors = snapshot.next_ids.unwrap_or_default();
        let users = Table::load(snapshot.users, self.users().next_id().max(floors.users))?;
        let customers = Table::load(
            snapshot.customers,
            self.customers().next_id().max(floors.customers),
        )?;
        let mut addresses = Table::load(
            snapshot.addresses,
            self.addresses().next_id().max(floors.addresses),
        )?;

        let repaired = principal::repair(addresses.iter());
        for change in &repaired {
            addresses.update(change.address, |a| a.principal = change.principal)?;
            warn!(
                address_id = %change.address,
                principal = change.principal,
                "Repaired principal flag in imported snapshot"
            );
        }

        let orphaned: Vec<AddressId> = addresses
            .iter()
            .filter(|a| !customers.contains(a.customer_id))
            .map(|a| a.id)
            .collect();
        for id in &orphaned {
            warn!(address_id = %id, "Imported address references a missing customer");
        }

        let report = ImportReport {
            users: users.len(),
            customers: customers.len(),
            addresses: addresses.len(),
            repaired,
            orphaned,
        };
        self.replace(users, customers, addresses);

        info!(
            users = report.users,
            customers = report.customers,
            addresses = report.addresses,
            "Snapshot imported"
        );
        Ok(report)
    }
}
