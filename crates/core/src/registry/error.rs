//! Service error types.

use thiserror::Error;

use crate::snapshot::SnapshotError;
use crate::store::StoreError;
use crate::types::{AddressId, Cpf, CustomerId};
use crate::validation::ValidationErrors;

/// Errors surfaced by registry operations.
///
/// None of these are fatal; each maps onto a user-visible
/// [`Notice`](crate::notice::Notice).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Username already registered.
    #[error("User already exists")]
    UsernameTaken,

    /// CPF already registered to another customer.
    #[error("CPF already registered: {0}")]
    CpfTaken(Cpf),

    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Address not found: {0}")]
    AddressNotFound(AddressId),

    /// One or more input fields are invalid.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Snapshot document could not be imported.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl ServiceError {
    /// Whether the error refers to a missing record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CustomerNotFound(_)
                | Self::AddressNotFound(_)
                | Self::Store(StoreError::NotFound { .. })
        )
    }
}
