//! Edit sessions and confirmation capabilities owned by the front end.
//!
//! The front end decides whether a form creates or edits a record and passes
//! that decision to the save operations explicitly.

use crate::types::{AddressId, CustomerId};

/// What a customer form is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomerSession {
    /// Registering a new customer.
    #[default]
    New,
    /// Editing an existing customer.
    Editing(CustomerId),
}

/// What an address form is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSession {
    /// Adding an address to the given customer.
    New(CustomerId),
    /// Editing an existing address.
    Editing(AddressId),
}

/// Asks the user to confirm a destructive operation.
pub trait Confirm {
    /// Returns `true` if the user accepted `prompt`.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
