//! Subcommand implementations.
//!
//! Each command runs against an already loaded [`Registry`](cadastro_core::Registry)
//! and reports whether it changed anything, so the caller knows when to write
//! the data file back.

pub mod address;
pub mod customer;
pub mod snapshot;
pub mod user;

use cadastro_core::{FieldKind, Notice};

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub notice: Option<Notice>,
    /// Whether the registry must be saved.
    pub mutated: bool,
}

impl Outcome {
    /// A command that only read from the registry.
    pub const fn read_only() -> Self {
        Self {
            notice: None,
            mutated: false,
        }
    }

    pub const fn changed(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            mutated: true,
        }
    }

    pub const fn unchanged(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            mutated: false,
        }
    }
}

/// Apply the field's input mask when the user typed bare digits.
///
/// Anything else is passed through so validation can report it as typed.
pub fn masked(kind: FieldKind, raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        kind.mask(trimmed)
    } else {
        trimmed.to_owned()
    }
}
