//! Domain records held by the store.
//!
//! Field names serialize to the localized names used by snapshot documents
//! (`nome`, `cpf`, `dataNascimento`, `clienteId`, ...).

pub mod address;
pub mod customer;
pub mod user;

pub use address::{Address, AddressFields};
pub use customer::{Customer, CustomerFields};
pub use user::User;
