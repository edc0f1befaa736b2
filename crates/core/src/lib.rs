//! Cadastro Core - customer and address registry.
//!
//! This crate holds everything the front ends share:
//! - [`store`] - In-memory tables with auto-increment identity and unique keys
//! - [`principal`] - The primary-address invariant engine
//! - [`registry`] - User, customer and address services
//! - [`snapshot`] - JSON export and import of the whole store
//! - [`validation`] - Field formats and input masks
//! - [`notice`] - User-visible outcome messages
//!
//! # Architecture
//!
//! The core performs no I/O. Snapshots are produced and consumed as values or
//! strings; reading and writing files is left to the front end.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod notice;
pub mod principal;
pub mod registry;
pub mod seed;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod validation;

pub use models::{Address, AddressFields, Customer, CustomerFields, User};
pub use notice::{Notice, NoticeLevel};
pub use registry::{AddressSession, Confirm, CustomerSession, Registry, ServiceError};
pub use snapshot::{ImportReport, NextIds, Snapshot, SnapshotError};
pub use store::{RecordStore, StoreError};
pub use types::*;
pub use validation::{FieldError, FieldKind, ValidationErrors};
