//! Core types for Cadastro.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cpf;
pub mod id;

pub use cpf::Cpf;
pub use id::*;
