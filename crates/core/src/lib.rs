//! Livraria Core - Shared domain types and validators.
//!
//! This crate provides common types used across all Livraria components:
//! - `client` - Application library (stores, checkout, Supabase gateway)
//! - `cli` - Interactive shell standing in for the mobile screens
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and fully testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles
//! - [`validate`] - Form validators (CPF, birth date, password strength)
//! - [`format`] - Input masks for user-entered strings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod format;
pub mod types;
pub mod validate;

pub use types::*;
pub use validate::{BirthDate, BirthDateError, Cpf, CpfError, PasswordStrength};
