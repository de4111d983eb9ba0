//! Livraria application library.
//!
//! Everything the screens need, minus the screens themselves:
//!
//! - [`config`] - environment-driven configuration
//! - [`supabase`] - the hosted-backend gateway (GoTrue auth, PostgREST
//!   tables, object storage)
//! - [`models`] - domain types built from raw backend rows, with unknown
//!   or missing fields normalized to documented defaults
//! - [`stores`] - the in-memory session and cart state, one instance per
//!   running app
//! - [`checkout`] - the purchase reconciler that cross-references the cart
//!   against existing ownership before writing anything
//! - [`services`] - registration, catalog reads, publishing, avatar upload
//!
//! # Concurrency model
//!
//! Store mutation is single-threaded by construction: the stores are plain
//! `&mut self` values owned by the presentation layer, and no store method
//! awaits mid-mutation. Gateway calls are async and suspend only their
//! caller.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod models;
pub mod services;
pub mod stores;
pub mod supabase;

pub use checkout::{CheckoutError, CheckoutOutcome, CheckoutReconciler, PurchaseGateway};
pub use config::{Config, ConfigError};
pub use stores::{CartItem, CartStore, SessionStore};
pub use supabase::{AuthError, SupabaseClient, SupabaseError};
