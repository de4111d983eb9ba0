//! Domain types built from raw backend rows.
//!
//! Conversions live next to the types. External data is never trusted
//! unchecked: unknown roles become `Reader`, missing progress becomes 0,
//! malformed prices become free-with-a-warning.

pub mod book;
pub mod purchase;
pub mod user;

pub use book::Book;
pub use purchase::{NewPurchase, Order};
pub use user::{Avatar, User, UserPatch};
