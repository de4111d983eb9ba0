//! In-memory application state.
//!
//! One [`SessionStore`] and one [`CartStore`] exist per running app,
//! owned by the presentation layer and passed by reference to whatever
//! consumes them. Neither survives a process restart, by design.

pub mod cart;
pub mod session;

pub use cart::{CartItem, CartStore};
pub use session::{SessionGateway, SessionStore};
