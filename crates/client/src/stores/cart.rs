//! The shopping cart.

use tracing::debug;

use livraria_core::{BookId, Price};

use crate::models::Book;

/// An item in the cart: the display snapshot of a catalog book at the
/// moment it was added.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Price,
    pub cover_url: Option<String>,
}

impl CartItem {
    /// Snapshot a catalog book.
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            price: book.price,
            cover_url: book.cover_url.clone(),
        }
    }
}

/// The in-memory working set of items the user intends to buy.
///
/// ## Invariants
/// - No two items share an id, for any sequence of calls
/// - Insertion order is preserved for display
/// - The total is recomputed from the items on every read, never cached
///
/// Duplicate adds are signalled through the `bool` return, not an error:
/// whether and how to notify the user (the original screens alert unless a
/// "silent" flag is set) is the caller's decision.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    items: Vec<CartItem>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item unless one with the same id is already present.
    ///
    /// Returns `true` when the item was appended, `false` when it was
    /// already in the cart (the cart is left unchanged).
    pub fn add(&mut self, item: CartItem) -> bool {
        if self.contains(item.id) {
            debug!(book_id = %item.id, "item already in cart");
            return false;
        }

        debug!(book_id = %item.id, title = %item.title, "adding to cart");
        self.items.push(item);
        true
    }

    /// Remove the item with the given id, if present. Idempotent.
    pub fn remove(&mut self, id: BookId) {
        debug!(book_id = %id, "removing from cart");
        self.items.retain(|item| item.id != id);
    }

    /// Empty the cart unconditionally.
    pub fn clear(&mut self) {
        debug!("clearing cart");
        self.items.clear();
    }

    /// The items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether an item with this id is in the cart.
    #[must_use]
    pub fn contains(&self, id: BookId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the item prices, recomputed on every call so it can never
    /// drift from the item list.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(|item| item.price).sum()
    }
}
