//! Newtype IDs for type-safe entity references.
//!
//! Supabase hands us two id shapes: auth users are keyed by UUID, while
//! ordinary table rows (`livros`, `minha_biblioteca`) use bigint primary
//! keys. The `define_row_id!` macro covers the latter; [`UserId`] wraps a
//! UUID directly.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a type-safe ID wrapper around an `i64` row key.
///
/// Creates a newtype with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use livraria_core::define_row_id;
/// define_row_id!(BookId);
/// define_row_id!(PurchaseId);
///
/// let book_id = BookId::new(1);
/// let purchase_id = PurchaseId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: BookId = purchase_id;
/// ```
#[macro_export]
macro_rules! define_row_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_row_id!(BookId);
define_row_id!(PurchaseId);

/// Identifier for an authenticated user (a Supabase auth UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a user id from its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns `uuid::Error` if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    define_row_id!(TestId);

    #[test]
    fn test_row_id_roundtrip() {
        let id = TestId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(TestId::from(42), id);
    }

    #[test]
    fn test_row_id_serde_transparent() {
        let id = BookId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: BookId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_user_id_parse() {
        let id = UserId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        assert!(UserId::parse("not-a-uuid").is_err());
    }
}
