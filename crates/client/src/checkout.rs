//! Checkout: turn the cart into library rows without ever duplicating one.
//!
//! The backend has no unique constraint on (`user_id`, `livro_id`), so the
//! reconciler enforces the "one library row per book" rule client-side: it
//! fetches what the user already owns, inserts only the difference, and
//! reports what was skipped.

use std::collections::HashSet;

use tracing::{info, instrument};

use livraria_core::{BookId, UserId};

use crate::models::NewPurchase;
use crate::stores::CartStore;
use crate::supabase::rows::{NewPurchaseRow, OwnedBookRow};
use crate::supabase::{Returning, SupabaseClient, SupabaseError};

/// The purchase operations the reconciler needs from the backend.
pub trait PurchaseGateway {
    /// The ids of every book already in the user's library.
    fn owned_book_ids(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<HashSet<BookId>, SupabaseError>> + Send;

    /// Insert the given purchases as one batch. All-or-nothing.
    fn insert_purchases(
        &self,
        purchases: &[NewPurchase],
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;
}

impl PurchaseGateway for SupabaseClient {
    async fn owned_book_ids(&self, user_id: UserId) -> Result<HashSet<BookId>, SupabaseError> {
        let rows: Vec<OwnedBookRow> = self
            .from("minha_biblioteca")
            .select("livro_id")
            .eq("user_id", user_id)
            .fetch()
            .await?;
        Ok(rows.into_iter().map(|r| BookId::new(r.livro_id)).collect())
    }

    async fn insert_purchases(&self, purchases: &[NewPurchase]) -> Result<(), SupabaseError> {
        let rows: Vec<NewPurchaseRow> = purchases.iter().map(NewPurchase::to_row).collect();
        self.insert("minha_biblioteca", &rows, Returning::Minimal)
            .await
    }
}

/// What a checkout attempt accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The cart was already empty; nothing was fetched or written.
    NothingToBuy,
    /// Every cart item was already owned. The cart was cleared.
    AlreadyOwned {
        /// How many items were skipped.
        skipped: usize,
    },
    /// At least one new book was added to the library. The cart was cleared.
    Purchased {
        /// The ids actually inserted, in cart order.
        newly_added: Vec<BookId>,
        /// How many cart entries were skipped as already owned.
        already_owned: usize,
    },
}

/// Why a checkout attempt failed. The cart is untouched in every case.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Gateway(#[from] SupabaseError),
}

/// Runs the purchase flow for one user against one cart.
///
/// Borrowing the gateway keeps the reconciler cheap to construct per
/// checkout attempt.
#[derive(Debug)]
pub struct CheckoutReconciler<'a, G> {
    gateway: &'a G,
}

impl<'a, G: PurchaseGateway> CheckoutReconciler<'a, G> {
    pub const fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Reconcile the cart against the user's library and insert what is
    /// genuinely new.
    ///
    /// An empty cart short-circuits before any network traffic. Cart
    /// entries whose book is already owned are skipped, as is any repeat
    /// of an id earlier in the same cart. The cart is cleared exactly when
    /// the outcome is settled: after a successful insert, or when there was
    /// nothing new to insert. On error the cart keeps its items so the
    /// user can retry.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::Gateway`] when the ownership fetch or the batch
    /// insert fails.
    #[instrument(skip(self, cart), fields(user_id = %user_id, cart_len = cart.len()))]
    pub async fn checkout(
        &self,
        user_id: UserId,
        cart: &mut CartStore,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if cart.is_empty() {
            return Ok(CheckoutOutcome::NothingToBuy);
        }

        let owned = self.gateway.owned_book_ids(user_id).await?;

        let mut to_insert: Vec<BookId> = Vec::new();
        let mut already_owned = 0_usize;
        for item in cart.items() {
            if owned.contains(&item.id) || to_insert.contains(&item.id) {
                already_owned += 1;
            } else {
                to_insert.push(item.id);
            }
        }

        if to_insert.is_empty() {
            info!(skipped = already_owned, "cart contained only owned books");
            cart.clear();
            return Ok(CheckoutOutcome::AlreadyOwned {
                skipped: already_owned,
            });
        }

        let purchases: Vec<NewPurchase> = to_insert
            .iter()
            .map(|&book_id| NewPurchase { user_id, book_id })
            .collect();
        self.gateway.insert_purchases(&purchases).await?;

        info!(
            purchased = to_insert.len(),
            skipped = already_owned,
            "checkout complete"
        );
        cart.clear();

        Ok(CheckoutOutcome::Purchased {
            newly_added: to_insert,
            already_owned,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use livraria_core::Price;

    use crate::stores::CartItem;

    use super::*;

    struct FakeGateway {
        owned: HashSet<BookId>,
        fetch_fails: bool,
        insert_fails: bool,
        inserted: Mutex<Vec<Vec<NewPurchase>>>,
    }

    impl FakeGateway {
        fn owning(ids: &[i64]) -> Self {
            Self {
                owned: ids.iter().map(|&id| BookId::new(id)).collect(),
                fetch_fails: false,
                insert_fails: false,
                inserted: Mutex::new(Vec::new()),
            }
        }

        fn insert_batches(&self) -> Vec<Vec<NewPurchase>> {
            self.inserted.lock().unwrap().clone()
        }
    }

    impl PurchaseGateway for FakeGateway {
        async fn owned_book_ids(&self, _user: UserId) -> Result<HashSet<BookId>, SupabaseError> {
            if self.fetch_fails {
                Err(SupabaseError::NotFound("library unreachable".to_string()))
            } else {
                Ok(self.owned.clone())
            }
        }

        async fn insert_purchases(&self, purchases: &[NewPurchase]) -> Result<(), SupabaseError> {
            if self.insert_fails {
                return Err(SupabaseError::Api {
                    status: 500,
                    message: "insert failed".to_string(),
                });
            }
            self.inserted.lock().unwrap().push(purchases.to_vec());
            Ok(())
        }
    }

    fn user() -> UserId {
        UserId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap()
    }

    fn item(id: i64, title: &str) -> CartItem {
        CartItem {
            id: BookId::new(id),
            title: title.to_string(),
            author: "Autora".to_string(),
            price: Price::from_centavos(1990).unwrap(),
            cover_url: None,
        }
    }

    #[tokio::test]
    async fn test_empty_cart_short_circuits() {
        let gateway = FakeGateway::owning(&[1]);
        let mut cart = CartStore::new();

        let outcome = CheckoutReconciler::new(&gateway)
            .checkout(user(), &mut cart)
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::NothingToBuy);
        assert!(gateway.insert_batches().is_empty());
    }

    #[tokio::test]
    async fn test_inserts_only_unowned_and_clears_cart() {
        let gateway = FakeGateway::owning(&[2]);
        let mut cart = CartStore::new();
        cart.add(item(1, "Dom Casmurro"));
        cart.add(item(2, "Quincas Borba"));

        let outcome = CheckoutReconciler::new(&gateway)
            .checkout(user(), &mut cart)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CheckoutOutcome::Purchased {
                newly_added: vec![BookId::new(1)],
                already_owned: 1,
            }
        );
        let batches = gateway.insert_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].book_id, BookId::new(1));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_all_owned_clears_without_insert() {
        let gateway = FakeGateway::owning(&[1]);
        let mut cart = CartStore::new();
        cart.add(item(1, "Dom Casmurro"));

        let outcome = CheckoutReconciler::new(&gateway)
            .checkout(user(), &mut cart)
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::AlreadyOwned { skipped: 1 });
        assert!(gateway.insert_batches().is_empty());
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_preserves_cart() {
        let mut gateway = FakeGateway::owning(&[]);
        gateway.insert_fails = true;
        let mut cart = CartStore::new();
        cart.add(item(1, "Dom Casmurro"));

        let err = CheckoutReconciler::new(&gateway)
            .checkout(user(), &mut cart)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Gateway(_)));
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_preserves_cart() {
        let mut gateway = FakeGateway::owning(&[]);
        gateway.fetch_fails = true;
        let mut cart = CartStore::new();
        cart.add(item(1, "Dom Casmurro"));

        let err = CheckoutReconciler::new(&gateway)
            .checkout(user(), &mut cart)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Gateway(_)));
        assert_eq!(cart.len(), 1);
    }
}
