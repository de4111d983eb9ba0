//! Purchase records and the orders view built on them.

use chrono::{DateTime, Utc};

use livraria_core::{BookId, Price, PurchaseId, UserId};

use crate::supabase::rows::{LibraryEntryRow, NewPurchaseRow};

use super::Book;

/// A purchase record about to be written, before the backend assigns an
/// id. The persisted rows in `minha_biblioteca` are the source of truth
/// for ownership; the client only ever reads them back joined with their
/// book ([`Order`]) or as a bare id set for the checkout reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPurchase {
    pub user_id: UserId,
    pub book_id: BookId,
}

impl NewPurchase {
    /// The wire row for the `minha_biblioteca` insert.
    #[must_use]
    pub fn to_row(&self) -> NewPurchaseRow {
        NewPurchaseRow {
            user_id: self.user_id.to_string(),
            livro_id: self.book_id.as_i64(),
        }
    }
}

/// One line of the "my orders" screen: a purchase joined with the book it
/// bought.
#[derive(Debug, Clone)]
pub struct Order {
    pub purchase_id: PurchaseId,
    pub purchased_at: Option<DateTime<Utc>>,
    pub book: Book,
}

impl Order {
    /// Convert a joined library row, dropping entries whose book has been
    /// deleted from the catalog.
    #[must_use]
    pub fn from_row(row: LibraryEntryRow) -> Option<Self> {
        let book = row.livros.map(Book::from)?;
        Some(Self {
            purchase_id: PurchaseId::new(row.id),
            purchased_at: row.created_at,
            book,
        })
    }

    /// Price paid, as recorded on the catalog row.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.book.price
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::supabase::rows::BookRow;

    #[test]
    fn test_new_purchase_row() {
        let purchase = NewPurchase {
            user_id: UserId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            book_id: BookId::new(9),
        };
        let row = purchase.to_row();
        assert_eq!(row.user_id, "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(row.livro_id, 9);
    }

    #[test]
    fn test_order_drops_deleted_book() {
        let row = LibraryEntryRow {
            id: 1,
            created_at: None,
            livros: None,
        };
        assert!(Order::from_row(row).is_none());
    }

    #[test]
    fn test_order_from_joined_row() {
        let row = LibraryEntryRow {
            id: 3,
            created_at: None,
            livros: Some(BookRow {
                id: 7,
                titulo: Some("Quincas Borba".to_string()),
                autor: None,
                genero: None,
                editora: None,
                sinopse: None,
                ano: None,
                paginas: None,
                preco: Some(10.0),
                capa_url: None,
                pdf_url: None,
                autor_id: None,
                created_at: None,
            }),
        };

        let order = Order::from_row(row).unwrap();
        assert_eq!(order.purchase_id, PurchaseId::new(3));
        assert_eq!(order.book.id, BookId::new(7));
    }
}
