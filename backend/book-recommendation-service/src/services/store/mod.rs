// ============================================
// Rating Store
// ============================================
// Raw (user, item, rating) triples in input order plus the book catalog.
// Immutable once built; the catalog is the right-hand side of the
// recommendation join.

pub mod loader;

use crate::config::DataConfig;
use crate::error::Result;
use crate::models::{Book, ItemId, Rating};
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    ratings: Vec<Rating>,
    catalog: HashMap<ItemId, Book>,
}

impl RatingStore {
    /// Build a store; when the catalog repeats an ISBN the first row is kept.
    pub fn new(ratings: Vec<Rating>, books: Vec<Book>) -> Self {
        let mut catalog: HashMap<ItemId, Book> = HashMap::with_capacity(books.len());
        let mut duplicates = 0usize;

        for book in books {
            if catalog.contains_key(&book.item_id) {
                duplicates += 1;
                continue;
            }
            catalog.insert(book.item_id.clone(), book);
        }

        if duplicates > 0 {
            warn!(duplicates, "Book catalog contains repeated ISBNs, keeping first rows");
        }

        Self { ratings, catalog }
    }

    /// Load both CSV sources named by `config`
    pub fn from_csv(config: &DataConfig) -> Result<Self> {
        let delimiter = config.delimiter_byte()?;
        let ratings = loader::load_ratings(&config.ratings_path, delimiter)?;
        let books = loader::load_books(&config.books_path, delimiter)?;

        info!(
            ratings = ratings.len(),
            books = books.len(),
            "Loaded rating store from {} and {}",
            config.ratings_path,
            config.books_path
        );

        Ok(Self::new(ratings, books))
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn book(&self, item_id: &ItemId) -> Option<&Book> {
        self.catalog.get(item_id)
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(isbn: &str, title: &str) -> Book {
        Book {
            item_id: ItemId::from(isbn),
            title: title.to_string(),
            author: "Anon".to_string(),
        }
    }

    #[test]
    fn test_first_catalog_row_wins() {
        let store = RatingStore::new(
            vec![Rating::new("1", "B1", 8.0)],
            vec![book("B1", "First"), book("B2", "Other"), book("B1", "Second")],
        );

        assert_eq!(store.catalog_len(), 2);
        assert_eq!(store.book(&ItemId::from("B1")).unwrap().title, "First");
        assert!(store.book(&ItemId::from("B9")).is_none());
    }

    #[test]
    fn test_ratings_keep_input_order() {
        let ratings = vec![
            Rating::new("2", "B1", 1.0),
            Rating::new("1", "B2", 2.0),
            Rating::new("2", "B3", 3.0),
        ];
        let store = RatingStore::new(ratings.clone(), Vec::new());

        assert_eq!(store.ratings(), ratings.as_slice());
    }
}
