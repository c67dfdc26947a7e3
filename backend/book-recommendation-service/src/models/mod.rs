use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// User identifier as it appears in the `User-ID` column.
///
/// Ids are opaque strings, ordered "naturally": integer-like ids sort
/// numerically and come before any non-numeric id, which sort lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<i128> {
        self.0.parse().ok()
    }
}

impl Ord for UserId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for UserId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Book identifier (ISBN), ordered lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub value: f64,
}

impl Rating {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, value: f64) -> Self {
        Self {
            user_id: UserId::new(user_id),
            item_id: ItemId::new(item_id),
            value,
        }
    }
}

/// Catalog entry joined to ratings on `item_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub item_id: ItemId,
    pub title: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookRecommendation {
    pub title: String,
    pub author: String,
}

impl From<&Book> for BookRecommendation {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

/// Result of a single recommendation query.
///
/// Neither `NotFound` nor `Empty` is an error: the caller branches on them.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendOutcome {
    /// User is not a row of the filtered interaction matrix
    NotFound,
    /// User exists but the neighbors have no unseen, cataloged books
    Empty,
    Recommendations(Vec<BookRecommendation>),
}

impl RecommendOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendOutcome::NotFound => "not_found",
            RecommendOutcome::Empty => "empty",
            RecommendOutcome::Recommendations(_) => "recommendations",
        }
    }

    pub fn books(&self) -> &[BookRecommendation] {
        match self {
            RecommendOutcome::Recommendations(books) => books,
            _ => &[],
        }
    }
}

/// Neighbor of a user in latent space
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarUser {
    pub user_id: UserId,
    pub row: usize,
    pub similarity: f64,
}

/// How candidate books gathered from neighbors are ordered before truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrdering {
    /// First occurrence in the filtered ratings, in input order
    #[default]
    EncounterOrder,
    /// Summed neighbor rating, descending; ties keep encounter order
    AggregateRating,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_natural_order() {
        let mut ids: Vec<UserId> = ["276847", "9", "bob", "10", "alice", "0100"]
            .iter()
            .map(|s| UserId::from(*s))
            .collect();
        ids.sort();

        let ordered: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(ordered, vec!["9", "10", "0100", "276847", "alice", "bob"]);
    }

    #[test]
    fn test_user_id_equal_numeric_values_are_distinct() {
        let a = UserId::from("7");
        let b = UserId::from("007");

        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_ids_are_trimmed() {
        assert_eq!(UserId::new(" 42 "), UserId::from("42"));
        assert_eq!(ItemId::new("0195153448 ").as_str(), "0195153448");
    }

    #[test]
    fn test_item_id_lexical_order() {
        let mut ids = vec![ItemId::from("B3"), ItemId::from("B10"), ItemId::from("A1")];
        ids.sort();
        assert_eq!(
            ids,
            vec![ItemId::from("A1"), ItemId::from("B10"), ItemId::from("B3")]
        );
    }

    #[test]
    fn test_outcome_books() {
        let book = BookRecommendation {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
        };

        assert!(RecommendOutcome::NotFound.books().is_empty());
        assert!(RecommendOutcome::Empty.books().is_empty());
        assert_eq!(
            RecommendOutcome::Recommendations(vec![book.clone()]).books(),
            &[book]
        );
        assert_eq!(RecommendOutcome::Empty.as_str(), "empty");
    }
}
