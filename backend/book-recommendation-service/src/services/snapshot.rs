use crate::config::ModelConfig;
use crate::error::Result;
use crate::services::recommender::RecommendationModel;
use crate::services::store::RatingStore;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Shared handle to the current model
///
/// Readers take an `Arc` snapshot and query it without holding the lock.
/// A rebuild constructs the new model first and then swaps the pointer, so
/// in-flight queries keep using the model they started with.
pub struct ModelHandle {
    current: RwLock<Arc<RecommendationModel>>,
}

impl ModelHandle {
    pub fn new(model: RecommendationModel) -> Self {
        Self {
            current: RwLock::new(Arc::new(model)),
        }
    }

    pub fn snapshot(&self) -> Arc<RecommendationModel> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install `model` and return the one it replaced
    pub fn replace(&self, model: RecommendationModel) -> Arc<RecommendationModel> {
        let next = Arc::new(model);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Build from `store` and swap in on success. On error the current
    /// model stays in place.
    pub fn rebuild(&self, store: RatingStore, config: &ModelConfig) -> Result<()> {
        let model = RecommendationModel::build(store, config)?;
        let users = model.list_available_users().len();
        self.replace(model);
        info!(users, "Swapped in rebuilt recommendation model");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, ItemId, Rating, RecommendOutcome, UserId};

    fn config() -> ModelConfig {
        ModelConfig {
            min_user_ratings: 1,
            min_item_ratings: 1,
            n_components: 1,
            ..Default::default()
        }
    }

    fn store(extra_user: Option<&str>) -> RatingStore {
        let mut ratings = vec![
            Rating::new("1", "B1", 8.0),
            Rating::new("2", "B1", 7.0),
            Rating::new("2", "B2", 9.0),
        ];
        if let Some(user) = extra_user {
            ratings.push(Rating::new(user, "B2", 6.0));
        }
        let books = vec![
            Book {
                item_id: ItemId::from("B1"),
                title: "One".to_string(),
                author: "A".to_string(),
            },
            Book {
                item_id: ItemId::from("B2"),
                title: "Two".to_string(),
                author: "B".to_string(),
            },
        ];
        RatingStore::new(ratings, books)
    }

    #[test]
    fn test_snapshot_survives_swap() {
        let handle = ModelHandle::new(RecommendationModel::build(store(None), &config()).unwrap());
        let before = handle.snapshot();

        handle.rebuild(store(Some("3")), &config()).unwrap();
        let after = handle.snapshot();

        assert_eq!(before.list_available_users().len(), 2);
        assert_eq!(after.list_available_users().len(), 3);
        assert_eq!(
            before.recommend(&UserId::from("3")),
            RecommendOutcome::NotFound
        );
    }

    #[test]
    fn test_failed_rebuild_keeps_current_model() {
        let handle = ModelHandle::new(RecommendationModel::build(store(None), &config()).unwrap());

        let infeasible = ModelConfig {
            n_components: 10,
            ..config()
        };
        assert!(handle.rebuild(store(Some("3")), &infeasible).is_err());
        assert_eq!(handle.snapshot().list_available_users().len(), 2);
    }

    #[test]
    fn test_replace_returns_previous() {
        let first = RecommendationModel::build(store(None), &config()).unwrap();
        let handle = ModelHandle::new(first);

        let second = RecommendationModel::build(store(Some("3")), &config()).unwrap();
        let previous = handle.replace(second);

        assert_eq!(previous.list_available_users().len(), 2);
        assert_eq!(handle.snapshot().list_available_users().len(), 3);
    }
}
