use crate::config::ModelConfig;
use crate::models::{ItemId, Rating, UserId};
use std::collections::HashMap;
use tracing::info;

/// Activity Filter - drops inactive users and unpopular books
///
/// Both counts are taken over the unfiltered input and applied in one pass.
/// A rating survives when its user has at least `min_user_ratings` ratings
/// and its book has at least `min_item_ratings` ratings in the input.
/// The filter is not iterated to a fixed point, so a survivor may end up
/// with fewer ratings than the threshold in the filtered set.
#[derive(Debug, Clone, Copy)]
pub struct ActivityFilter {
    min_user_ratings: usize,
    min_item_ratings: usize,
}

impl ActivityFilter {
    pub fn new(min_user_ratings: usize, min_item_ratings: usize) -> Self {
        Self {
            min_user_ratings,
            min_item_ratings,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.min_user_ratings, config.min_item_ratings)
    }

    /// Surviving ratings, in input order
    pub fn apply(&self, ratings: &[Rating]) -> Vec<Rating> {
        let mut user_counts: HashMap<&UserId, usize> = HashMap::new();
        let mut item_counts: HashMap<&ItemId, usize> = HashMap::new();

        for rating in ratings {
            *user_counts.entry(&rating.user_id).or_insert(0) += 1;
            *item_counts.entry(&rating.item_id).or_insert(0) += 1;
        }

        let filtered: Vec<Rating> = ratings
            .iter()
            .filter(|r| {
                user_counts[&r.user_id] >= self.min_user_ratings
                    && item_counts[&r.item_id] >= self.min_item_ratings
            })
            .cloned()
            .collect();

        let active_users = user_counts
            .values()
            .filter(|&&count| count >= self.min_user_ratings)
            .count();
        let popular_items = item_counts
            .values()
            .filter(|&&count| count >= self.min_item_ratings)
            .count();

        info!(
            input = ratings.len(),
            kept = filtered.len(),
            active_users,
            popular_items,
            "Activity filter applied (min_user_ratings={}, min_item_ratings={})",
            self.min_user_ratings,
            self.min_item_ratings
        );

        filtered
    }
}
