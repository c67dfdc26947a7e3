use crate::config::{Config, ModelConfig};
use crate::error::Result;
use crate::models::{
    BookRecommendation, CandidateOrdering, ItemId, Rating, RecommendOutcome, SimilarUser, UserId,
};
use crate::services::factorization::{LatentFactors, TruncatedSvd};
use crate::services::filter::ActivityFilter;
use crate::services::matrix::InteractionMatrix;
use crate::services::similarity::SimilarityIndex;
use crate::services::store::RatingStore;
use ndarray::Array2;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// User-based collaborative filtering over latent factors
///
/// Built once from a `RatingStore`; every query afterwards is a read-only
/// lookup against the precomputed state.
///
/// Algorithm per query:
/// 1. Locate the user's row in the interaction matrix
/// 2. Take the `neighbor_count` most similar other users
/// 3. Walk the neighbors' filtered ratings in input order, skipping books
///    the user already rated
/// 4. Inner-join with the catalog, dedupe on (title, author), cap the list
///
/// The interaction matrix owns the user ordering. Feature rows, similarity
/// rows/columns and `ratings_by_row` all index by it.
#[derive(Debug, Clone)]
pub struct RecommendationModel {
    store: RatingStore,
    filtered: Vec<Rating>,
    matrix: InteractionMatrix,
    factors: Option<LatentFactors>,
    similarity: SimilarityIndex,
    /// Indices into `filtered`, ascending, per matrix row
    ratings_by_row: Vec<Vec<usize>>,
    neighbor_count: usize,
    max_recommendations: usize,
    ordering: CandidateOrdering,
}

impl RecommendationModel {
    /// Load both CSV sources and build the model
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = RatingStore::from_csv(&config.data)?;
        Self::build(store, &config.model)
    }

    /// Run filter → matrix → factorization → similarity.
    ///
    /// An empty filtered set yields a model with no users rather than an
    /// error. An infeasible rank is a configuration error.
    pub fn build(store: RatingStore, config: &ModelConfig) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();

        let filtered = ActivityFilter::from_config(config).apply(store.ratings());
        let matrix = InteractionMatrix::from_ratings(&filtered);

        let (factors, similarity) = if matrix.is_empty() {
            warn!(
                min_user_ratings = config.min_user_ratings,
                min_item_ratings = config.min_item_ratings,
                "No ratings survived the activity filter, model has no users"
            );
            (None, SimilarityIndex::from_features(&Array2::zeros((0, 0))))
        } else {
            let factors = TruncatedSvd::from_config(config).fit_transform(matrix.values())?;
            let similarity = SimilarityIndex::from_features(factors.features());
            (Some(factors), similarity)
        };

        let mut ratings_by_row: Vec<Vec<usize>> = vec![Vec::new(); matrix.users().len()];
        for (i, rating) in filtered.iter().enumerate() {
            if let Some(row) = matrix.row_of(&rating.user_id) {
                ratings_by_row[row].push(i);
            }
        }

        info!(
            users = matrix.users().len(),
            books = matrix.items().len(),
            ratings = filtered.len(),
            repeated_ratings = matrix.repeated_ratings(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendation model ready"
        );

        Ok(Self {
            store,
            filtered,
            matrix,
            factors,
            similarity,
            ratings_by_row,
            neighbor_count: config.neighbor_count,
            max_recommendations: config.max_recommendations,
            ordering: config.candidate_ordering,
        })
    }

    /// Users that can be queried, in matrix row order
    pub fn list_available_users(&self) -> &[UserId] {
        self.matrix.users()
    }

    pub fn recommend(&self, user_id: &UserId) -> RecommendOutcome {
        let Some(row) = self.matrix.row_of(user_id) else {
            debug!(user_id = %user_id, "User not in interaction matrix");
            return RecommendOutcome::NotFound;
        };

        let neighbors = self.similarity.nearest(row, self.neighbor_count);

        let seen: HashSet<&ItemId> = self.ratings_by_row[row]
            .iter()
            .map(|&i| &self.filtered[i].item_id)
            .collect();

        let mut candidate_indices: Vec<usize> = neighbors
            .iter()
            .flat_map(|(neighbor, _)| self.ratings_by_row[*neighbor].iter().copied())
            .collect();
        candidate_indices.sort_unstable();

        let mut candidates: Vec<(BookRecommendation, f64)> = Vec::new();
        let mut positions: HashMap<BookRecommendation, usize> = HashMap::new();

        for i in candidate_indices {
            let rating = &self.filtered[i];
            if seen.contains(&rating.item_id) {
                continue;
            }

            // Inner join: ratings for books missing from the catalog are dropped
            let Some(book) = self.store.book(&rating.item_id) else {
                continue;
            };

            let recommendation = BookRecommendation::from(book);
            match positions.get(&recommendation) {
                Some(&pos) => candidates[pos].1 += rating.value,
                None => {
                    positions.insert(recommendation.clone(), candidates.len());
                    candidates.push((recommendation, rating.value));
                }
            }
        }

        if self.ordering == CandidateOrdering::AggregateRating {
            candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        }

        let books: Vec<BookRecommendation> = candidates
            .into_iter()
            .take(self.max_recommendations)
            .map(|(book, _)| book)
            .collect();

        debug!(
            user_id = %user_id,
            neighbors = neighbors.len(),
            seen = seen.len(),
            returned = books.len(),
            "Recommendation query served"
        );

        if books.is_empty() {
            RecommendOutcome::Empty
        } else {
            RecommendOutcome::Recommendations(books)
        }
    }

    /// The users `recommend` would draw candidates from, most similar first
    pub fn neighbors(&self, user_id: &UserId) -> Option<Vec<SimilarUser>> {
        let row = self.matrix.row_of(user_id)?;
        let users = self.matrix.users();

        Some(
            self.similarity
                .nearest(row, self.neighbor_count)
                .into_iter()
                .map(|(other, similarity)| SimilarUser {
                    user_id: users[other].clone(),
                    row: other,
                    similarity,
                })
                .collect(),
        )
    }

    pub fn similarity(&self, a: &UserId, b: &UserId) -> Option<f64> {
        let i = self.matrix.row_of(a)?;
        let j = self.matrix.row_of(b)?;
        Some(self.similarity.get(i, j))
    }

    pub fn interaction_matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    pub fn latent_factors(&self) -> Option<&LatentFactors> {
        self.factors.as_ref()
    }

    pub fn similarity_index(&self) -> &SimilarityIndex {
        &self.similarity
    }

    /// Ratings that survived the activity filter, in input order
    pub fn filtered_ratings(&self) -> &[Rating] {
        &self.filtered
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }
}
