pub mod factorization;
pub mod filter;
pub mod matrix;
pub mod recommender;
pub mod similarity;
pub mod snapshot;
pub mod store;

pub use factorization::{LatentFactors, TruncatedSvd};
pub use filter::ActivityFilter;
pub use matrix::InteractionMatrix;
pub use recommender::RecommendationModel;
pub use similarity::SimilarityIndex;
pub use snapshot::ModelHandle;
pub use store::RatingStore;
