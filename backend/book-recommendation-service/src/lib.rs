pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{RecommendError, Result};
pub use models::{BookRecommendation, ItemId, RecommendOutcome, UserId};
pub use services::{ModelHandle, RatingStore, RecommendationModel};
