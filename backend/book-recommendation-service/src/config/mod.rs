use crate::error::{RecommendError, Result};
use crate::models::CandidateOrdering;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub log_level: String,
    /// User shown by the presentation shell; first available user when unset
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub ratings_path: String,
    pub books_path: String,
    pub delimiter: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            ratings_path: "ratings.csv".to_string(),
            books_path: "books.csv".to_string(),
            delimiter: ",".to_string(),
        }
    }
}

impl DataConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(RecommendError::Configuration(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub min_user_ratings: usize,
    pub min_item_ratings: usize,
    pub n_components: usize,
    pub random_seed: u64,
    pub power_iterations: usize,
    pub oversamples: usize,
    pub clamp_rank: bool,
    pub neighbor_count: usize,
    pub max_recommendations: usize,
    pub candidate_ordering: CandidateOrdering,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            min_user_ratings: 50,
            min_item_ratings: 50,
            n_components: 50,
            random_seed: 42,
            power_iterations: 5,
            oversamples: 10,
            clamp_rank: false,
            neighbor_count: 5,
            max_recommendations: 5,
            candidate_ordering: CandidateOrdering::EncounterOrder,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_user_ratings == 0 || self.min_item_ratings == 0 {
            return Err(RecommendError::Configuration(
                "Activity thresholds must be at least 1".to_string(),
            ));
        }

        if self.n_components == 0 {
            return Err(RecommendError::Configuration(
                "n_components must be at least 1".to_string(),
            ));
        }

        if self.neighbor_count == 0 {
            return Err(RecommendError::Configuration(
                "neighbor_count must be at least 1".to_string(),
            ));
        }

        if self.max_recommendations == 0 {
            return Err(RecommendError::Configuration(
                "max_recommendations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load from `BOOKREC_*` environment variables (and `.env`), nested keys
    /// separated by `__`, e.g. `BOOKREC_MODEL__N_COMPONENTS=20`.
    ///
    /// Values stay strings until deserialized, so `BOOKREC_USER_ID=007`
    /// keeps its leading zeros.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = ModelConfig::default();
        let data = DataConfig::default();

        let config = config::Config::builder()
            .set_default("data.ratings_path", data.ratings_path)?
            .set_default("data.books_path", data.books_path)?
            .set_default("data.delimiter", data.delimiter)?
            .set_default("model.min_user_ratings", defaults.min_user_ratings as u64)?
            .set_default("model.min_item_ratings", defaults.min_item_ratings as u64)?
            .set_default("model.n_components", defaults.n_components as u64)?
            .set_default("model.random_seed", defaults.random_seed)?
            .set_default("model.power_iterations", defaults.power_iterations as u64)?
            .set_default("model.oversamples", defaults.oversamples as u64)?
            .set_default("model.clamp_rank", defaults.clamp_rank)?
            .set_default("model.neighbor_count", defaults.neighbor_count as u64)?
            .set_default(
                "model.max_recommendations",
                defaults.max_recommendations as u64,
            )?
            .set_default("model.candidate_ordering", "encounter_order")?
            .set_default("log_level", "info")?
            .add_source(
                config::Environment::with_prefix("BOOKREC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.ratings_path.is_empty() || self.data.books_path.is_empty() {
            return Err(RecommendError::Configuration(
                "ratings_path and books_path are required".to_string(),
            ));
        }

        self.data.delimiter_byte()?;
        self.model.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            data: DataConfig::default(),
            model: ModelConfig::default(),
            log_level: "info".to_string(),
            user_id: None,
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_delimiter() {
        let mut config = test_config();
        config.data.delimiter = ";;".to_string();
        assert!(config.validate().is_err());

        config.data.delimiter = ";".to_string();
        assert_eq!(config.data.delimiter_byte().unwrap(), b';');
    }

    #[test]
    fn test_zero_thresholds_rejected() {
        let mut config = test_config();
        config.model.min_item_ratings = 0;
        assert!(matches!(
            config.validate(),
            Err(RecommendError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_components_rejected() {
        let mut config = test_config();
        config.model.n_components = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_defaults() {
        let model = ModelConfig::default();
        assert_eq!(model.min_user_ratings, 50);
        assert_eq!(model.min_item_ratings, 50);
        assert_eq!(model.n_components, 50);
        assert_eq!(model.random_seed, 42);
        assert_eq!(model.neighbor_count, 5);
        assert_eq!(model.max_recommendations, 5);
        assert_eq!(model.candidate_ordering, CandidateOrdering::EncounterOrder);
        assert!(!model.clamp_rank);
    }

    #[test]
    fn test_from_env_overrides() {
        let vars = [
            ("BOOKREC_MODEL__N_COMPONENTS", "20"),
            ("BOOKREC_MODEL__CANDIDATE_ORDERING", "aggregate_rating"),
            ("BOOKREC_MODEL__CLAMP_RANK", "true"),
            ("BOOKREC_DATA__DELIMITER", ";"),
            ("BOOKREC_USER_ID", "007"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }

        let loaded = Config::from_env();

        for (key, _) in vars {
            std::env::remove_var(key);
        }

        let config = loaded.unwrap();
        assert_eq!(config.model.n_components, 20);
        assert_eq!(
            config.model.candidate_ordering,
            CandidateOrdering::AggregateRating
        );
        assert!(config.model.clamp_rank);
        assert_eq!(config.data.delimiter_byte().unwrap(), b';');
        assert_eq!(config.user_id.as_deref(), Some("007"));

        // Untouched keys keep their defaults
        assert_eq!(config.model.min_user_ratings, 50);
        assert_eq!(config.model.neighbor_count, 5);
        assert_eq!(config.log_level, "info");
    }
}
