use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load {path}: {message}")]
    DataLoad { path: String, message: String },

    #[error("Malformed record in {path} at line {line}: {message}")]
    MalformedRecord {
        path: String,
        line: u64,
        message: String,
    },

    #[error("Factorization failed: {0}")]
    Factorization(String),
}

impl RecommendError {
    /// Rank that cannot be factorized out of a `rows` × `cols` matrix.
    pub fn infeasible_rank(requested: usize, rows: usize, cols: usize) -> Self {
        RecommendError::Configuration(format!(
            "n_components={} requires at least {} rows and columns, filtered matrix is {}x{}",
            requested,
            requested + 1,
            rows,
            cols
        ))
    }
}

impl From<config::ConfigError> for RecommendError {
    fn from(err: config::ConfigError) -> Self {
        RecommendError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_rank_message() {
        let err = RecommendError::infeasible_rank(50, 3, 3);
        let msg = err.to_string();

        assert!(msg.starts_with("Configuration error"));
        assert!(msg.contains("n_components=50"));
        assert!(msg.contains("3x3"));
    }

    #[test]
    fn test_malformed_record_display() {
        let err = RecommendError::MalformedRecord {
            path: "ratings.csv".to_string(),
            line: 7,
            message: "missing field `Book-Rating`".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Malformed record in ratings.csv at line 7: missing field `Book-Rating`"
        );
    }
}
