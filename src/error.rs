//! Error taxonomy for the scoring worker.
//!
//! Only `Configuration` is allowed to propagate out of worker startup; the
//! other variants are caught at the hook boundaries and surfaced as logged,
//! structured outcomes instead of raised errors.

use thiserror::Error;

/// Errors raised while resolving, loading, or running a model.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// A required launch argument is missing or unusable. Fatal to startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The registry has no model matching the filter.
    #[error("model lookup failed for '{name}': {reason}")]
    Lookup { name: String, reason: String },

    /// The resolved artifact could not be fetched or deserialized.
    #[error("failed to load model '{name}' version {version}: {reason}")]
    Load {
        name: String,
        version: u32,
        reason: String,
    },

    /// A single-row prediction call failed.
    #[error("prediction failed at row {row}: {reason}")]
    Prediction { row: usize, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScoreError::Lookup {
            name: "churn".to_string(),
            reason: "no matching version".to_string(),
        };
        assert!(err.to_string().contains("churn"));

        let err = ScoreError::Prediction {
            row: 3,
            reason: "tensor shape mismatch".to_string(),
        };
        assert!(err.to_string().contains("row 3"));
    }
}
