//! Row batch structures exchanged with the batch-execution harness.
//!
//! A `RowBatch` is one mini-batch of tabular scoring input: named columns,
//! ordered rows, one row per scoring request. Scoring appends a trailing
//! `score` column and preserves row order 1:1.

use serde::{Deserialize, Serialize};

/// Column name appended to scored output.
pub const SCORE_COLUMN: &str = "score";

/// One mini-batch of scoring input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowBatch {
    /// Harness-assigned identifier for correlating outcomes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,

    /// Feature column names, in the order the model expects.
    pub columns: Vec<String>,

    /// Feature rows. Each row has one value per column.
    pub rows: Vec<Vec<f64>>,
}

impl RowBatch {
    /// Create a batch from columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            batch_id: None,
            columns,
            rows,
        }
    }

    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the batch has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature vector for row `idx`, cast to the predictor's input type.
    pub fn row_features(&self, idx: usize) -> Vec<f32> {
        self.rows[idx].iter().map(|&v| v as f32).collect()
    }

    /// Join a score column onto the batch, producing the scored output.
    ///
    /// `scores` must hold exactly one value per row, in row order.
    pub fn with_scores(&self, scores: Vec<f64>) -> ScoredBatch {
        debug_assert_eq!(scores.len(), self.rows.len());

        let mut columns = self.columns.clone();
        columns.push(SCORE_COLUMN.to_string());

        let rows = self
            .rows
            .iter()
            .zip(scores)
            .map(|(row, score)| {
                let mut scored = row.clone();
                scored.push(score);
                scored
            })
            .collect();

        ScoredBatch {
            batch_id: self.batch_id.clone(),
            columns,
            rows,
        }
    }
}

/// A scored batch: the input columns plus a trailing `score` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Details of a batch that could not be scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// Index of the row whose prediction failed, when the failure was
    /// row-level rather than a missing model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub reason: String,
}

/// Result of scoring one batch. Published as-is to the harness so failed
/// batches stay observable instead of silently producing no output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// All rows scored.
    Scored(ScoredBatch),
    /// The input batch had zero rows.
    Empty,
    /// No model was available, or a row's prediction failed.
    Failed(BatchFailure),
}

impl BatchOutcome {
    /// True for the `Scored` variant.
    pub fn is_scored(&self) -> bool {
        matches!(self, BatchOutcome::Scored(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> RowBatch {
        RowBatch::new(
            vec!["f1".to_string(), "f2".to_string()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
    }

    #[test]
    fn test_with_scores_appends_trailing_column() {
        let batch = sample_batch();
        let scored = batch.with_scores(vec![0.9, 0.1]);

        assert_eq!(scored.columns, vec!["f1", "f2", "score"]);
        assert_eq!(scored.rows, vec![vec![1.0, 2.0, 0.9], vec![3.0, 4.0, 0.1]]);
    }

    #[test]
    fn test_row_features_casts_to_f32() {
        let batch = sample_batch();
        assert_eq!(batch.row_features(1), vec![3.0_f32, 4.0_f32]);
    }

    #[test]
    fn test_batch_serialization_round_trip() {
        let mut batch = sample_batch();
        batch.batch_id = Some("mb_007".to_string());

        let json = serde_json::to_string(&batch).unwrap();
        let back: RowBatch = serde_json::from_str(&json).unwrap();

        assert_eq!(back.batch_id.as_deref(), Some("mb_007"));
        assert_eq!(back.columns, batch.columns);
        assert_eq!(back.rows, batch.rows);
    }

    #[test]
    fn test_batch_id_is_optional_on_the_wire() {
        let batch: RowBatch =
            serde_json::from_str(r#"{"columns":["f1"],"rows":[[1.5]]}"#).unwrap();
        assert_eq!(batch.batch_id, None);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_outcome_tagging() {
        let outcome = BatchOutcome::Failed(BatchFailure {
            batch_id: None,
            row: Some(2),
            reason: "boom".to_string(),
        });

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains(r#""outcome":"failed""#));
        assert!(!outcome.is_scored());
    }
}
