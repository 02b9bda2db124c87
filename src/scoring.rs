//! Per-worker scoring unit.
//!
//! The batch-execution harness starts one scoring unit per worker process,
//! initializes it once, then hands it row batches until the process exits.
//! Neither hook is allowed to raise past its boundary: the harness treats an
//! escaped initialization error as fatal to the whole job, so failures are
//! logged and carried as explicit state instead.

use crate::args::ModelFilter;
use crate::error::ScoreError;
use crate::models::predictor::Predictor;
use crate::models::ModelLoader;
use crate::registry::{ArtifactStore, ModelRegistry};
use crate::types::batch::{BatchFailure, BatchOutcome, RowBatch};
use tracing::{debug, error, info};

/// Whether the unit holds a usable model. Fixed after initialization.
enum ModelState {
    Ready(Box<dyn Predictor>),
    Unavailable { reason: String },
}

/// A worker's scoring state: one model, loaded once, scored against many
/// batches.
pub struct ScoringUnit {
    model: ModelState,
}

impl ScoringUnit {
    /// Initialization hook. Runs exactly once per worker process.
    ///
    /// Resolves the filter against the registry, fetches the artifact, and
    /// deserializes it into the unit's model. Lookup and load failures are
    /// logged and leave the unit in the unavailable state; this function never
    /// returns an error. A missing model name is the caller's problem:
    /// [`ModelFilter::from_args`] fails before a unit is ever constructed.
    pub fn initialize<R, S>(
        filter: &ModelFilter,
        registry: &R,
        store: &S,
        loader: &ModelLoader,
    ) -> Self
    where
        R: ModelRegistry,
        S: ArtifactStore,
    {
        info!(model = %filter.name, "Initializing scoring unit");

        match Self::try_load(filter, registry, store, loader) {
            Ok(predictor) => {
                info!(model = %filter.name, "Loaded model");
                Self {
                    model: ModelState::Ready(predictor),
                }
            }
            Err(e) => {
                error!(model = %filter.name, error = %e, "Scoring unit has no model");
                Self {
                    model: ModelState::Unavailable {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    fn try_load<R, S>(
        filter: &ModelFilter,
        registry: &R,
        store: &S,
        loader: &ModelLoader,
    ) -> Result<Box<dyn Predictor>, ScoreError>
    where
        R: ModelRegistry,
        S: ArtifactStore,
    {
        let identity = registry.find(filter)?;
        let path = store.fetch(&identity)?;
        let predictor = loader.load(&path).map_err(|e| ScoreError::Load {
            name: identity.name.clone(),
            version: identity.version,
            reason: e.to_string(),
        })?;
        Ok(Box::new(predictor))
    }

    /// Build a unit around an already-loaded predictor.
    pub fn with_predictor(predictor: Box<dyn Predictor>) -> Self {
        Self {
            model: ModelState::Ready(predictor),
        }
    }

    /// Build a unit that has no model and reports `reason` per batch.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            model: ModelState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    /// True when initialization produced a usable model.
    pub fn is_ready(&self) -> bool {
        matches!(self.model, ModelState::Ready(_))
    }

    /// Per-batch scoring hook.
    ///
    /// Scores each row independently, in order, and joins the predictions
    /// onto the batch as a trailing `score` column. The first row whose
    /// prediction fails aborts the rest of the batch. All failure modes come
    /// back as [`BatchOutcome::Failed`] rather than an error.
    pub fn run(&mut self, batch: &RowBatch) -> BatchOutcome {
        if batch.is_empty() {
            debug!(batch_id = ?batch.batch_id, "Empty batch, nothing to score");
            return BatchOutcome::Empty;
        }

        let predictor = match &mut self.model {
            ModelState::Ready(predictor) => predictor,
            ModelState::Unavailable { reason } => {
                error!(
                    batch_id = ?batch.batch_id,
                    reason = %reason,
                    "Dropping batch: no model available"
                );
                return BatchOutcome::Failed(BatchFailure {
                    batch_id: batch.batch_id.clone(),
                    row: None,
                    reason: format!("no model available: {}", reason),
                });
            }
        };

        let mut scores = Vec::with_capacity(batch.len());
        for idx in 0..batch.len() {
            let features = batch.row_features(idx);
            match predictor.predict(&features) {
                Ok(score) => scores.push(score),
                Err(e) => {
                    let failure = ScoreError::Prediction {
                        row: idx,
                        reason: e.to_string(),
                    };
                    error!(
                        batch_id = ?batch.batch_id,
                        row = idx,
                        error = %failure,
                        "Aborting batch on prediction failure"
                    );
                    return BatchOutcome::Failed(BatchFailure {
                        batch_id: batch.batch_id.clone(),
                        row: Some(idx),
                        reason: failure.to_string(),
                    });
                }
            }
        }

        debug!(
            batch_id = ?batch.batch_id,
            rows = batch.len(),
            "Batch scored"
        );
        BatchOutcome::Scored(batch.with_scores(scores))
    }
}
