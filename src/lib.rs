//! Batch Scoring Worker Library
//!
//! A per-node batch scoring worker: resolves one registered model from the
//! launch arguments, loads it once, then scores mini-batches of tabular rows,
//! appending a `score` column to each.

pub mod args;
pub mod config;
pub mod consumer;
pub mod error;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod registry;
pub mod scoring;
pub mod types;

pub use args::ModelFilter;
pub use config::WorkerConfig;
pub use consumer::{BatchConsumer, BatchStream};
pub use error::ScoreError;
pub use models::{ModelLoader, Predictor};
pub use producer::OutcomeProducer;
pub use registry::{ArtifactStore, FileRegistry, ModelIdentity, ModelRegistry};
pub use scoring::ScoringUnit;
pub use types::{BatchOutcome, RowBatch, ScoredBatch};
