//! Type definitions for the batch scoring worker

pub mod batch;

pub use batch::{BatchFailure, BatchOutcome, RowBatch, ScoredBatch};
