//! ONNX model loader and predictor.
//!
//! Loads a serialized model artifact into an ONNX Runtime session and scores
//! one feature row at a time. Handles both plain tensor outputs (regressors,
//! XGBoost/RandomForest classifiers) and the `seq(map(int64, float))` output
//! shape that sklearn-family classifier exports produce.

use crate::models::predictor::Predictor;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::path::Path;
use tracing::{debug, info};

/// An ONNX model loaded into process memory. Built once per worker process
/// and kept for its lifetime.
pub struct OnnxPredictor {
    session: Session,
    input_name: String,
    output_name: String,
}

/// Loader for ONNX model artifacts.
pub struct ModelLoader {
    intra_threads: usize,
}

impl ModelLoader {
    /// Create a loader with default settings (1 inference thread).
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a loader with the given intra-op thread count.
    pub fn with_threads(intra_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(intra_threads, "ONNX Runtime initialized");
        Ok(Self { intra_threads })
    }

    /// Deserialize the artifact at `path` into a ready predictor.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<OnnxPredictor> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = self.intra_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.intra_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // Classifier exports usually pair a "label" output with the scores;
        // prefer the score-bearing one.
        let output_name = session
            .outputs
            .iter()
            .find(|o| !o.name.contains("label"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        info!(
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(OnnxPredictor {
            session,
            input_name,
            output_name,
        })
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&mut self, features: &[f32]) -> Result<f64> {
        use ort::value::Tensor;

        // Single-row input: shape [1, num_features].
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let output_name = self.output_name.clone();
        let outputs = self
            .session
            .run(ort::inputs![&self.input_name => input_tensor])?;

        extract_score(&outputs, &output_name)
    }
}

/// Pull the scalar score for a single-row run out of the session outputs.
fn extract_score(outputs: &ort::session::SessionOutputs, output_name: &str) -> Result<f64> {
    if let Some(output) = outputs.get(output_name) {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(score_from_tensor(&dims, data));
        }
        if DynSequenceValueType::can_downcast(&output.dtype()) {
            if let Ok(score) = score_from_sequence_map(output) {
                return Ok(score);
            }
        }
    }

    // Fallback: scan the remaining outputs, skipping classifier labels.
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            debug!(output = %name, "Extracted score from fallback output");
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(score_from_tensor(&dims, data));
        }
        if DynSequenceValueType::can_downcast(&output.dtype()) {
            if let Ok(score) = score_from_sequence_map(&output) {
                return Ok(score);
            }
        }
    }

    anyhow::bail!("no usable score output (looked for '{}')", output_name)
}

/// Scalar score from a tensor output of a single-row run.
///
/// Regressors emit `[1]` or `[1, 1]`; probability classifiers emit
/// `[1, num_classes]`, where class 1 carries the positive-class score.
fn score_from_tensor(dims: &[i64], data: &[f32]) -> f64 {
    let width = match dims.len() {
        2 => dims[1] as usize,
        1 => dims[0] as usize,
        _ => data.len(),
    };

    if width >= 2 {
        data[1] as f64
    } else {
        data.first().map(|&v| v as f64).unwrap_or(0.0)
    }
}

/// Scalar score from a `seq(map(int64, float))` classifier output.
fn score_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let map_value = maps.first().context("empty output sequence")?;
    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(*prob as f64);
        }
    }
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    anyhow::bail!("no class probability found in map output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_tensor_is_the_score() {
        assert_eq!(score_from_tensor(&[1, 1], &[0.42]), 0.42_f32 as f64);
        assert_eq!(score_from_tensor(&[1], &[7.5]), 7.5_f32 as f64);
    }

    #[test]
    fn test_two_class_tensor_takes_positive_class() {
        assert_eq!(score_from_tensor(&[1, 2], &[0.3, 0.7]), 0.7_f32 as f64);
    }
}
