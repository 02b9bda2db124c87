//! Model loading and single-row prediction

pub mod loader;
pub mod predictor;

pub use loader::{ModelLoader, OnnxPredictor};
pub use predictor::Predictor;
