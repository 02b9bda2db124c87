//! Single-row prediction seam.

use anyhow::Result;

/// An in-memory model that scores one feature row at a time.
///
/// `&mut self` because session-based backends require exclusive access to
/// run; the scoring unit owns its predictor and scores sequentially, so no
/// locking is involved.
pub trait Predictor: Send {
    /// Score one row of features, given in the model's expected column order.
    fn predict(&mut self, features: &[f32]) -> Result<f64>;
}
