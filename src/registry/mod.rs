//! Model registry and artifact store seams.
//!
//! The worker only ever needs two operations from the platform that owns
//! registered models: resolve a filter to exactly one model identity, and
//! produce a local path for that identity's artifact. Both are traits so the
//! managed-platform client can slot in behind the same scoring core; the
//! bundled implementation is file-backed.

pub mod file;

use crate::args::ModelFilter;
use crate::error::ScoreError;

pub use file::FileRegistry;

/// A resolved model: the unique name/version pair an artifact is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentity {
    pub name: String,
    pub version: u32,
}

/// Maps a [`ModelFilter`] to exactly one registered model.
pub trait ModelRegistry {
    /// Resolve the filter, applying latest-version as the tie-break when no
    /// explicit version was requested.
    fn find(&self, filter: &ModelFilter) -> Result<ModelIdentity, ScoreError>;
}

/// Supplies the serialized artifact for a resolved model.
pub trait ArtifactStore {
    /// Local filesystem path holding the artifact bytes.
    fn fetch(&self, identity: &ModelIdentity) -> Result<std::path::PathBuf, ScoreError>;
}
