//! File-backed model registry.
//!
//! The registry root holds an `index.json` describing every registered model
//! version, plus the artifact files the entries point to:
//!
//! ```json
//! [
//!   {"name": "churn", "version": 3, "tags": {"stage": "prod"}, "file": "churn/3/model.onnx"}
//! ]
//! ```
//!
//! Entry paths are relative to the registry root.

use crate::args::ModelFilter;
use crate::error::ScoreError;
use crate::registry::{ArtifactStore, ModelIdentity, ModelRegistry};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// One registered model version in the index.
#[derive(Debug, Clone, Deserialize)]
struct IndexEntry {
    name: String,
    version: u32,
    #[serde(default)]
    tags: HashMap<String, String>,
    file: String,
}

/// Registry and artifact store backed by a local directory.
pub struct FileRegistry {
    root: PathBuf,
    entries: Vec<IndexEntry>,
}

impl FileRegistry {
    /// Open the registry rooted at `root`, reading its `index.json`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, ScoreError> {
        let root = root.as_ref().to_path_buf();
        let index_path = root.join("index.json");

        let raw = std::fs::read_to_string(&index_path).map_err(|e| ScoreError::Lookup {
            name: String::new(),
            reason: format!("cannot read registry index {}: {}", index_path.display(), e),
        })?;

        let entries: Vec<IndexEntry> =
            serde_json::from_str(&raw).map_err(|e| ScoreError::Lookup {
                name: String::new(),
                reason: format!("malformed registry index {}: {}", index_path.display(), e),
            })?;

        info!(
            root = %root.display(),
            entries = entries.len(),
            "Opened model registry"
        );

        Ok(Self { root, entries })
    }

    /// Number of registered model versions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matches(entry: &IndexEntry, filter: &ModelFilter) -> bool {
        if entry.name != filter.name {
            return false;
        }

        if let Some(version) = &filter.version {
            if version.parse::<u32>().ok() != Some(entry.version) {
                return false;
            }
        }

        // Tags only constrain the match when both halves of the pair survived
        // argument parsing.
        if let (Some(key), Some(value)) = (&filter.tag_name, &filter.tag_value) {
            if entry.tags.get(key) != Some(value) {
                return false;
            }
        }

        true
    }
}

impl ModelRegistry for FileRegistry {
    fn find(&self, filter: &ModelFilter) -> Result<ModelIdentity, ScoreError> {
        let best = self
            .entries
            .iter()
            .filter(|e| Self::matches(e, filter))
            .max_by_key(|e| e.version);

        match best {
            Some(entry) => {
                info!(
                    model = %entry.name,
                    version = entry.version,
                    "Resolved model from registry"
                );
                Ok(ModelIdentity {
                    name: entry.name.clone(),
                    version: entry.version,
                })
            }
            None => Err(ScoreError::Lookup {
                name: filter.name.clone(),
                reason: match &filter.version {
                    Some(v) => format!("no registered model matches version {}", v),
                    None => "no registered model matches the filter".to_string(),
                },
            }),
        }
    }
}

impl ArtifactStore for FileRegistry {
    fn fetch(&self, identity: &ModelIdentity) -> Result<PathBuf, ScoreError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == identity.name && e.version == identity.version)
            .ok_or_else(|| ScoreError::Load {
                name: identity.name.clone(),
                version: identity.version,
                reason: "identity not present in registry index".to_string(),
            })?;

        let path = self.root.join(&entry.file);
        if !path.exists() {
            return Err(ScoreError::Load {
                name: identity.name.clone(),
                version: identity.version,
                reason: format!("artifact file not found: {}", path.display()),
            });
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry_with_index(index: &str) -> (TempDir, FileRegistry) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.json"), index).unwrap();
        let registry = FileRegistry::open(dir.path()).unwrap();
        (dir, registry)
    }

    fn filter(name: &str) -> ModelFilter {
        ModelFilter {
            name: name.to_string(),
            version: None,
            tag_name: None,
            tag_value: None,
        }
    }

    const INDEX: &str = r#"[
        {"name": "churn", "version": 1, "tags": {"stage": "dev"}, "file": "churn/1/model.onnx"},
        {"name": "churn", "version": 3, "tags": {"stage": "prod"}, "file": "churn/3/model.onnx"},
        {"name": "churn", "version": 2, "tags": {"stage": "prod"}, "file": "churn/2/model.onnx"},
        {"name": "uplift", "version": 5, "file": "uplift/5/model.onnx"}
    ]"#;

    #[test]
    fn test_latest_version_wins_without_explicit_version() {
        let (_dir, registry) = registry_with_index(INDEX);
        let identity = registry.find(&filter("churn")).unwrap();
        assert_eq!(identity.version, 3);
    }

    #[test]
    fn test_explicit_version_pins_the_match() {
        let (_dir, registry) = registry_with_index(INDEX);
        let mut f = filter("churn");
        f.version = Some("2".to_string());
        assert_eq!(registry.find(&f).unwrap().version, 2);
    }

    #[test]
    fn test_tag_pair_constrains_and_latest_breaks_ties() {
        let (_dir, registry) = registry_with_index(INDEX);
        let mut f = filter("churn");
        f.tag_name = Some("stage".to_string());
        f.tag_value = Some("prod".to_string());
        assert_eq!(registry.find(&f).unwrap().version, 3);

        f.tag_value = Some("dev".to_string());
        assert_eq!(registry.find(&f).unwrap().version, 1);
    }

    // Tags only constrain the match when both halves of the pair are present;
    // a tag name alone (e.g. a tag value dropped during argument parsing) is
    // ignored and resolution falls back to latest-version.
    #[test]
    fn test_tag_name_without_value_does_not_constrain() {
        let (_dir, registry) = registry_with_index(INDEX);
        let mut f = filter("churn");
        f.tag_name = Some("stage".to_string());
        f.tag_value = None;
        assert_eq!(registry.find(&f).unwrap().version, 3);

        // Same for a tag value with no tag name.
        let mut f = filter("churn");
        f.tag_name = None;
        f.tag_value = Some("dev".to_string());
        assert_eq!(registry.find(&f).unwrap().version, 3);
    }

    #[test]
    fn test_unknown_model_is_lookup_error() {
        let (_dir, registry) = registry_with_index(INDEX);
        let err = registry.find(&filter("missing")).unwrap_err();
        assert!(matches!(err, ScoreError::Lookup { .. }));
    }

    #[test]
    fn test_unmatched_version_is_lookup_error() {
        let (_dir, registry) = registry_with_index(INDEX);
        let mut f = filter("churn");
        f.version = Some("9".to_string());
        assert!(matches!(
            registry.find(&f),
            Err(ScoreError::Lookup { .. })
        ));
    }

    #[test]
    fn test_fetch_requires_artifact_on_disk() {
        let (dir, registry) = registry_with_index(INDEX);

        let identity = ModelIdentity {
            name: "churn".to_string(),
            version: 3,
        };
        // Index entry exists but the file does not.
        assert!(matches!(
            registry.fetch(&identity),
            Err(ScoreError::Load { .. })
        ));

        let artifact = dir.path().join("churn/3");
        std::fs::create_dir_all(&artifact).unwrap();
        std::fs::write(artifact.join("model.onnx"), b"bytes").unwrap();
        assert!(registry.fetch(&identity).unwrap().ends_with("churn/3/model.onnx"));
    }

    #[test]
    fn test_missing_index_is_lookup_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            FileRegistry::open(dir.path()),
            Err(ScoreError::Lookup { .. })
        ));
    }
}
