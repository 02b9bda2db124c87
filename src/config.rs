//! Configuration management for the scoring worker.
//!
//! Model selection is deliberately NOT configured here: it arrives on the
//! process argument vector from the batch-execution harness. The config file
//! covers the worker's own plumbing.

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main worker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub nats: NatsConfig,
    pub registry: RegistryConfig,
    pub scoring: ScoringConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject delivering row batches to score
    pub batch_subject: String,
    /// Subject receiving batch outcomes
    pub result_subject: String,
}

/// Model registry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding index.json and the model artifacts
    pub root: String,
}

/// Scoring configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Intra-op threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
    /// Seconds between metrics summaries
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,
}

fn default_onnx_threads() -> usize {
    1
}

fn default_metrics_interval() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl WorkerConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                batch_subject: "scoring.batches".to_string(),
                result_subject: "scoring.results".to_string(),
            },
            registry: RegistryConfig {
                root: "registry".to_string(),
            },
            scoring: ScoringConfig {
                onnx_threads: 1,
                metrics_interval_secs: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.nats.batch_subject, "scoring.batches");
        assert_eq!(config.registry.root, "registry");
        assert_eq!(config.scoring.onnx_threads, 1);
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[nats]
url = "nats://scoring:4222"
batch_subject = "in"
result_subject = "out"

[registry]
root = "/var/lib/models"

[scoring]
onnx_threads = 2

[logging]
level = "debug"
format = "pretty"
"#,
        )
        .unwrap();

        let config = WorkerConfig::load_from_path(&path).unwrap();
        assert_eq!(config.nats.batch_subject, "in");
        assert_eq!(config.registry.root, "/var/lib/models");
        assert_eq!(config.scoring.onnx_threads, 2);
        assert_eq!(config.scoring.metrics_interval_secs, 30);
    }
}
