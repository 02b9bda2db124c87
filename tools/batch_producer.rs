//! Test Batch Producer
//!
//! Generates random row batches and publishes them to NATS so a running
//! worker can be exercised end to end.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Row batch structure matching the worker's expected wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RowBatch {
    batch_id: Option<String>,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

/// Batch generator for testing
struct BatchGenerator {
    rng: rand::rngs::ThreadRng,
    batch_counter: u64,
    columns: Vec<String>,
}

impl BatchGenerator {
    fn new(feature_count: usize) -> Self {
        Self {
            rng: rand::thread_rng(),
            batch_counter: 0,
            columns: (1..=feature_count).map(|i| format!("f{}", i)).collect(),
        }
    }

    /// Generate a batch of random feature rows
    fn generate(&mut self, rows: usize) -> RowBatch {
        self.batch_counter += 1;

        let rows = (0..rows)
            .map(|_| {
                self.columns
                    .iter()
                    .map(|_| self.rng.gen_range(-10.0..10.0))
                    .collect()
            })
            .collect();

        RowBatch {
            batch_id: Some(format!("mb_{:08}", self.batch_counter)),
            columns: self.columns.clone(),
            rows,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("batch_producer=info".parse()?),
        )
        .init();

    info!("Starting test batch producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("scoring.batches");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(10);
    let batch_size: usize = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(32);
    let feature_count: usize = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(8);
    let delay_ms: u64 = args.get(6).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        batch_size = batch_size,
        feature_count = feature_count,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let mut generator = BatchGenerator::new(feature_count);

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(&mut generator, count, batch_size, delay_ms).await;
        }
    };

    info!("Starting to publish {} batches...", count);

    for i in 0..count {
        let batch = generator.generate(batch_size);
        let payload = serde_json::to_vec(&batch)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!("Published {}/{} batches", i + 1, count);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!("Completed! Published {} batches", count);

    Ok(())
}

async fn run_dry_mode(
    generator: &mut BatchGenerator,
    count: u64,
    batch_size: usize,
    delay_ms: u64,
) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    for i in 0..count {
        let batch = generator.generate(batch_size);
        let json = serde_json::to_string_pretty(&batch)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample batch {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
