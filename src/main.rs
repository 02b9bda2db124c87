//! Batch Scoring Worker - Main Entry Point
//!
//! One process per worker node. Parses the model selection filter from the
//! launch arguments, loads the model once, then consumes row batches from
//! NATS and publishes scored batches (or structured failures) back.
//!
//! The harness passes extra undocumented flags alongside the model filter, so
//! argument parsing is a manual scan rather than a declarative parser.

use anyhow::Result;
use batch_scoring_worker::{
    args::ModelFilter,
    config::WorkerConfig,
    consumer::BatchConsumer,
    metrics::{MetricsReporter, ScoringMetrics},
    models::ModelLoader,
    producer::OutcomeProducer,
    registry::FileRegistry,
    scoring::ScoringUnit,
    types::batch::BatchOutcome,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("batch_scoring_worker=info".parse()?),
        )
        .init();

    info!("Starting batch scoring worker");

    // Load configuration
    let config = WorkerConfig::load()?;
    info!("Configuration loaded successfully");

    // A missing model name is fatal: nothing can be scored without one.
    let argv: Vec<String> = std::env::args().collect();
    let filter = ModelFilter::from_args(&argv)?;
    info!(
        model = %filter.name,
        version = ?filter.version,
        tag_name = ?filter.tag_name,
        tag_value = ?filter.tag_value,
        "Resolved model filter from launch arguments"
    );

    // Initialize the scoring unit. Runtime, registry, and load failures are
    // logged and leave the unit reporting a structured "no model" failure per
    // batch instead of crashing node startup; only a configuration error may
    // fail startup loudly.
    let mut unit = match ModelLoader::with_threads(config.scoring.onnx_threads) {
        Ok(loader) => match FileRegistry::open(&config.registry.root) {
            Ok(registry) => ScoringUnit::initialize(&filter, &registry, &registry, &loader),
            Err(e) => {
                error!(error = %e, "Cannot open model registry");
                ScoringUnit::unavailable(e.to_string())
            }
        },
        Err(e) => {
            error!(error = %e, "Cannot initialize model runtime");
            ScoringUnit::unavailable(e.to_string())
        }
    };
    info!(ready = unit.is_ready(), "Scoring unit initialized");

    // Initialize metrics
    let metrics = Arc::new(ScoringMetrics::new());

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = BatchConsumer::new(client.clone(), &config.nats.batch_subject);
    let producer = OutcomeProducer::new(client.clone(), &config.nats.result_subject);

    info!("Listening on subject: {}", config.nats.batch_subject);
    info!("Publishing outcomes to: {}", config.nats.result_subject);

    // Start metrics reporter
    let metrics_clone = metrics.clone();
    let interval = config.scoring.metrics_interval_secs;
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, interval);
        reporter.start().await;
    });

    // Score batches strictly one at a time: a single scoring unit owns the
    // model, and the harness contract has no intra-worker concurrency.
    let mut batches = consumer.subscribe().await?;

    while let Some(batch) = batches.next_batch().await {
        let batch_id = batch.batch_id.clone();
        let start_time = Instant::now();
        let outcome = unit.run(&batch);
        let scoring_time = start_time.elapsed();

        match &outcome {
            BatchOutcome::Scored(scored) => {
                let scores: Vec<f64> = scored
                    .rows
                    .iter()
                    .filter_map(|row| row.last().copied())
                    .collect();
                metrics.record_batch(scoring_time, &scores);
                info!(
                    batch_id = ?batch_id,
                    rows = scored.rows.len(),
                    scoring_time_us = scoring_time.as_micros(),
                    "Batch scored"
                );
            }
            BatchOutcome::Empty => {
                metrics.record_empty();
            }
            BatchOutcome::Failed(failure) => {
                metrics.record_failure();
                error!(
                    batch_id = ?batch_id,
                    row = ?failure.row,
                    reason = %failure.reason,
                    "Batch failed"
                );
            }
        }

        if let Err(e) = producer.publish(&outcome).await {
            error!(batch_id = ?batch_id, error = %e, "Failed to publish batch outcome");
        }
    }

    info!("Worker shutting down...");
    metrics.print_summary();

    Ok(())
}
