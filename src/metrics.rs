//! Performance metrics and statistics tracking for the scoring worker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the scoring loop
pub struct ScoringMetrics {
    /// Total batches scored successfully
    pub batches_scored: AtomicU64,
    /// Total batches that failed (no model, or row-level failure)
    pub batches_failed: AtomicU64,
    /// Total empty batches received
    pub batches_empty: AtomicU64,
    /// Total rows scored
    pub rows_scored: AtomicU64,
    /// Per-batch scoring times (in microseconds)
    batch_times: RwLock<Vec<u64>>,
    /// Score distribution buckets over [0, 1)
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ScoringMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            batches_scored: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            batches_empty: AtomicU64::new(0),
            rows_scored: AtomicU64::new(0),
            batch_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a successfully scored batch
    pub fn record_batch(&self, scoring_time: Duration, scores: &[f64]) {
        self.batches_scored.fetch_add(1, Ordering::Relaxed);
        self.rows_scored
            .fetch_add(scores.len() as u64, Ordering::Relaxed);

        if let Ok(mut times) = self.batch_times.write() {
            times.push(scoring_time.as_micros() as u64);
            // Keep only recent samples for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Ok(mut buckets) = self.score_buckets.write() {
            for &score in scores {
                let bucket = (score.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
                buckets[bucket] += 1;
            }
        }
    }

    /// Record a failed batch
    pub fn record_failure(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an empty batch
    pub fn record_empty(&self) {
        self.batches_empty.fetch_add(1, Ordering::Relaxed);
    }

    /// Get batch scoring time statistics
    pub fn get_batch_stats(&self) -> BatchStats {
        let times = self.batch_times.read().unwrap();
        if times.is_empty() {
            return BatchStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        BatchStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (rows per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.rows_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get score distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        *self.score_buckets.read().unwrap()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.batches_scored.load(Ordering::Relaxed);
        let failed = self.batches_failed.load(Ordering::Relaxed);
        let empty = self.batches_empty.load(Ordering::Relaxed);
        let rows = self.rows_scored.load(Ordering::Relaxed);
        let total = scored + failed;
        let failure_rate = if total > 0 {
            (failed as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        let stats = self.get_batch_stats();
        let throughput = self.get_throughput();
        let score_dist = self.get_score_distribution();

        info!(
            batches_scored = scored,
            batches_failed = failed,
            batches_empty = empty,
            rows_scored = rows,
            failure_rate_pct = format!("{:.1}", failure_rate),
            throughput_rows_per_s = format!("{:.1}", throughput),
            "Scoring metrics summary"
        );
        info!(
            mean_us = stats.mean_us,
            p50_us = stats.p50_us,
            p95_us = stats.p95_us,
            p99_us = stats.p99_us,
            max_us = stats.max_us,
            "Batch scoring time (us)"
        );

        let dist_total: u64 = score_dist.iter().sum();
        if dist_total > 0 {
            for (i, &count) in score_dist.iter().enumerate() {
                let pct = (count as f64 / dist_total as f64) * 100.0;
                info!(
                    bucket = format!("{:.1}-{:.1}", i as f64 / 10.0, (i + 1) as f64 / 10.0),
                    count = count,
                    pct = format!("{:.1}", pct),
                    "Score distribution"
                );
            }
        }
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Batch scoring time statistics
#[derive(Debug, Default)]
pub struct BatchStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ScoringMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ScoringMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
