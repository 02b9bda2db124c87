//! NATS consumer for incoming row batches

use crate::types::batch::RowBatch;
use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{info, warn};

/// Consumer for receiving row batches from the harness subject
pub struct BatchConsumer {
    client: Client,
    subject: String,
}

impl BatchConsumer {
    /// Create a new batch consumer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Subscribe to the batch subject
    pub async fn subscribe(&self) -> Result<BatchStream> {
        let subscriber = self.client.subscribe(self.subject.clone()).await?;
        info!(subject = %self.subject, "Subscribed to batch subject");
        Ok(BatchStream { subscriber })
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Stream of decoded row batches from a subscription
pub struct BatchStream {
    subscriber: Subscriber,
}

impl BatchStream {
    /// Next decodable batch. Payloads that fail to deserialize are logged
    /// and skipped; `None` means the subscription ended.
    pub async fn next_batch(&mut self) -> Option<RowBatch> {
        while let Some(message) = self.subscriber.next().await {
            if let Some(batch) = decode_batch(&message.payload) {
                return Some(batch);
            }
        }
        None
    }
}

fn decode_batch(payload: &[u8]) -> Option<RowBatch> {
    match serde_json::from_slice(payload) {
        Ok(batch) => Some(batch),
        Err(e) => {
            warn!(error = %e, "Failed to deserialize row batch, skipping");
            None
        }
    }
}
