//! NATS producer for batch outcomes

use crate::types::batch::BatchOutcome;
use anyhow::Result;
use async_nats::Client;
use tracing::debug;

/// Producer publishing scoring outcomes back to the harness
#[derive(Clone)]
pub struct OutcomeProducer {
    client: Client,
    subject: String,
}

impl OutcomeProducer {
    /// Create a new outcome producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish one batch outcome
    pub async fn publish(&self, outcome: &BatchOutcome) -> Result<()> {
        let payload = serde_json::to_vec(outcome)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            scored = outcome.is_scored(),
            subject = %self.subject,
            "Published batch outcome"
        );

        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
