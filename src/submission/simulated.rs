//! Simulated contact endpoint

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{SubmissionClient, SubmissionReceipt};
use crate::config::SubmissionConfig;
use crate::error::{Error, Result};
use crate::models::FormSubmission;
use crate::security::TokenStore;

/// Pretends to POST submissions: waits, then fails at random with the
/// configured probability or hands back a fresh submission id.
#[derive(Debug)]
pub struct SimulatedSubmissionClient {
    endpoint: String,
    delay: Duration,
    failure_rate: f64,
    rng: Mutex<StdRng>,
    session_token: Option<TokenStore>,
}

impl SimulatedSubmissionClient {
    /// Create a client with the given latency and failure probability
    pub fn new(endpoint: impl Into<String>, delay: Duration, failure_rate: f64) -> Self {
        Self {
            endpoint: endpoint.into(),
            delay,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Mutex::new(StdRng::from_entropy()),
            session_token: None,
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &SubmissionConfig) -> Self {
        Self::new(config.endpoint.clone(), config.delay(), config.failure_rate)
    }

    /// Make failures reproducible
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Reject submissions not carrying this session's token
    pub fn expecting_token(self, tokens: TokenStore) -> Self {
        Self {
            session_token: Some(tokens),
            ..self
        }
    }

    /// Endpoint submissions are addressed to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn roll_failure(&self) -> bool {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_bool(self.failure_rate)
    }
}

#[async_trait]
impl SubmissionClient for SimulatedSubmissionClient {
    async fn submit(&self, submission: &FormSubmission) -> Result<SubmissionReceipt> {
        let body = serde_json::to_vec(submission)?;
        debug!(
            endpoint = %self.endpoint,
            method = "POST",
            body_bytes = body.len(),
            "Sending contact submission"
        );

        let fails = self.roll_failure();
        tokio::time::sleep(self.delay).await;

        if let Some(tokens) = &self.session_token {
            if !tokens.verify(&submission.csrf_token) {
                warn!(endpoint = %self.endpoint, "Submission rejected: session token mismatch");
                return Err(Error::transport(format!(
                    "POST {} rejected: invalid session token",
                    self.endpoint
                )));
            }
        }

        if fails {
            warn!(endpoint = %self.endpoint, "Simulated network failure");
            return Err(Error::transport(format!(
                "POST {} failed: simulated network error",
                self.endpoint
            )));
        }

        let receipt = SubmissionReceipt {
            submission_id: format!("SUB-{}", Uuid::new_v4().simple()),
            received_at: Utc::now(),
        };
        info!(
            endpoint = %self.endpoint,
            submission_id = %receipt.submission_id,
            "Contact submission accepted"
        );
        Ok(receipt)
    }
}
