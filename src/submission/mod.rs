//! Contact submission transport
//!
//! The contact form posts to `/api/contact`. There is no backend behind the
//! site, so the production client is a simulation with a fixed delay and a
//! configurable failure rate.

mod simulated;

pub use simulated::SimulatedSubmissionClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::FormSubmission;

/// Acknowledgement of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Identifier quoted back to the visitor
    pub submission_id: String,
    /// When the endpoint accepted the submission
    pub received_at: DateTime<Utc>,
}

/// Sends contact submissions to the lead endpoint
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// Send one submission; `Error::Transport` on failure
    async fn submit(&self, submission: &FormSubmission) -> Result<SubmissionReceipt>;
}
