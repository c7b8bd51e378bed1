//! Configuration module for fleetswitch
//!
//! This module handles loading and validating configuration from environment
//! variables, providing strongly-typed configuration structures for the
//! router, the security helpers and the page coordinators.

use envconfig::Envconfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure for fleetswitch
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct Config {
    /// Site-wide settings
    #[serde(flatten)]
    #[envconfig(nested)]
    pub site: SiteConfig,

    /// Rate limiting configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub rate_limit: RateLimitConfig,

    /// Contact submission configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub submission: SubmissionConfig,

    /// Savings calculator configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub calculator: CalculatorConfig,
}

/// Site-wide settings
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct SiteConfig {
    /// Log level
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Environment (development, staging, production)
    #[envconfig(from = "ENVIRONMENT", default = "development")]
    pub environment: String,

    /// User agent reported in submission metadata
    #[envconfig(from = "USER_AGENT", default = "fleetswitch-terminal")]
    pub user_agent: String,
}

impl SiteConfig {
    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            environment: "development".to_string(),
            user_agent: "fleetswitch-terminal".to_string(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct RateLimitConfig {
    /// Length of one counting window in seconds
    #[envconfig(from = "RATE_LIMIT_WINDOW_SECS", default = "60")]
    pub window_secs: u64,

    /// Contact submissions allowed per window
    #[envconfig(from = "CONTACT_SUBMIT_LIMIT", default = "3")]
    pub contact_submit_limit: u32,
}

impl RateLimitConfig {
    /// Get the window as Duration
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            contact_submit_limit: 3,
        }
    }
}

/// Contact submission configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct SubmissionConfig {
    /// Artificial latency of the simulated endpoint in milliseconds
    #[envconfig(from = "SUBMISSION_DELAY_MS", default = "1500")]
    pub delay_ms: u64,

    /// Probability in [0, 1] that a simulated submission fails
    #[envconfig(from = "SUBMISSION_FAILURE_RATE", default = "0.1")]
    pub failure_rate: f64,

    /// Endpoint the submission is addressed to
    #[envconfig(from = "SUBMISSION_ENDPOINT", default = "/api/contact")]
    pub endpoint: String,
}

impl SubmissionConfig {
    /// Get the simulated latency as Duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1500,
            failure_rate: 0.1,
            endpoint: "/api/contact".to_string(),
        }
    }
}

/// Savings calculator configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct CalculatorConfig {
    /// Quiet period before recalculating after input, in milliseconds
    #[envconfig(from = "CALCULATOR_DEBOUNCE_MS", default = "300")]
    pub debounce_ms: u64,
}

impl CalculatorConfig {
    /// Get the debounce quiet period as Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            rate_limit: RateLimitConfig::default(),
            submission: SubmissionConfig::default(),
            calculator: CalculatorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenv::dotenv().ok();

        Config::init_from_env().map_err(Error::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit.window_secs == 0 {
            return Err(Error::config("Rate limit window cannot be 0"));
        }

        if self.rate_limit.contact_submit_limit == 0 {
            return Err(Error::config("Contact submit limit must be at least 1"));
        }

        if !(0.0..=1.0).contains(&self.submission.failure_rate) {
            return Err(Error::config(format!(
                "Submission failure rate must be within [0, 1], got {}",
                self.submission.failure_rate
            )));
        }

        if self.submission.endpoint.is_empty() {
            return Err(Error::config("Submission endpoint cannot be empty"));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!(
            environment = %self.site.environment,
            log_level = %self.site.log_level,
            user_agent = %self.site.user_agent,
            "Site configuration"
        );

        tracing::info!(
            window_secs = %self.rate_limit.window_secs,
            contact_submit_limit = %self.rate_limit.contact_submit_limit,
            "Rate limit configuration"
        );

        tracing::info!(
            endpoint = %self.submission.endpoint,
            delay_ms = %self.submission.delay_ms,
            failure_rate = %self.submission.failure_rate,
            "Submission configuration"
        );

        tracing::info!(
            debounce_ms = %self.calculator.debounce_ms,
            "Calculator configuration"
        );
    }
}
