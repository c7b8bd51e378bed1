//! Security helpers for visitor actions
//!
//! This module provides the rate limiter guarding form submission, the clock
//! it reads time from, and the session token attached to every submission.
//! Input sanitization lives with the other validators in
//! [`crate::models::validation`].

pub mod clock;
pub mod rate_limiter;
pub mod token;

pub use clock::{Clock, SystemClock};
pub use rate_limiter::{RateLimitEntry, RateLimiter, DEFAULT_WINDOW};
pub use token::TokenStore;
