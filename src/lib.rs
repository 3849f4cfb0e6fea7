//! Ratewarden - In-process Admission Control
//!
//! This crate decides, per caller identity and per call, whether a request
//! fits a configured quota over a time window. Two algorithms are available:
//! a fixed window counter and a sliding window log. Controllers are plain
//! values owned by the application; several differently configured ones can
//! live side by side in a [`ratelimit::LimiterRegistry`].

pub mod config;
pub mod error;
pub mod ratelimit;

pub use error::{ConfigurationError, Result};
pub use ratelimit::{AdmissionController, Decision, Strategy};
