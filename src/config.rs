//! Configuration management for Ratewarden.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ConfigurationError, Result};
use crate::ratelimit::{AdmissionController, Clock, Strategy, SystemClock};

/// Settings for a single admission controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum requests per window
    #[serde(default = "default_limit")]
    pub limit: u64,

    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Admission algorithm
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_ms: default_window_ms(),
            strategy: default_strategy(),
        }
    }
}

fn default_limit() -> u64 {
    1000
}

fn default_window_ms() -> u64 {
    1000
}

fn default_strategy() -> Strategy {
    Strategy::Sliding
}

impl LimiterConfig {
    /// The window as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Validate and build a controller reading a [`SystemClock`].
    pub fn build(&self) -> Result<AdmissionController> {
        self.build_with_clock(Arc::new(SystemClock::new()))
    }

    /// Validate and build a controller reading `clock`.
    pub fn build_with_clock(&self, clock: Arc<dyn Clock>) -> Result<AdmissionController> {
        AdmissionController::with_clock(self.limit, self.window(), self.strategy, clock)
    }
}

/// Settings for a set of named controllers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Limiter name to limiter settings
    #[serde(default)]
    pub limiters: HashMap<String, LimiterConfig>,
}

impl RegistryConfig {
    /// Parse registry settings from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| ConfigurationError::Parse(format!("Failed to parse limiter config: {}", e)))
    }
}
