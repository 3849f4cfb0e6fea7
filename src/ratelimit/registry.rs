//! Named collection of independently configured controllers.
//!
//! An application that needs different quotas per endpoint builds one
//! registry and passes it to whatever handles requests, instead of relying
//! on a process-wide limiter.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::clock::{Clock, SystemClock};
use super::limiter::AdmissionController;
use crate::config::RegistryConfig;
use crate::error::{ConfigurationError, Result};

/// Controllers indexed by limiter name.
#[derive(Default)]
pub struct LimiterRegistry {
    limiters: RwLock<HashMap<String, Arc<AdmissionController>>>,
}

impl LimiterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a controller for every limiter in `config`, reading a [`SystemClock`].
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Build a controller for every limiter in `config`, all sharing `clock`.
    pub fn from_config_with_clock(config: &RegistryConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let registry = Self::new();
        for (name, limiter_config) in &config.limiters {
            let controller = limiter_config.build_with_clock(Arc::clone(&clock))?;
            registry.insert(name, controller)?;
        }

        info!(limiters = registry.len(), "Limiter registry loaded");
        Ok(registry)
    }

    /// Register `controller` under `name`.
    ///
    /// Names are unique; registering the same name twice fails.
    pub fn insert(&self, name: &str, controller: AdmissionController) -> Result<Arc<AdmissionController>> {
        let mut limiters = self.limiters.write();
        if limiters.contains_key(name) {
            warn!(limiter = %name, "Rejecting duplicate limiter name");
            return Err(ConfigurationError::DuplicateLimiter(name.to_string()));
        }

        let controller = Arc::new(controller);
        limiters.insert(name.to_string(), Arc::clone(&controller));
        Ok(controller)
    }

    /// Look up a controller by name.
    pub fn get(&self, name: &str) -> Option<Arc<AdmissionController>> {
        self.limiters.read().get(name).cloned()
    }

    /// Evaluate a request against the named limiter.
    ///
    /// Returns `None` when no limiter is registered under `name`.
    pub fn is_too_frequent(&self, name: &str, caller_id: &str) -> Option<bool> {
        self.get(name).map(|limiter| limiter.is_too_frequent(caller_id))
    }

    /// Registered limiter names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.limiters.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered limiters.
    pub fn len(&self) -> usize {
        self.limiters.read().len()
    }

    /// Whether no limiter is registered.
    pub fn is_empty(&self) -> bool {
        self.limiters.read().is_empty()
    }
}
