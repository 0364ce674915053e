//! Pregel run configuration
//!
//! Configuration for the superstep executor: batch size, worker
//! concurrency, iteration budget, message delivery mode and seeding.
//! All options are read once when a run starts.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Semaphore;

use super::error::PregelError;

/// Default number of node ids handed to a single batch task
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default superstep budget
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Pregel run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PregelConfig {
    /// Uniform seed for every node value (`None` seeds `1 / node_count`)
    pub initial_node_value: Option<f64>,

    /// Mirror sent messages into the current generation
    pub is_asynchronous: bool,

    /// Node ids per batch task
    pub batch_size: usize,

    /// Maximum supersteps before the run stops
    pub max_iterations: usize,

    /// Maximum batch tasks executing at once
    pub concurrency: usize,

    /// Time budget for the whole run, checked at every barrier
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Emit per-superstep tracing events
    pub tracing_enabled: bool,
}

impl Default for PregelConfig {
    fn default() -> Self {
        Self {
            initial_node_value: None,
            is_asynchronous: false,
            batch_size: DEFAULT_BATCH_SIZE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            concurrency: num_cpus::get(),
            timeout: None,
            tracing_enabled: true,
        }
    }
}

impl PregelConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every node with the same value
    pub fn with_initial_node_value(mut self, value: f64) -> Self {
        self.initial_node_value = Some(value);
        self
    }

    /// Select asynchronous (`true`) or synchronous message delivery
    pub fn with_asynchronous(mut self, asynchronous: bool) -> Self {
        self.is_asynchronous = asynchronous;
        self
    }

    /// Set batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set maximum supersteps
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set worker concurrency
    ///
    /// Zero is rejected by [`validate`](Self::validate).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the run time budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable per-superstep tracing
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing_enabled = enabled;
        self
    }

    /// Check the configuration before a run allocates anything
    pub fn validate(&self) -> Result<(), PregelError> {
        if self.batch_size < 1 {
            return Err(PregelError::config_error(format!(
                "batch_size must be at least 1, got {}",
                self.batch_size
            )));
        }
        if self.concurrency < 1 || self.concurrency > Semaphore::MAX_PERMITS {
            return Err(PregelError::config_error(format!(
                "concurrency must be between 1 and {}, got {}",
                Semaphore::MAX_PERMITS,
                self.concurrency
            )));
        }
        if self.max_iterations < 1 {
            return Err(PregelError::config_error(format!(
                "max_iterations must be at least 1, got {}",
                self.max_iterations
            )));
        }
        if let Some(value) = self.initial_node_value {
            if !value.is_finite() {
                return Err(PregelError::config_error(format!(
                    "initial_node_value must be finite, got {}",
                    value
                )));
            }
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(PregelError::config_error("timeout must be non-zero"));
        }
        Ok(())
    }

    /// Seed used when no per-node seed function is supplied
    pub fn default_node_value(&self, node_count: usize) -> f64 {
        match self.initial_node_value {
            Some(value) => value,
            None if node_count == 0 => 0.0,
            None => 1.0 / node_count as f64,
        }
    }
}
