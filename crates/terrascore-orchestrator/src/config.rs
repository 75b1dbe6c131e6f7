//! Configuration for batch runs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batch scheduling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Worker count; 1 runs tasks one at a time
    pub parallel: usize,

    /// Pause between two tasks on the same worker, in milliseconds
    pub task_delay_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            parallel: 1,
            task_delay_ms: 0,
        }
    }
}

impl OrchestratorConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.parallel == 0 {
            return Err("parallel must be at least 1".to_string());
        }
        Ok(())
    }

    /// Pause between tasks as a Duration
    pub fn task_delay(&self) -> Duration {
        Duration::from_millis(self.task_delay_ms)
    }

    /// Load from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse config: {}", e))
    }
}
