//! Analysis configuration read from YAML.

use serde::{Deserialize, Serialize};

/// Options handed to the tunnel log parser
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TunnelOptions {
    /// Width of a throughput bin in milliseconds
    #[serde(default = "default_ms_per_bin")]
    pub ms_per_bin: u64,
    /// Flow to analyse; the lowest flow id in the log when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<u32>,
}

fn default_ms_per_bin() -> u64 {
    500
}

fn default_run_id() -> u32 {
    1
}

impl Default for TunnelOptions {
    fn default() -> Self {
        Self {
            ms_per_bin: default_ms_per_bin(),
            flow: None,
        }
    }
}

/// Analysis configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Pantheon run number used in log file names (`..._run{N}.log`)
    #[serde(default = "default_run_id")]
    pub run_id: u32,
    #[serde(default)]
    pub tunnel: TunnelOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            run_id: default_run_id(),
            tunnel: TunnelOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.run_id == 0 {
            return Err(ValidationError::InvalidGeneral(
                "run_id starts at 1".to_string(),
            ));
        }
        if self.tunnel.ms_per_bin == 0 {
            return Err(ValidationError::InvalidTunnel(
                "ms_per_bin must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid tunnel configuration: {0}")]
    InvalidTunnel(String),
}
