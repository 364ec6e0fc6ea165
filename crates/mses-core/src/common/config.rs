//! Run configuration for the decoders and the projection engine.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MsesConfig {
    pub decode_limits: DecodeLimits,
    pub position_block: PositionBlockPolicy,
    pub curve: CurveConfig,
    pub failure_policy: FailurePolicy,
}

/// Upper bounds applied to sizing scalars before anything is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecodeLimits {
    pub max_streamwise_points: usize,
    pub max_streamlines: usize,
    pub max_bodies: usize,
    pub max_modes: usize,
    pub max_positions: usize,
    /// mdat wall-normal probes.
    pub max_probes: usize,
    /// Points per mdat probe profile.
    pub max_profile_points: usize,
    pub max_record_elements: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_streamwise_points: 100_000,
            max_streamlines: 10_000,
            max_bodies: 64,
            max_modes: 4_096,
            max_positions: 4_096,
            max_probes: 4_096,
            max_profile_points: 100_000,
            max_record_elements: 50_000_000,
        }
    }
}

/// How the sensx decoder treats the shape-position block.
///
/// `LegacySkip` keeps the historical guard, which only enters the block when
/// `npos == 0` and therefore never populates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionBlockPolicy {
    #[default]
    LegacySkip,
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurveConfig {
    pub tolerance: f64,
    pub max_newton_iterations: usize,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.0e-6,
            max_newton_iterations: 50,
        }
    }
}

/// What a multi-component projection run does after one component fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    #[default]
    AbortAll,
    Continue,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_config(config_path: impl AsRef<Path>) -> Result<MsesConfig, ConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}
