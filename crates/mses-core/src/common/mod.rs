pub mod config;
pub mod constants;

pub use config::{
    ConfigError, CurveConfig, DecodeLimits, FailurePolicy, MsesConfig, PositionBlockPolicy,
    load_config,
};
