use super::CliError;
use anyhow::Context;
use mses_core::common::{ConfigError, MsesConfig, load_config};
use mses_core::curve::{CurveError, InterpolatingCurve};
use mses_core::domain::MsesError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Design-variable components, each described by one boundary curve per body.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct DisplacementFile {
    pub(super) components: Vec<ComponentSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ComponentSpec {
    #[serde(default)]
    pub(super) name: String,
    pub(super) bodies: Vec<BodyCurveSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct BodyCurveSpec {
    pub(super) samples: Vec<CurveSample>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(super) struct CurveSample {
    pub(super) x: f64,
    pub(super) y: f64,
    pub(super) dx: f64,
    pub(super) dy: f64,
}

impl BodyCurveSpec {
    pub(super) fn fit(&self) -> Result<InterpolatingCurve, CurveError> {
        let points: Vec<[f64; 2]> = self.samples.iter().map(|s| [s.x, s.y]).collect();
        let sensitivities: Vec<[f64; 2]> = self.samples.iter().map(|s| [s.dx, s.dy]).collect();
        InterpolatingCurve::fit(&points, &sensitivities)
    }
}

pub(super) fn resolve_config(path: Option<&Path>) -> Result<MsesConfig, CliError> {
    let Some(path) = path else {
        return Ok(MsesConfig::default());
    };
    load_config(path).map_err(|error| {
        let mses_error = match &error {
            ConfigError::Read { .. } => MsesError::io_system("IO.CONFIG_READ", error.to_string()),
            ConfigError::Parse { .. } => MsesError::malformed("FORMAT.CONFIG", error.to_string()),
        };
        CliError::Compute(mses_error)
    })
}

pub(super) fn load_displacement_file(path: &Path) -> Result<DisplacementFile, CliError> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read displacement file '{}'", path.display()))?;
    serde_json::from_str(&source).map_err(|source| {
        CliError::Compute(MsesError::malformed(
            "FORMAT.DISPLACEMENT_JSON",
            format!(
                "failed to parse displacement file '{}': {}",
                path.display(),
                source
            ),
        ))
    })
}

/// Fits every body curve of one component, naming the body that failed.
pub(super) fn fit_component(component: &ComponentSpec) -> Result<Vec<InterpolatingCurve>, MsesError> {
    component
        .bodies
        .iter()
        .enumerate()
        .map(|(body, spec)| {
            spec.fit().map_err(|error| {
                MsesError::computation(
                    "RUN.CURVE_FIT",
                    format!("body {body} curve of component '{}': {error}", component.name),
                )
            })
        })
        .collect()
}
