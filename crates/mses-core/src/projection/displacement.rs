use crate::common::CurveConfig;
use crate::curve::BoundaryCurve;
use crate::domain::{ComputeResult, MsesError, SurfaceSide};
use crate::sensx::SensitivityData;
use serde::Serialize;

/// Displacement of every solver boundary point on one side.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SideDisplacement {
    pub disp_x: Vec<f64>,
    pub disp_y: Vec<f64>,
}

/// Boundary displacement induced by one design-variable component, laid out
/// in the same `2*nbl` side order as the sensitivity data.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BoundaryDisplacement {
    pub sides: Vec<SideDisplacement>,
}

impl BoundaryDisplacement {
    pub fn zeros(data: &SensitivityData) -> Self {
        let sides = data
            .sides
            .iter()
            .map(|side| SideDisplacement {
                disp_x: vec![0.0; side.xbi.len()],
                disp_y: vec![0.0; side.ybi.len()],
            })
            .collect();
        Self { sides }
    }

    /// Mode `mode`'s own boundary-derivative field scaled by `scale`.
    pub fn from_mode_shape(data: &SensitivityData, mode: usize, scale: f64) -> Option<Self> {
        let shape = data.modes.get(mode)?;
        let sides = shape
            .sides
            .iter()
            .map(|side| SideDisplacement {
                disp_x: side.xbi.iter().map(|value| scale * value).collect(),
                disp_y: side.ybi.iter().map(|value| scale * value).collect(),
            })
            .collect();
        Some(Self { sides })
    }

    pub(crate) fn check_against(&self, data: &SensitivityData) -> ComputeResult<()> {
        if self.sides.len() != data.sides.len() {
            return Err(MsesError::malformed(
                "FORMAT.DISPLACEMENT_SHAPE",
                format!(
                    "displacement covers {} sides, sensitivity data has {}",
                    self.sides.len(),
                    data.sides.len()
                ),
            ));
        }
        for (side_index, (displacement, surface)) in self.sides.iter().zip(&data.sides).enumerate()
        {
            let expected = surface.xbi.len();
            if displacement.disp_x.len() != expected || displacement.disp_y.len() != expected {
                return Err(MsesError::malformed(
                    "FORMAT.DISPLACEMENT_SHAPE",
                    format!("displacement side {side_index} must hold {expected} points"),
                ));
            }
        }
        Ok(())
    }
}

/// Evaluates one curve per body at every solver boundary point.
///
/// The first point that cannot be located on its body's curve aborts the
/// whole component.
pub fn sample_displacement<C: BoundaryCurve>(
    data: &SensitivityData,
    curves: &[C],
    config: &CurveConfig,
) -> ComputeResult<BoundaryDisplacement> {
    if curves.len() != data.body_count() {
        return Err(MsesError::malformed(
            "FORMAT.DISPLACEMENT_SHAPE",
            format!(
                "expected one curve per body ({}), got {}",
                data.body_count(),
                curves.len()
            ),
        ));
    }

    let mut sides = Vec::with_capacity(data.sides.len());
    for (body, curve) in curves.iter().enumerate() {
        for side in SurfaceSide::BOTH {
            let side_index = SurfaceSide::side_index(body, side);
            let surface = data.sides.get(side_index).ok_or_else(|| {
                MsesError::malformed(
                    "FORMAT.DISPLACEMENT_SHAPE",
                    format!("sensitivity data has no surface side {side_index}"),
                )
            })?;

            let mut sampled = SideDisplacement {
                disp_x: Vec::with_capacity(surface.xbi.len()),
                disp_y: Vec::with_capacity(surface.xbi.len()),
            };
            for (point_index, (x, y)) in surface.xbi.iter().zip(&surface.ybi).enumerate() {
                let parameter = curve.invert([*x, *y], config).map_err(|error| {
                    MsesError::computation(
                        "RUN.CURVE_INVERSION",
                        format!("body {body} {side:?} side point {point_index}: {error}"),
                    )
                })?;
                let [dx, dy] = curve.displacement(parameter);
                sampled.disp_x.push(dx);
                sampled.disp_y.push(dy);
            }
            sides.push(sampled);
        }
    }

    Ok(BoundaryDisplacement { sides })
}
