//! Parametric boundary curves carrying a design-variable displacement field.
//!
//! A curve is fitted through boundary samples of one body together with the
//! per-sample `(dx, dy)` sensitivity to a single design-variable component.
//! Solver boundary points are matched to the curve by inverse evaluation, never
//! by index, since the two point sets need not coincide.

use crate::common::CurveConfig;
use crate::numerics::{CubicSpline, SplineError};

const NEWTON_STEP_FRACTION: f64 = 1.0e-14;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("curve has {points} samples but {sensitivities} sensitivity vectors")]
    LengthMismatch { points: usize, sensitivities: usize },
    #[error("curve fit failed: {0}")]
    Spline(#[from] SplineError),
    #[error("point ({x}, {y}) lies {distance:e} from the curve, tolerance {tolerance:e}")]
    OffCurve {
        x: f64,
        y: f64,
        distance: f64,
        tolerance: f64,
    },
}

pub trait BoundaryCurve {
    /// Curve parameter of the point closest to `point`.
    fn invert(&self, point: [f64; 2], config: &CurveConfig) -> Result<f64, CurveError>;

    /// Displacement field evaluated at `parameter`.
    fn displacement(&self, parameter: f64) -> [f64; 2];
}

/// Natural cubic spline in chord length, with the sensitivity field
/// interpolated on the same basis as the coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatingCurve {
    x: CubicSpline,
    y: CubicSpline,
    dx: CubicSpline,
    dy: CubicSpline,
}

impl InterpolatingCurve {
    pub fn fit(points: &[[f64; 2]], sensitivities: &[[f64; 2]]) -> Result<Self, CurveError> {
        if points.len() != sensitivities.len() {
            return Err(CurveError::LengthMismatch {
                points: points.len(),
                sensitivities: sensitivities.len(),
            });
        }

        let knots = chord_lengths(points);
        let column = |values: &[[f64; 2]], axis: usize| -> Vec<f64> {
            values.iter().map(|value| value[axis]).collect()
        };
        Ok(Self {
            x: CubicSpline::fit(&knots, &column(points, 0))?,
            y: CubicSpline::fit(&knots, &column(points, 1))?,
            dx: CubicSpline::fit(&knots, &column(sensitivities, 0))?,
            dy: CubicSpline::fit(&knots, &column(sensitivities, 1))?,
        })
    }

    pub fn knots(&self) -> &[f64] {
        self.x.knots()
    }

    pub fn position(&self, parameter: f64) -> [f64; 2] {
        [self.x.evaluate(parameter), self.y.evaluate(parameter)]
    }

    pub fn tangent(&self, parameter: f64) -> [f64; 2] {
        [self.x.derivative(parameter), self.y.derivative(parameter)]
    }

    fn distance(&self, point: [f64; 2], parameter: f64) -> f64 {
        let [x, y] = self.position(parameter);
        (x - point[0]).hypot(y - point[1])
    }

    /// Closest parameter within `[lo, hi]`, comparing the Newton result
    /// against both segment ends.
    fn closest_on_segment(&self, point: [f64; 2], lo: f64, hi: f64, iterations: usize) -> f64 {
        let mut parameter = 0.5 * (lo + hi);
        for _ in 0..iterations {
            let [x, y] = self.position(parameter);
            let [tx, ty] = self.tangent(parameter);
            let (cx, cy) = (
                self.x.second_derivative(parameter),
                self.y.second_derivative(parameter),
            );
            let (rx, ry) = (x - point[0], y - point[1]);
            let gradient = rx * tx + ry * ty;
            let hessian = tx * tx + ty * ty + rx * cx + ry * cy;
            if hessian <= 0.0 {
                break;
            }

            let next = (parameter - gradient / hessian).clamp(lo, hi);
            let converged = (next - parameter).abs() <= NEWTON_STEP_FRACTION * (hi - lo);
            parameter = next;
            if converged {
                break;
            }
        }

        [lo, hi]
            .into_iter()
            .fold(parameter, |best, candidate| {
                if self.distance(point, candidate) < self.distance(point, best) {
                    candidate
                } else {
                    best
                }
            })
    }
}

impl BoundaryCurve for InterpolatingCurve {
    fn invert(&self, point: [f64; 2], config: &CurveConfig) -> Result<f64, CurveError> {
        let mut best: Option<(f64, f64)> = None;
        for window in self.knots().windows(2) {
            let parameter =
                self.closest_on_segment(point, window[0], window[1], config.max_newton_iterations);
            let distance = self.distance(point, parameter);
            if best.is_none_or(|(closest, _)| distance < closest) {
                best = Some((distance, parameter));
            }
        }

        match best {
            Some((distance, parameter)) if distance <= config.tolerance => Ok(parameter),
            found => Err(CurveError::OffCurve {
                x: point[0],
                y: point[1],
                distance: found.map_or(f64::INFINITY, |(distance, _)| distance),
                tolerance: config.tolerance,
            }),
        }
    }

    fn displacement(&self, parameter: f64) -> [f64; 2] {
        [self.dx.evaluate(parameter), self.dy.evaluate(parameter)]
    }
}

fn chord_lengths(points: &[[f64; 2]]) -> Vec<f64> {
    let mut knots = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (index, point) in points.iter().enumerate() {
        if index > 0 {
            let previous = points[index - 1];
            total += (point[0] - previous[0]).hypot(point[1] - previous[1]);
        }
        knots.push(total);
    }
    knots
}
