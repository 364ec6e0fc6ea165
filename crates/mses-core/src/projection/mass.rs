use super::displacement::BoundaryDisplacement;
use super::functional::ModalCoefficients;
use crate::domain::{ComputeResult, MsesError};
use crate::numerics::{DenseMatrix, LuDecomposition, lu_factorize};
use crate::sensx::SensitivityData;
use tracing::{debug, info};

/// Mode-shape Gram matrix together with its LU factors.
#[derive(Debug, Clone, PartialEq)]
pub struct FactoredMassMatrix {
    matrix: DenseMatrix,
    factors: LuDecomposition,
}

impl FactoredMassMatrix {
    pub fn mode_count(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }

    pub fn factors(&self) -> &LuDecomposition {
        &self.factors
    }

    pub fn solve(&self, rhs: &[f64]) -> ComputeResult<Vec<f64>> {
        self.factors.solve(rhs).map_err(|error| {
            MsesError::computation(
                "RUN.MODAL_SOLVE",
                format!("modal projection solve failed: {error}"),
            )
        })
    }
}

/// Assembles `M[im][jm]`, the trapezoidal boundary integral of the inner
/// product of two modes' `(xbi, ybi)` derivative fields.
///
/// Only the upper triangle is accumulated; the lower one is its mirror, so
/// the result is exactly symmetric.
pub fn assemble_mass_matrix(data: &SensitivityData) -> ComputeResult<DenseMatrix> {
    check_sensitivity_shapes(data)?;
    let lengths = segment_lengths(data);
    let nmod = data.mode_count();

    let mut matrix = DenseMatrix::zeros(nmod, nmod);
    for im in 0..nmod {
        for jm in im..nmod {
            let mut sum = 0.0;
            for (side, ds) in lengths.iter().enumerate() {
                let lhs = &data.modes[im].sides[side];
                let rhs = &data.modes[jm].sides[side];
                sum += boundary_inner_product(&lhs.xbi, &lhs.ybi, &rhs.xbi, &rhs.ybi, ds);
            }
            matrix[(im, jm)] = sum;
            matrix[(jm, im)] = sum;
        }
    }

    Ok(matrix)
}

pub fn build_mass_matrix(data: &SensitivityData) -> ComputeResult<FactoredMassMatrix> {
    let matrix = assemble_mass_matrix(data)?;
    let factors = lu_factorize(&matrix).map_err(|error| {
        MsesError::computation(
            "RUN.MASS_MATRIX",
            format!(
                "mass matrix for {} modes cannot be factored: {error}",
                data.mode_count()
            ),
        )
    })?;
    info!(nmod = data.mode_count(), "mass matrix factored");
    Ok(FactoredMassMatrix { matrix, factors })
}

/// Right-hand side of the projection: each mode's field integrated against
/// the supplied displacement with the mass-matrix quadrature.
pub fn assemble_projection_rhs(
    data: &SensitivityData,
    displacement: &BoundaryDisplacement,
) -> ComputeResult<Vec<f64>> {
    check_sensitivity_shapes(data)?;
    displacement.check_against(data)?;
    let lengths = segment_lengths(data);

    let rhs = data
        .modes
        .iter()
        .map(|mode| {
            lengths
                .iter()
                .enumerate()
                .map(|(side, ds)| {
                    let field = &mode.sides[side];
                    let disp = &displacement.sides[side];
                    boundary_inner_product(&field.xbi, &field.ybi, &disp.disp_x, &disp.disp_y, ds)
                })
                .fold(0.0, |sum, term| sum + term)
        })
        .collect();
    Ok(rhs)
}

pub fn project_displacement(
    mass: &FactoredMassMatrix,
    data: &SensitivityData,
    displacement: &BoundaryDisplacement,
) -> ComputeResult<ModalCoefficients> {
    if mass.mode_count() != data.mode_count() {
        return Err(MsesError::computation(
            "RUN.MODAL_SOLVE",
            format!(
                "mass matrix covers {} modes but the data has {}",
                mass.mode_count(),
                data.mode_count()
            ),
        ));
    }
    let rhs = assemble_projection_rhs(data, displacement)?;
    let values = mass.solve(&rhs)?;
    debug!(?values, "modal coefficients solved");
    Ok(ModalCoefficients::new(values))
}

fn check_sensitivity_shapes(data: &SensitivityData) -> ComputeResult<()> {
    data.check_shapes()
        .map_err(|message| MsesError::malformed("FORMAT.SENSITIVITY_SHAPE", message))
}

/// Euclidean segment lengths between consecutive boundary points, per side.
fn segment_lengths(data: &SensitivityData) -> Vec<Vec<f64>> {
    data.sides
        .iter()
        .map(|side| {
            side.xbi
                .windows(2)
                .zip(side.ybi.windows(2))
                .map(|(x, y)| (x[1] - x[0]).hypot(y[1] - y[0]))
                .collect()
        })
        .collect()
}

fn boundary_inner_product(ax: &[f64], ay: &[f64], bx: &[f64], by: &[f64], ds: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (is, length) in ds.iter().enumerate() {
        sum += 0.5
            * (ax[is] * bx[is] + ay[is] * by[is] + ax[is + 1] * bx[is + 1] + ay[is + 1] * by[is + 1])
            * length;
    }
    sum
}
