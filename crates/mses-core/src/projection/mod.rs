//! Projection of design-variable boundary displacements onto the solver's
//! shape modes, and assembly of the resulting functional derivatives.

mod displacement;
mod functional;
mod mass;

pub use displacement::{BoundaryDisplacement, SideDisplacement, sample_displacement};
pub use functional::{
    FunctionalDerivatives, ModalCoefficients, assemble_functional_derivatives,
    modal_coefficient_derivatives,
};
pub use mass::{
    FactoredMassMatrix, assemble_mass_matrix, assemble_projection_rhs, build_mass_matrix,
    project_displacement,
};

use crate::common::{CurveConfig, FailurePolicy, MsesConfig};
use crate::curve::BoundaryCurve;
use crate::domain::{ComputeResult, MsesError, PolarDriver};
use crate::sensx::SensitivityData;
use tracing::{debug, warn};

/// Result of one design-variable component in a multi-component run.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentOutcome {
    pub index: usize,
    pub result: ComputeResult<FunctionalDerivatives>,
}

/// One factored mass matrix reused across every design-variable component
/// evaluated against the same sensitivity data.
#[derive(Debug, Clone)]
pub struct ProjectionSession<'a> {
    data: &'a SensitivityData,
    mass: FactoredMassMatrix,
    driver: PolarDriver,
    curve: CurveConfig,
    failure_policy: FailurePolicy,
}

impl<'a> ProjectionSession<'a> {
    pub fn new(
        data: &'a SensitivityData,
        driver: PolarDriver,
        config: &MsesConfig,
    ) -> ComputeResult<Self> {
        Ok(Self {
            data,
            mass: build_mass_matrix(data)?,
            driver,
            curve: config.curve,
            failure_policy: config.failure_policy,
        })
    }

    pub fn data(&self) -> &SensitivityData {
        self.data
    }

    pub fn mass_matrix(&self) -> &FactoredMassMatrix {
        &self.mass
    }

    pub fn driver(&self) -> PolarDriver {
        self.driver
    }

    pub fn evaluate(
        &self,
        displacement: &BoundaryDisplacement,
    ) -> ComputeResult<FunctionalDerivatives> {
        let coefficients = project_displacement(&self.mass, self.data, displacement)?;
        assemble_functional_derivatives(self.data, &coefficients, self.driver)
    }

    /// Samples one curve per body and evaluates the resulting displacement.
    pub fn evaluate_curves<C: BoundaryCurve>(
        &self,
        curves: &[C],
    ) -> ComputeResult<FunctionalDerivatives> {
        let displacement = sample_displacement(self.data, curves, &self.curve)?;
        self.evaluate(&displacement)
    }

    /// Evaluates components in order.
    ///
    /// Under [`FailurePolicy::AbortAll`] the first failing component ends the
    /// run with its error; under [`FailurePolicy::Continue`] every component
    /// is attempted and failures are reported in its outcome.
    pub fn evaluate_components<C, I>(&self, components: I) -> ComputeResult<Vec<ComponentOutcome>>
    where
        C: BoundaryCurve,
        I: IntoIterator<Item = ComputeResult<Vec<C>>>,
    {
        let mut outcomes = Vec::new();
        for (index, curves) in components.into_iter().enumerate() {
            let result = curves.and_then(|curves| self.evaluate_curves(&curves));
            match (&result, self.failure_policy) {
                (Ok(derivatives), _) => {
                    debug!(index, ?derivatives, "design-variable component evaluated");
                }
                (Err(error), FailurePolicy::AbortAll) => {
                    return Err(component_error(index, error));
                }
                (Err(error), FailurePolicy::Continue) => {
                    warn!(index, error = %error, "design-variable component failed");
                }
            }
            outcomes.push(ComponentOutcome { index, result });
        }
        Ok(outcomes)
    }
}

fn component_error(index: usize, error: &MsesError) -> MsesError {
    MsesError::new(
        error.category(),
        error.placeholder(),
        format!("component {index}: {}", error.message()),
    )
}
