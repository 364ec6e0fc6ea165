use crate::common::constants::RADDEG;
use crate::domain::{ComputeResult, Functional, MsesError, PolarDriver};
use crate::sensx::{ModalScalars, SensitivityData};
use serde::Serialize;

/// Derivative of each mode coefficient with respect to one design-variable
/// component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModalCoefficients {
    values: Vec<f64>,
}

impl ModalCoefficients {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Identity column: the design variable is mode `mode`'s own coefficient.
    pub fn unit(mode_count: usize, mode: usize) -> Self {
        let mut values = vec![0.0; mode_count];
        if let Some(value) = values.get_mut(mode) {
            *value = 1.0;
        }
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FunctionalDerivatives {
    #[serde(rename = "Alpha")]
    pub alpha: f64,
    #[serde(rename = "CL")]
    pub cl: f64,
    #[serde(rename = "CD")]
    pub cd: f64,
    #[serde(rename = "CD_p")]
    pub cdp: f64,
    #[serde(rename = "CD_v")]
    pub cdv: f64,
    #[serde(rename = "CD_w")]
    pub cdw: f64,
    #[serde(rename = "CM")]
    pub cm: f64,
}

impl FunctionalDerivatives {
    pub fn get(&self, functional: Functional) -> f64 {
        match functional {
            Functional::Alpha => self.alpha,
            Functional::Cl => self.cl,
            Functional::Cd => self.cd,
            Functional::Cdp => self.cdp,
            Functional::Cdv => self.cdv,
            Functional::Cdw => self.cdw,
            Functional::Cm => self.cm,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Functional, f64)> + '_ {
        Functional::ALL
            .into_iter()
            .map(|functional| (functional, self.get(functional)))
    }

    fn accumulate(&mut self, scalars: &ModalScalars, coefficient: f64) {
        self.alpha += scalars.al * coefficient;
        self.cl += scalars.cl * coefficient;
        self.cd += (scalars.cdv + scalars.cdw) * coefficient;
        self.cdp += (scalars.cdv + scalars.cdw - scalars.cdf) * coefficient;
        self.cdv += scalars.cdv * coefficient;
        self.cdw += scalars.cdw * coefficient;
        self.cm += scalars.cm * coefficient;
    }

    /// Implicit-function correction for a polar that held CL fixed.
    fn cl_driven(self, cl_alfa_rad: f64) -> Self {
        Self {
            alpha: -self.cl / cl_alfa_rad,
            cl: self.cl,
            cd: self.cd / cl_alfa_rad,
            cdp: self.cdp / cl_alfa_rad,
            cdv: self.cdv / cl_alfa_rad,
            cdw: self.cdw / cl_alfa_rad,
            cm: self.cm / cl_alfa_rad,
        }
    }
}

pub fn assemble_functional_derivatives(
    data: &SensitivityData,
    coefficients: &ModalCoefficients,
    driver: PolarDriver,
) -> ComputeResult<FunctionalDerivatives> {
    if coefficients.len() != data.mode_count() {
        return Err(MsesError::computation(
            "RUN.MODAL_COEFFICIENTS",
            format!(
                "{} modal coefficients supplied for {} modes",
                coefficients.len(),
                data.mode_count()
            ),
        ));
    }

    let mut derivatives = FunctionalDerivatives::default();
    for (mode, coefficient) in data.modes.iter().zip(coefficients.values()) {
        derivatives.accumulate(&mode.scalars, *coefficient);
    }

    match driver {
        PolarDriver::Alpha => Ok(derivatives),
        PolarDriver::LiftCoefficient => {
            let cl_alfa_rad = data.forces.alfa.cl / RADDEG;
            if cl_alfa_rad == 0.0 || !cl_alfa_rad.is_finite() {
                return Err(MsesError::computation(
                    "RUN.CL_ALFA",
                    format!(
                        "CL-driven correction needs a finite nonzero lift slope, got {}",
                        data.forces.alfa.cl
                    ),
                ));
            }
            Ok(derivatives.cl_driven(cl_alfa_rad))
        }
    }
}

/// Derivatives when the design variable is mode `mode`'s coefficient itself.
pub fn modal_coefficient_derivatives(
    data: &SensitivityData,
    mode: usize,
    driver: PolarDriver,
) -> ComputeResult<FunctionalDerivatives> {
    if mode >= data.mode_count() {
        return Err(MsesError::computation(
            "RUN.MODAL_COEFFICIENTS",
            format!(
                "mode {mode} is out of range for {} modes",
                data.mode_count()
            ),
        ));
    }
    let coefficients = ModalCoefficients::unit(data.mode_count(), mode);
    assemble_functional_derivatives(data, &coefficients, driver)
}
