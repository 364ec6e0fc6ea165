//! Natural cubic splines over a strictly increasing knot sequence.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    #[error("a spline needs at least 2 samples, got {count}")]
    TooFewSamples { count: usize },
    #[error("knot and value counts differ: {knots} knots, {values} values")]
    LengthMismatch { knots: usize, values: usize },
    #[error("knots must be strictly increasing at index {index}")]
    NonIncreasingKnots { index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    second: Vec<f64>,
}

impl CubicSpline {
    pub fn fit(knots: &[f64], values: &[f64]) -> Result<Self, SplineError> {
        if knots.len() != values.len() {
            return Err(SplineError::LengthMismatch {
                knots: knots.len(),
                values: values.len(),
            });
        }
        let count = knots.len();
        if count < 2 {
            return Err(SplineError::TooFewSamples { count });
        }
        if let Some(index) = knots.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(SplineError::NonIncreasingKnots { index: index + 1 });
        }

        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            second: natural_second_derivatives(knots, values),
        })
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn segment_count(&self) -> usize {
        self.knots.len() - 1
    }

    /// Segment holding `t`; parameters outside the knot range use the end segments.
    pub fn segment(&self, t: f64) -> usize {
        let last = self.segment_count() - 1;
        match self.knots.partition_point(|knot| *knot <= t) {
            0 => 0,
            upper => (upper - 1).min(last),
        }
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        let (i, h, a, b) = self.local(t);
        self.second[i] * a * a * a / (6.0 * h)
            + self.second[i + 1] * b * b * b / (6.0 * h)
            + (self.values[i] / h - self.second[i] * h / 6.0) * a
            + (self.values[i + 1] / h - self.second[i + 1] * h / 6.0) * b
    }

    pub fn derivative(&self, t: f64) -> f64 {
        let (i, h, a, b) = self.local(t);
        -self.second[i] * a * a / (2.0 * h) + self.second[i + 1] * b * b / (2.0 * h)
            - (self.values[i] / h - self.second[i] * h / 6.0)
            + (self.values[i + 1] / h - self.second[i + 1] * h / 6.0)
    }

    pub fn second_derivative(&self, t: f64) -> f64 {
        let (i, h, a, b) = self.local(t);
        (self.second[i] * a + self.second[i + 1] * b) / h
    }

    fn local(&self, t: f64) -> (usize, f64, f64, f64) {
        let i = self.segment(t);
        let h = self.knots[i + 1] - self.knots[i];
        (i, h, self.knots[i + 1] - t, t - self.knots[i])
    }
}

fn natural_second_derivatives(knots: &[f64], values: &[f64]) -> Vec<f64> {
    let n = knots.len();
    let mut second = vec![0.0; n];
    if n < 3 {
        return second;
    }

    let interior = n - 2;
    let mut sub = vec![0.0; interior];
    let mut diag = vec![0.0; interior];
    let mut sup = vec![0.0; interior];
    let mut rhs = vec![0.0; interior];
    for row in 0..interior {
        let i = row + 1;
        let h_left = knots[i] - knots[i - 1];
        let h_right = knots[i + 1] - knots[i];
        sub[row] = h_left;
        diag[row] = 2.0 * (h_left + h_right);
        sup[row] = h_right;
        rhs[row] = 6.0
            * ((values[i + 1] - values[i]) / h_right - (values[i] - values[i - 1]) / h_left);
    }

    let solution = thomas_solve(&sub, &diag, &sup, &rhs);
    second[1..n - 1].copy_from_slice(&solution);
    second
}

/// Tridiagonal solve; the system here is strictly diagonally dominant.
fn thomas_solve(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = rhs.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    c_prime[0] = sup[0] / diag[0];
    d_prime[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denominator = diag[i] - sub[i] * c_prime[i - 1];
        if i < n - 1 {
            c_prime[i] = sup[i] / denominator;
        }
        d_prime[i] = (rhs[i] - sub[i] * d_prime[i - 1]) / denominator;
    }

    let mut solution = vec![0.0; n];
    solution[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        solution[i] = d_prime[i] - c_prime[i] * solution[i + 1];
    }
    solution
}
