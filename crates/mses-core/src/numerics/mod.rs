pub mod linalg;
pub mod spline;

pub use linalg::{LuDecomposition, LuError, lu_factorize, lu_solve};
pub use spline::{CubicSpline, SplineError};

use faer::Mat;

pub type DenseMatrix = Mat<f64>;
