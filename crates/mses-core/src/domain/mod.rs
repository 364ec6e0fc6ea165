pub mod errors;

pub use errors::{
    ComputeResult, DecodeResult, ExitPlaceholder, MsesError, MsesErrorCategory, MsesResult,
};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Which free variable the solver held fixed while converging the polar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolarDriver {
    #[default]
    Alpha,
    LiftCoefficient,
}

impl PolarDriver {
    pub const fn from_cl_driven(cl_driven: bool) -> Self {
        if cl_driven {
            Self::LiftCoefficient
        } else {
            Self::Alpha
        }
    }

    pub const fn is_cl_driven(self) -> bool {
        matches!(self, Self::LiftCoefficient)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceSide {
    Upper,
    Lower,
}

impl SurfaceSide {
    pub const BOTH: [Self; 2] = [Self::Upper, Self::Lower];

    pub const fn offset(self) -> usize {
        match self {
            Self::Upper => 0,
            Self::Lower => 1,
        }
    }

    /// Position of `(body, side)` in the `2*nbl` side enumeration.
    pub const fn side_index(body: usize, side: Self) -> usize {
        2 * body + side.offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Functional {
    Alpha,
    Cl,
    Cd,
    Cdp,
    Cdv,
    Cdw,
    Cm,
}

impl Functional {
    pub const ALL: [Self; 7] = [
        Self::Alpha,
        Self::Cl,
        Self::Cd,
        Self::Cdp,
        Self::Cdv,
        Self::Cdw,
        Self::Cm,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "Alpha",
            Self::Cl => "CL",
            Self::Cd => "CD",
            Self::Cdp => "CD_p",
            Self::Cdv => "CD_v",
            Self::Cdw => "CD_w",
            Self::Cm => "CM",
        }
    }
}

impl Display for Functional {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
