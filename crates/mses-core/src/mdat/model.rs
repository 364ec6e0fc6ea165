use crate::common::constants::MDAT_BITMASK_WORDS;
use crate::sensx::ModalScalars;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MdatSizing {
    pub ii: usize,
    pub jj: usize,
    pub nbl: usize,
    pub nmod: usize,
    pub npos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SolverSwitches {
    pub ismom: i32,
    pub iffbc: i32,
    pub kalfa: i32,
    pub kmach: i32,
    pub kreyn: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FlowState {
    pub alfa: f64,
    pub mach: f64,
    pub reyn: f64,
    pub acrit: f64,
    pub cl: f64,
    pub cm: f64,
    pub cdw: f64,
    pub cdv: f64,
    pub cdf: f64,
}

impl FlowState {
    pub(crate) fn to_array(self) -> [f64; 9] {
        [
            self.alfa, self.mach, self.reyn, self.acrit, self.cl, self.cm, self.cdw, self.cdv,
            self.cdf,
        ]
    }
}

/// One-based leading/trailing-edge grid indices of a body, as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeIndices {
    pub ileb: i32,
    pub iteb: i32,
}

impl EdgeIndices {
    /// Points on one blade surface side, leading to trailing edge inclusive.
    pub fn blade_len(self) -> usize {
        usize::try_from(self.iteb - self.ileb + 1).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GridLine {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Body-adjacent streamline data, `ii` points per body.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BodyStreamline {
    pub xb: Vec<f64>,
    pub yb: Vec<f64>,
    pub sb: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BoundaryLayerSide {
    pub xbi: Vec<f64>,
    pub ybi: Vec<f64>,
    pub sbi: Vec<f64>,
    pub theta: Vec<f64>,
    pub dstar: Vec<f64>,
    pub uedg: Vec<f64>,
    pub ctau: Vec<f64>,
    pub hk: Vec<f64>,
    pub cf: Vec<f64>,
}

/// Frequency-response tables for every side, stored in one flat arena.
///
/// `offsets` has one more entry than there are sides; side `j` owns the range
/// `offsets[j]..offsets[j + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTables {
    offsets: Vec<usize>,
    freq: Vec<f64>,
    amplitude: Vec<f64>,
    phase: Vec<f64>,
}

impl Default for FrequencyTables {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            freq: Vec::new(),
            amplitude: Vec::new(),
            phase: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencySide<'a> {
    pub freq: &'a [f64],
    pub amplitude: &'a [f64],
    pub phase: &'a [f64],
}

impl FrequencyTables {
    /// Builds the prefix-sum offsets for the given per-side counts.
    pub fn offsets_for(counts: &[usize]) -> Option<Vec<usize>> {
        let mut offsets = Vec::with_capacity(counts.len() + 1);
        let mut total = 0_usize;
        offsets.push(total);
        for count in counts {
            total = total.checked_add(*count)?;
            offsets.push(total);
        }
        Some(offsets)
    }

    pub(crate) fn from_parts(
        offsets: Vec<usize>,
        freq: Vec<f64>,
        amplitude: Vec<f64>,
        phase: Vec<f64>,
    ) -> Self {
        Self {
            offsets,
            freq,
            amplitude,
            phase,
        }
    }

    /// Builds tables from per-side `(freq, amplitude, phase)` columns.
    pub fn from_sides(sides: &[(Vec<f64>, Vec<f64>, Vec<f64>)]) -> Self {
        let counts: Vec<usize> = sides.iter().map(|(freq, _, _)| freq.len()).collect();
        let offsets = Self::offsets_for(&counts).unwrap_or_else(|| vec![0]);
        let mut tables = Self {
            offsets,
            ..Self::default()
        };
        for (freq, amplitude, phase) in sides {
            tables.freq.extend_from_slice(freq);
            tables.amplitude.extend_from_slice(amplitude);
            tables.phase.extend_from_slice(phase);
        }
        tables
    }

    pub fn side_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn nfreq(&self, side: usize) -> usize {
        self.offsets[side + 1] - self.offsets[side]
    }

    pub fn total(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    pub fn side(&self, side: usize) -> FrequencySide<'_> {
        let range = self.offsets[side]..self.offsets[side + 1];
        FrequencySide {
            freq: &self.freq[range.clone()],
            amplitude: &self.amplitude[range.clone()],
            phase: &self.phase[range],
        }
    }
}

/// Wall-normal profile sampled at one surface point.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProbeProfile {
    /// One-based side in the `2*nbl` enumeration.
    pub side: i32,
    /// One-based streamwise point on that side.
    pub point: i32,
    pub eta: Vec<f64>,
    pub q: Vec<f64>,
    pub rho: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitmaskTable {
    pub words: [i32; MDAT_BITMASK_WORDS],
}

impl Default for BitmaskTable {
    fn default() -> Self {
        Self {
            words: [0; MDAT_BITMASK_WORDS],
        }
    }
}

impl BitmaskTable {
    pub fn is_set(&self, flag: usize) -> bool {
        let word = flag / 32;
        let bit = flag % 32;
        self.words
            .get(word)
            .is_some_and(|value| (*value as u32) & (1_u32 << bit) != 0)
    }
}

/// Everything decoded from one mdat file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SolutionData {
    pub code: String,
    pub name: String,
    pub sizing: MdatSizing,
    pub switches: SolverSwitches,
    pub flow: FlowState,
    pub edges: Vec<EdgeIndices>,
    /// `jj` streamlines of `ii` points each.
    pub grid: Vec<GridLine>,
    pub bodies: Vec<BodyStreamline>,
    /// `2*nbl` sides ordered upper/lower per body.
    pub boundary_layer: Vec<BoundaryLayerSide>,
    pub frequencies: FrequencyTables,
    /// Points per wall-normal profile.
    pub probe_points: usize,
    pub probes: Vec<ProbeProfile>,
    pub mode_derivatives: Vec<ModalScalars>,
    pub position_derivatives: Vec<ModalScalars>,
    pub bitmask: BitmaskTable,
}
