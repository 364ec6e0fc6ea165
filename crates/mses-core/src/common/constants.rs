//! Shared numeric constants and fixed wire-format sizes.

/// π to 17 significant digits, as written in the solver interface.
pub const PI: f64 = 3.141_592_653_589_793_1_f64;
pub const RADDEG: f64 = 180.0 / PI;

/// Width of the space-padded `code`/`name` character records.
pub const TEXT_FIELD_LEN: usize = 32;

/// Number of doubles in the sensx convergence-residual record.
pub const SENSX_RESIDUAL_COUNT: usize = 6;
/// Number of doubles in the global force/derivative record.
pub const SENSX_FORCE_COUNT: usize = 23;
/// Doubles per point in the per-side surface record.
pub const SENSX_SURFACE_TUPLE: usize = 10;
/// Doubles per point in the per-mode surface record.
pub const SENSX_MODE_TUPLE: usize = 4;
/// Doubles per point in the per-position surface record.
pub const SENSX_POSITION_TUPLE: usize = 3;
/// Per-mode (or per-position) scalar record length.
pub const MODAL_SCALAR_COUNT: usize = 7;

pub const MDAT_FLOW_COUNT: usize = 9;
pub const MDAT_BOUNDARY_LAYER_TUPLE: usize = 9;
pub const MDAT_FREQUENCY_TUPLE: usize = 3;
pub const MDAT_PROBE_TUPLE: usize = 3;
pub const MDAT_BITMASK_WORDS: usize = 32;
