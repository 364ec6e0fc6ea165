use serde::Serialize;

/// Sizing scalars read before any array; every later shape derives from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SensxSizing {
    pub ii: usize,
    pub nbl: usize,
    pub nmod: usize,
    pub npos: usize,
}

/// Leading/trailing-edge indices of one body after renormalisation.
///
/// `ileb` is always 1 once decoded; `iend` is `ii` minus the original offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BodyIndices {
    pub ileb: i32,
    pub iteb: i32,
    pub iend: i32,
}

impl BodyIndices {
    /// Renormalises raw file indices so that the leading edge becomes index 1.
    pub fn from_raw(ii: i32, raw_ileb: i32, raw_iteb: i32) -> Self {
        let offset = raw_ileb - 1;
        Self {
            ileb: raw_ileb - offset,
            iteb: raw_iteb - offset,
            iend: ii - offset,
        }
    }

    /// Indices as they appear on disk for a file with `ii` streamwise points.
    pub fn to_raw(self, ii: i32) -> (i32, i32) {
        let offset = ii - self.iend;
        (self.ileb + offset, self.iteb + offset)
    }

    /// Point count of the per-side surface arrays (`iend - ileb`).
    pub fn surface_len(self) -> usize {
        usize::try_from(self.iend - self.ileb).unwrap_or(0)
    }

    /// Point count of the mode shape function `gn` (`iteb - ileb + 1`).
    pub fn gn_len(self) -> usize {
        usize::try_from(self.iteb - self.ileb + 1).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BodyGeometry {
    pub xleb: f64,
    pub yleb: f64,
    pub xteb: f64,
    pub yteb: f64,
    pub sblegn: f64,
}

/// Derivatives of the global functionals with respect to one flow variable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FlowDerivatives {
    pub al: f64,
    pub cl: f64,
    pub cm: f64,
    pub cdw: f64,
    pub cdv: f64,
    pub cdf: f64,
}

impl FlowDerivatives {
    pub(crate) fn from_slice(values: &[f64]) -> Self {
        Self {
            al: values[0],
            cl: values[1],
            cm: values[2],
            cdw: values[3],
            cdv: values[4],
            cdf: values[5],
        }
    }

    pub(crate) fn to_array(self) -> [f64; 6] {
        [self.al, self.cl, self.cm, self.cdw, self.cdv, self.cdf]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GlobalForces {
    pub cl: f64,
    pub cm: f64,
    pub cdw: f64,
    pub cdv: f64,
    pub cdf: f64,
    pub alfa: FlowDerivatives,
    pub mach: FlowDerivatives,
    pub reyn: FlowDerivatives,
}

impl GlobalForces {
    /// Total drag, wave plus viscous.
    pub fn cd(&self) -> f64 {
        self.cdv + self.cdw
    }
}

/// Boundary arrays of one surface side, each `surface_len` points long.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SurfaceSideData {
    pub xbi: Vec<f64>,
    pub ybi: Vec<f64>,
    pub cp: Vec<f64>,
    pub hk: Vec<f64>,
    pub cp_alfa: Vec<f64>,
    pub hk_alfa: Vec<f64>,
    pub cp_mach: Vec<f64>,
    pub hk_mach: Vec<f64>,
    pub cp_reyn: Vec<f64>,
    pub hk_reyn: Vec<f64>,
}

/// Per-mode (or per-position) scalars: amplitude and functional sensitivities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ModalScalars {
    pub amplitude: f64,
    pub al: f64,
    pub cl: f64,
    pub cm: f64,
    pub cdw: f64,
    pub cdv: f64,
    pub cdf: f64,
}

impl ModalScalars {
    pub(crate) fn from_slice(values: &[f64]) -> Self {
        Self {
            amplitude: values[0],
            al: values[1],
            cl: values[2],
            cm: values[3],
            cdw: values[4],
            cdv: values[5],
            cdf: values[6],
        }
    }

    pub(crate) fn to_array(self) -> [f64; 7] {
        [
            self.amplitude,
            self.al,
            self.cl,
            self.cm,
            self.cdw,
            self.cdv,
            self.cdf,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ModeSide {
    /// Mode shape function, `gn_len` points.
    pub gn: Vec<f64>,
    pub xbi: Vec<f64>,
    pub ybi: Vec<f64>,
    pub cp: Vec<f64>,
    pub hk: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ShapeMode {
    pub scalars: ModalScalars,
    pub sides: Vec<ModeSide>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PositionSide {
    pub xbi: Vec<f64>,
    pub ybi: Vec<f64>,
    pub abpos: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ShapePosition {
    pub scalars: ModalScalars,
    /// Boundary-element indices deformed by this position (`nposel` entries).
    pub nbpos: Vec<i32>,
    pub sides: Vec<PositionSide>,
}

impl ShapePosition {
    pub fn nposel(&self) -> usize {
        self.nbpos.len()
    }
}

/// Point counts for one side in the `2*nbl` enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideShape {
    pub surface_len: usize,
    pub gn_len: usize,
}

/// Per-side point counts, computed once from the renormalised indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShapeTable {
    sides: Vec<SideShape>,
}

impl ShapeTable {
    pub fn from_indices(indices: &[BodyIndices]) -> Self {
        let sides = indices
            .iter()
            .flat_map(|body| {
                let shape = SideShape {
                    surface_len: body.surface_len(),
                    gn_len: body.gn_len(),
                };
                [shape, shape]
            })
            .collect();
        Self { sides }
    }

    pub fn side_count(&self) -> usize {
        self.sides.len()
    }

    pub fn side(&self, side_index: usize) -> SideShape {
        self.sides[side_index]
    }

    pub fn iter(&self) -> impl Iterator<Item = SideShape> + '_ {
        self.sides.iter().copied()
    }

    pub fn total_surface_points(&self) -> usize {
        self.sides.iter().map(|side| side.surface_len).sum()
    }
}

/// Everything decoded from one sensx file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SensitivityData {
    pub code: String,
    pub name: String,
    pub kalfa: i32,
    pub kmach: i32,
    pub kreyn: i32,
    pub ldepma: i32,
    pub ldepre: i32,
    pub alfa: f64,
    pub mach: f64,
    pub reyn: f64,
    pub residuals: [f64; 6],
    pub sizing: SensxSizing,
    pub indices: Vec<BodyIndices>,
    pub geometry: Vec<BodyGeometry>,
    pub forces: GlobalForces,
    /// `2*nbl` sides ordered upper/lower per body.
    pub sides: Vec<SurfaceSideData>,
    pub modes: Vec<ShapeMode>,
    /// Empty unless the position block was actually decoded.
    pub positions: Vec<ShapePosition>,
}

impl SensitivityData {
    pub fn body_count(&self) -> usize {
        self.indices.len()
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    pub fn shape_table(&self) -> ShapeTable {
        ShapeTable::from_indices(&self.indices)
    }

    /// Checks that every jagged array matches the shape table.
    ///
    /// Decoded data always passes; hand-built data may not.
    pub fn check_shapes(&self) -> Result<(), String> {
        let table = self.shape_table();
        if self.sides.len() != table.side_count() {
            return Err(format!(
                "expected {} surface sides, found {}",
                table.side_count(),
                self.sides.len()
            ));
        }
        for (side_index, (side, shape)) in self.sides.iter().zip(table.iter()).enumerate() {
            let lengths = [
                side.xbi.len(),
                side.ybi.len(),
                side.cp.len(),
                side.hk.len(),
                side.cp_alfa.len(),
                side.hk_alfa.len(),
                side.cp_mach.len(),
                side.hk_mach.len(),
                side.cp_reyn.len(),
                side.hk_reyn.len(),
            ];
            if lengths.iter().any(|len| *len != shape.surface_len) {
                return Err(format!(
                    "surface side {side_index} arrays must hold {} points",
                    shape.surface_len
                ));
            }
        }

        for (mode_index, mode) in self.modes.iter().enumerate() {
            if mode.sides.len() != table.side_count() {
                return Err(format!(
                    "mode {mode_index} has {} sides, expected {}",
                    mode.sides.len(),
                    table.side_count()
                ));
            }
            for (side_index, (side, shape)) in mode.sides.iter().zip(table.iter()).enumerate() {
                if side.gn.len() != shape.gn_len {
                    return Err(format!(
                        "mode {mode_index} side {side_index} gn must hold {} points",
                        shape.gn_len
                    ));
                }
                let lengths = [side.xbi.len(), side.ybi.len(), side.cp.len(), side.hk.len()];
                if lengths.iter().any(|len| *len != shape.surface_len) {
                    return Err(format!(
                        "mode {mode_index} side {side_index} arrays must hold {} points",
                        shape.surface_len
                    ));
                }
            }
        }

        Ok(())
    }
}
