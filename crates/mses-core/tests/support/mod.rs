#![allow(dead_code)]

use mses_core::mdat::{
    BodyStreamline, BoundaryLayerSide, EdgeIndices, FlowState, FrequencyTables, GridLine,
    MdatSizing, ProbeProfile, SolutionData, SolverSwitches,
};
use mses_core::sensx::{
    BodyGeometry, BodyIndices, FlowDerivatives, GlobalForces, ModalScalars, ModeSide,
    PositionSide, SensitivityData, SensxSizing, ShapeMode, ShapePosition, SurfaceSideData,
};
use std::f64::consts::PI;

/// Leading-edge index on disk for body `body`; nonzero offsets exercise the
/// renormalisation.
pub fn raw_leading_edge(body: usize) -> i32 {
    3 + body as i32
}

/// NACA 0012 half-thickness at chord fraction `x`.
pub fn naca0012(x: f64) -> f64 {
    0.6 * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x * x + 0.2843 * x.powi(3)
        - 0.1015 * x.powi(4))
}

/// Cosine-spaced chord stations from the leading to the trailing edge.
pub fn chord_stations(points: usize) -> Vec<f64> {
    (0..points)
        .map(|i| 0.5 * (1.0 - (PI * i as f64 / (points - 1) as f64).cos()))
        .collect()
}

fn ramp(len: usize, scale: f64, shift: f64) -> Vec<f64> {
    (0..len).map(|i| scale * i as f64 + shift).collect()
}

/// Surface arrays for one side of body `body`.
pub fn airfoil_side(body: usize, lower: bool, points: usize) -> SurfaceSideData {
    let sign = if lower { -1.0 } else { 1.0 };
    let stations = chord_stations(points);
    let xbi: Vec<f64> = stations.iter().map(|x| x + 1.25 * body as f64).collect();
    let ybi: Vec<f64> = stations
        .iter()
        .map(|x| sign * naca0012(*x) - 0.1 * body as f64)
        .collect();
    SurfaceSideData {
        xbi,
        ybi,
        cp: stations.iter().map(|x| 1.0 - 4.0 * x * (1.0 - x)).collect(),
        hk: ramp(points, 0.05, 2.2),
        cp_alfa: ramp(points, sign * 0.01, 0.3),
        hk_alfa: ramp(points, 0.002, 0.0),
        cp_mach: ramp(points, 0.003, -0.1),
        hk_mach: ramp(points, 0.001, 0.05),
        cp_reyn: ramp(points, 1.0e-9, 0.0),
        hk_reyn: ramp(points, -2.0e-9, 1.0e-8),
    }
}

/// Mode `mode`: a sine bump of increasing frequency normal to the chord.
pub fn mode_side(mode: usize, lower: bool, points: usize, gn_len: usize) -> ModeSide {
    let sign = if lower { -1.0 } else { 1.0 };
    let frequency = (mode + 1) as f64;
    let stations = chord_stations(points);
    ModeSide {
        gn: ramp(gn_len, 0.1, frequency),
        xbi: stations
            .iter()
            .map(|x| 0.01 * frequency * x * (1.0 - x))
            .collect(),
        ybi: stations
            .iter()
            .map(|x| sign * (frequency * PI * x).sin())
            .collect(),
        cp: ramp(points, 0.02 * frequency, -0.5),
        hk: ramp(points, 0.01, 0.1 * frequency),
    }
}

pub fn mode_scalars(mode: usize) -> ModalScalars {
    let scale = (mode + 1) as f64;
    ModalScalars {
        amplitude: 0.01 * scale,
        al: 0.05 * scale,
        cl: 0.125 * scale,
        cm: -0.03125 * scale,
        cdw: 0.0009765625 * scale,
        cdv: 0.001953125 * scale,
        cdf: 0.00048828125 * scale,
    }
}

/// Sensitivity data with `nbl` bodies, each side holding `points` boundary
/// points, and `nmod` independent shape modes.
pub fn sensitivity_case(nbl: usize, nmod: usize, points: usize) -> SensitivityData {
    let ii = points as i32 + raw_leading_edge(0);
    let indices: Vec<BodyIndices> = (0..nbl)
        .map(|body| {
            let raw_ileb = raw_leading_edge(body);
            BodyIndices::from_raw(ii, raw_ileb, ii - 2)
        })
        .collect();

    let mut sides = Vec::with_capacity(2 * nbl);
    for (body, index) in indices.iter().enumerate() {
        for lower in [false, true] {
            sides.push(airfoil_side(body, lower, index.surface_len()));
        }
    }

    let modes = (0..nmod)
        .map(|mode| ShapeMode {
            scalars: mode_scalars(mode),
            sides: indices
                .iter()
                .flat_map(|index| {
                    [false, true].map(|lower| {
                        mode_side(mode, lower, index.surface_len(), index.gn_len())
                    })
                })
                .collect(),
        })
        .collect();

    let geometry = (0..nbl)
        .map(|body| {
            let shift = 1.25 * body as f64;
            BodyGeometry {
                xleb: shift,
                yleb: -0.1 * body as f64,
                xteb: shift + 1.0,
                yteb: -0.1 * body as f64,
                sblegn: 1.0 + 0.01 * body as f64,
            }
        })
        .collect();

    SensitivityData {
        code: "MSES".to_string(),
        name: format!("NACA 0012 x{nbl}"),
        kalfa: 1,
        kmach: 2,
        kreyn: 3,
        ldepma: 0,
        ldepre: 1,
        alfa: 2.5,
        mach: 0.5,
        reyn: 6.5e6,
        residuals: [1.0e-10, 2.0e-10, 3.0e-10, 4.0e-10, 5.0e-10, 6.0e-10],
        sizing: SensxSizing {
            ii: ii as usize,
            nbl,
            nmod,
            npos: 0,
        },
        indices,
        geometry,
        forces: GlobalForces {
            cl: 0.5,
            cm: -0.0625,
            cdw: 0.001953125,
            cdv: 0.0078125,
            cdf: 0.00390625,
            alfa: FlowDerivatives {
                al: 1.0,
                cl: 0.109375,
                cm: -0.001,
                cdw: 0.0002,
                cdv: 0.0001,
                cdf: 0.00005,
            },
            mach: FlowDerivatives {
                al: 0.0,
                cl: 0.8,
                cm: -0.05,
                cdw: 0.04,
                cdv: 0.001,
                cdf: 0.0005,
            },
            reyn: FlowDerivatives {
                al: 0.0,
                cl: 1.0e-9,
                cm: 0.0,
                cdw: 0.0,
                cdv: -1.0e-10,
                cdf: -5.0e-11,
            },
        },
        sides,
        modes,
        positions: Vec::new(),
    }
}

/// Adds `npos` shape positions matching the side layout of `data`.
pub fn with_positions(mut data: SensitivityData, npos: usize) -> SensitivityData {
    let table = data.shape_table();
    data.positions = (0..npos)
        .map(|position| ShapePosition {
            scalars: mode_scalars(position + 10),
            nbpos: (0..position as i32 + 1).collect(),
            sides: table
                .iter()
                .map(|shape| PositionSide {
                    xbi: ramp(shape.surface_len, 0.01, 0.0),
                    ybi: ramp(shape.surface_len, -0.02, 0.1),
                    abpos: ramp(shape.surface_len, 0.5, position as f64),
                })
                .collect(),
        })
        .collect();
    data.sizing.npos = npos;
    data
}

/// Byte ranges `(begin_marker_offset, end_marker_offset)` of every record.
pub fn record_spans(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let mut marker = [0_u8; 4];
        marker.copy_from_slice(&bytes[offset..offset + 4]);
        let payload = i32::from_ne_bytes(marker) as usize;
        let end = offset + 4 + payload;
        spans.push((offset, end));
        offset = end + 4;
    }
    spans
}

/// Copy of `bytes` with the end marker at `end_offset` changed.
pub fn corrupt_end_marker(bytes: &[u8], end_offset: usize) -> Vec<u8> {
    let mut corrupted = bytes.to_vec();
    let mut marker = [0_u8; 4];
    marker.copy_from_slice(&corrupted[end_offset..end_offset + 4]);
    let bumped = (i32::from_ne_bytes(marker) + 8).to_ne_bytes();
    corrupted[end_offset..end_offset + 4].copy_from_slice(&bumped);
    corrupted
}

/// Solution snapshot with `nbl` bodies and side-dependent frequency tables.
pub fn solution_case(nbl: usize, nmod: usize, npos: usize) -> SolutionData {
    let ii = 24;
    let jj = 4;
    let edges: Vec<EdgeIndices> = (0..nbl)
        .map(|body| EdgeIndices {
            ileb: 2 + body as i32,
            iteb: 20,
        })
        .collect();
    let boundary_layer = edges
        .iter()
        .flat_map(|edge| [*edge, *edge])
        .enumerate()
        .map(|(side, edge)| {
            let len = edge.blade_len();
            let shift = side as f64;
            BoundaryLayerSide {
                xbi: chord_stations(len),
                ybi: chord_stations(len).iter().map(|x| naca0012(*x)).collect(),
                sbi: ramp(len, 0.06, shift),
                theta: ramp(len, 1.0e-5, 1.0e-4),
                dstar: ramp(len, 3.0e-5, 2.0e-4),
                uedg: ramp(len, 0.01, 0.9),
                ctau: ramp(len, 1.0e-3, 0.0),
                hk: ramp(len, 0.02, 2.4),
                cf: ramp(len, -1.0e-5, 3.0e-3),
            }
        })
        .collect();

    let tables: Vec<(Vec<f64>, Vec<f64>, Vec<f64>)> = (0..2 * nbl)
        .map(|side| {
            let count = side % 3;
            (
                ramp(count, 0.5, 0.25),
                ramp(count, 0.001, 0.01),
                ramp(count, 0.1, -0.2),
            )
        })
        .collect();

    let mut data = SolutionData {
        code: "MSES".to_string(),
        name: format!("snapshot x{nbl}"),
        sizing: MdatSizing {
            ii,
            jj,
            nbl,
            nmod,
            npos,
        },
        switches: SolverSwitches {
            ismom: 4,
            iffbc: 2,
            kalfa: 1,
            kmach: 1,
            kreyn: 2,
        },
        flow: FlowState {
            alfa: 1.5,
            mach: 0.72,
            reyn: 9.0e6,
            acrit: 9.0,
            cl: 0.6,
            cm: -0.09,
            cdw: 0.002,
            cdv: 0.006,
            cdf: 0.004,
        },
        edges,
        grid: (0..jj)
            .map(|j| GridLine {
                x: ramp(ii, 0.1, -0.5),
                y: ramp(ii, 0.0, 0.2 * j as f64),
            })
            .collect(),
        bodies: (0..nbl)
            .map(|body| BodyStreamline {
                xb: ramp(ii, 0.05, body as f64),
                yb: ramp(ii, 0.001, 0.0),
                sb: ramp(ii, 0.051, 0.0),
            })
            .collect(),
        boundary_layer,
        frequencies: FrequencyTables::from_sides(&tables),
        probe_points: 5,
        probes: (0..nbl)
            .map(|body| ProbeProfile {
                side: 2 * body as i32 + 1,
                point: 10,
                eta: ramp(5, 0.002, 0.0),
                q: ramp(5, 0.2, 0.1),
                rho: ramp(5, -0.01, 1.0),
            })
            .collect(),
        mode_derivatives: (0..nmod).map(mode_scalars).collect(),
        position_derivatives: (0..npos).map(|p| mode_scalars(p + 5)).collect(),
        ..Default::default()
    };
    data.bitmask.words[0] = 0b101;
    data.bitmask.words[31] = -1;
    data
}
