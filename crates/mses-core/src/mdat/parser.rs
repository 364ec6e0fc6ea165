use super::model::{
    BitmaskTable, BodyStreamline, BoundaryLayerSide, EdgeIndices, FlowState, FrequencyTables,
    GridLine, MdatSizing, ProbeProfile, SolutionData, SolverSwitches,
};
use crate::common::constants::{
    MDAT_BITMASK_WORDS, MDAT_BOUNDARY_LAYER_TUPLE, MDAT_FLOW_COUNT, MDAT_FREQUENCY_TUPLE,
    MDAT_PROBE_TUPLE, MODAL_SCALAR_COUNT, TEXT_FIELD_LEN,
};
use crate::common::{DecodeLimits, MsesConfig};
use crate::domain::{DecodeResult, MsesError};
use crate::record::{RecordError, RecordReader, split_columns};
use crate::sensx::ModalScalars;
use std::io::Read;
use tracing::debug;

const FILE_LABEL: &str = "mdat";

pub(super) struct MdatDecoder<R> {
    reader: RecordReader<R>,
    limits: DecodeLimits,
}

impl<R: Read> MdatDecoder<R> {
    pub(super) fn new(inner: R, config: &MsesConfig) -> Self {
        Self {
            reader: RecordReader::with_element_limit(
                inner,
                config.decode_limits.max_record_elements,
            ),
            limits: config.decode_limits,
        }
    }

    pub(super) fn decode(mut self) -> DecodeResult<SolutionData> {
        let code = self.text()?;
        let name = self.text()?;
        let sizing = self.read_sizing()?;
        debug!(
            ii = sizing.ii,
            jj = sizing.jj,
            nbl = sizing.nbl,
            nmod = sizing.nmod,
            npos = sizing.npos,
            "mdat sizing scalars"
        );

        let switch_values = self.ints(5)?;
        let switches = SolverSwitches {
            ismom: switch_values[0],
            iffbc: switch_values[1],
            kalfa: switch_values[2].max(1),
            kmach: switch_values[3].max(1),
            kreyn: switch_values[4].max(1),
        };

        let flow_values = self.doubles(MDAT_FLOW_COUNT)?;
        let flow = FlowState {
            alfa: flow_values[0],
            mach: flow_values[1],
            reyn: flow_values[2],
            acrit: flow_values[3],
            cl: flow_values[4],
            cm: flow_values[5],
            cdw: flow_values[6],
            cdv: flow_values[7],
            cdf: flow_values[8],
        };

        let edges = self.read_edges(sizing)?;
        let grid = self.read_grid(sizing)?;
        let bodies = self.read_body_streamlines(sizing)?;
        let boundary_layer = self.read_boundary_layer(&edges)?;
        let frequencies = self.read_frequencies(2 * sizing.nbl)?;
        let (probe_points, probes) = self.read_probes(sizing)?;

        let mode_derivatives = if sizing.nmod > 0 {
            self.read_modal_scalars(sizing.nmod)?
        } else {
            Vec::new()
        };
        let position_derivatives = if sizing.npos > 0 {
            self.read_modal_scalars(sizing.npos)?
        } else {
            Vec::new()
        };

        let mask_values = self.ints(MDAT_BITMASK_WORDS)?;
        let mut bitmask = BitmaskTable::default();
        bitmask.words.copy_from_slice(&mask_values);

        debug!(
            records = self.reader.records_read(),
            bytes = self.reader.offset(),
            "mdat decode complete"
        );

        Ok(SolutionData {
            code,
            name,
            sizing,
            switches,
            flow,
            edges,
            grid,
            bodies,
            boundary_layer,
            frequencies,
            probe_points,
            probes,
            mode_derivatives,
            position_derivatives,
            bitmask,
        })
    }

    fn read_sizing(&mut self) -> DecodeResult<MdatSizing> {
        let values = self.ints(5)?;
        let limits = self.limits;
        Ok(MdatSizing {
            ii: sizing_scalar("ii", values[0], 1, limits.max_streamwise_points)?,
            jj: sizing_scalar("jj", values[1], 1, limits.max_streamlines)?,
            nbl: sizing_scalar("nbl", values[2], 1, limits.max_bodies)?,
            nmod: sizing_scalar("nmod", values[3], 0, limits.max_modes)?,
            npos: sizing_scalar("npos", values[4], 0, limits.max_positions)?,
        })
    }

    fn read_edges(&mut self, sizing: MdatSizing) -> DecodeResult<Vec<EdgeIndices>> {
        let values = self.ints(2 * sizing.nbl)?;
        let ii = sizing.ii as i32;
        let mut edges = reserve(sizing.nbl)?;
        for (body, pair) in values.chunks_exact(2).enumerate() {
            let edge = EdgeIndices {
                ileb: pair[0],
                iteb: pair[1],
            };
            if edge.ileb < 1 || edge.iteb < edge.ileb || edge.iteb > ii {
                return Err(MsesError::malformed(
                    "FORMAT.MDAT_INDICES",
                    format!(
                        "body {body} has inconsistent edge indices ileb={} iteb={} for ii={ii}",
                        edge.ileb, edge.iteb
                    ),
                ));
            }
            edges.push(edge);
        }
        Ok(edges)
    }

    fn read_grid(&mut self, sizing: MdatSizing) -> DecodeResult<Vec<GridLine>> {
        let mut grid = reserve(sizing.jj)?;
        for _ in 0..sizing.jj {
            let values = self.doubles(2 * sizing.ii)?;
            let [x, y] = columns::<2>(&values)?;
            grid.push(GridLine { x, y });
        }
        Ok(grid)
    }

    fn read_body_streamlines(&mut self, sizing: MdatSizing) -> DecodeResult<Vec<BodyStreamline>> {
        let mut bodies = reserve(sizing.nbl)?;
        for _ in 0..sizing.nbl {
            let values = self.doubles(3 * sizing.ii)?;
            let [xb, yb, sb] = columns::<3>(&values)?;
            bodies.push(BodyStreamline { xb, yb, sb });
        }
        Ok(bodies)
    }

    fn read_boundary_layer(&mut self, edges: &[EdgeIndices]) -> DecodeResult<Vec<BoundaryLayerSide>> {
        let mut sides = reserve(2 * edges.len())?;
        for edge in edges.iter().flat_map(|edge| [*edge, *edge]) {
            let values = self.doubles(edge.blade_len() * MDAT_BOUNDARY_LAYER_TUPLE)?;
            let [xbi, ybi, sbi, theta, dstar, uedg, ctau, hk, cf] =
                columns::<MDAT_BOUNDARY_LAYER_TUPLE>(&values)?;
            sides.push(BoundaryLayerSide {
                xbi,
                ybi,
                sbi,
                theta,
                dstar,
                uedg,
                ctau,
                hk,
                cf,
            });
        }
        Ok(sides)
    }

    /// Counts first, then one flat allocation sized by their prefix sum.
    fn read_frequencies(&mut self, side_count: usize) -> DecodeResult<FrequencyTables> {
        let raw_counts = self.ints(side_count)?;
        let mut counts = reserve(side_count)?;
        for (side, count) in raw_counts.iter().enumerate() {
            let count = usize::try_from(*count).map_err(|_| {
                MsesError::malformed(
                    "FORMAT.MDAT_FREQUENCY",
                    format!("side {side} has negative frequency count {count}"),
                )
            })?;
            counts.push(count);
        }

        let offsets = FrequencyTables::offsets_for(&counts)
            .filter(|offsets| offsets[offsets.len() - 1] <= self.limits.max_record_elements)
            .ok_or_else(|| {
                MsesError::malformed(
                    "FORMAT.MDAT_FREQUENCY",
                    "total frequency count exceeds the record element limit",
                )
            })?;
        let total = offsets[offsets.len() - 1];
        debug!(total, "mdat frequency tables");

        let mut freq = reserve(total)?;
        let mut amplitude = reserve(total)?;
        let mut phase = reserve(total)?;
        for count in &counts {
            let values = self.doubles(count * MDAT_FREQUENCY_TUPLE)?;
            for tuple in values.chunks_exact(MDAT_FREQUENCY_TUPLE) {
                freq.push(tuple[0]);
                amplitude.push(tuple[1]);
                phase.push(tuple[2]);
            }
        }

        Ok(FrequencyTables::from_parts(offsets, freq, amplitude, phase))
    }

    fn read_probes(&mut self, sizing: MdatSizing) -> DecodeResult<(usize, Vec<ProbeProfile>)> {
        let header = self.ints(2)?;
        let nprobe = probe_count("nprobe", header[0], self.limits.max_probes)?;
        let nprof = probe_count("nprof", header[1], self.limits.max_profile_points)?;

        let side_limit = 2 * sizing.nbl as i32;
        let point_limit = sizing.ii as i32;
        let mut probes = reserve(nprobe)?;
        for probe in 0..nprobe {
            let location = self.ints(2)?;
            let (side, point) = (location[0], location[1]);
            if !(1..=side_limit).contains(&side) || !(1..=point_limit).contains(&point) {
                return Err(MsesError::malformed(
                    "FORMAT.MDAT_PROBE",
                    format!("probe {probe} location side={side} point={point} is out of range"),
                ));
            }
            let values = self.doubles(nprof * MDAT_PROBE_TUPLE)?;
            let [eta, q, rho] = columns::<MDAT_PROBE_TUPLE>(&values)?;
            probes.push(ProbeProfile {
                side,
                point,
                eta,
                q,
                rho,
            });
        }
        Ok((nprof, probes))
    }

    fn read_modal_scalars(&mut self, count: usize) -> DecodeResult<Vec<ModalScalars>> {
        let mut scalars = reserve(count)?;
        for _ in 0..count {
            scalars.push(ModalScalars::from_slice(&self.doubles(MODAL_SCALAR_COUNT)?));
        }
        Ok(scalars)
    }

    fn text(&mut self) -> DecodeResult<String> {
        self.reader.read_text(TEXT_FIELD_LEN).map_err(record_error)
    }

    fn ints(&mut self, count: usize) -> DecodeResult<Vec<i32>> {
        self.reader.read_i32s(count).map_err(record_error)
    }

    fn doubles(&mut self, count: usize) -> DecodeResult<Vec<f64>> {
        self.reader.read_f64s(count).map_err(record_error)
    }
}

fn record_error(error: RecordError) -> MsesError {
    error.into_mses(FILE_LABEL)
}

fn sizing_scalar(label: &str, value: i32, minimum: usize, maximum: usize) -> DecodeResult<usize> {
    match usize::try_from(value) {
        Ok(size) if (minimum..=maximum).contains(&size) => Ok(size),
        _ => Err(MsesError::malformed(
            "FORMAT.MDAT_SIZING",
            format!("{label}={value} is outside the accepted range {minimum}..={maximum}"),
        )),
    }
}

fn probe_count(label: &str, value: i32, maximum: usize) -> DecodeResult<usize> {
    match usize::try_from(value) {
        Ok(count) if count <= maximum => Ok(count),
        _ => Err(MsesError::malformed(
            "FORMAT.MDAT_PROBE",
            format!("{label}={value} is outside the accepted range 0..={maximum}"),
        )),
    }
}

fn reserve<T>(count: usize) -> DecodeResult<Vec<T>> {
    let mut values = Vec::new();
    values.try_reserve_exact(count).map_err(|_| {
        MsesError::resource(
            "ALLOC.MDAT",
            format!("cannot allocate {count} mdat elements"),
        )
    })?;
    Ok(values)
}

fn columns<const N: usize>(values: &[f64]) -> DecodeResult<[Vec<f64>; N]> {
    split_columns::<N>(values).map_err(|_| {
        MsesError::resource(
            "ALLOC.MDAT",
            format!("cannot allocate {} mdat points", values.len() / N),
        )
    })
}
