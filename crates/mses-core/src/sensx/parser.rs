use super::model::{
    BodyGeometry, BodyIndices, FlowDerivatives, GlobalForces, ModalScalars, ModeSide,
    PositionSide, SensitivityData, SensxSizing, ShapeMode, ShapePosition, ShapeTable,
    SurfaceSideData,
};
use crate::common::constants::{
    MODAL_SCALAR_COUNT, SENSX_FORCE_COUNT, SENSX_MODE_TUPLE, SENSX_POSITION_TUPLE,
    SENSX_RESIDUAL_COUNT, SENSX_SURFACE_TUPLE, TEXT_FIELD_LEN,
};
use crate::common::{DecodeLimits, MsesConfig, PositionBlockPolicy};
use crate::domain::{DecodeResult, MsesError};
use crate::record::{RecordError, RecordReader, split_columns};
use std::io::Read;
use tracing::{debug, warn};

const FILE_LABEL: &str = "sensx";

/// Walks the sensx schema in file order. Nothing is returned unless every
/// record decodes; partially built arrays are dropped with the decoder.
pub(super) struct SensxDecoder<R> {
    reader: RecordReader<R>,
    limits: DecodeLimits,
    position_block: PositionBlockPolicy,
}

impl<R: Read> SensxDecoder<R> {
    pub(super) fn new(inner: R, config: &MsesConfig) -> Self {
        Self {
            reader: RecordReader::with_element_limit(
                inner,
                config.decode_limits.max_record_elements,
            ),
            limits: config.decode_limits,
            position_block: config.position_block,
        }
    }

    pub(super) fn decode(mut self) -> DecodeResult<SensitivityData> {
        let code = self.text()?;
        let name = self.text()?;

        let fixed = self.ints(3)?;
        let dependencies = self.ints(2)?;
        let flow = self.doubles(3)?;
        let residual_values = self.doubles(SENSX_RESIDUAL_COUNT)?;
        let mut residuals = [0.0; SENSX_RESIDUAL_COUNT];
        residuals.copy_from_slice(&residual_values);

        let sizing = self.read_sizing()?;
        debug!(
            ii = sizing.ii,
            nbl = sizing.nbl,
            nmod = sizing.nmod,
            npos = sizing.npos,
            "sensx sizing scalars"
        );

        let indices = self.read_body_indices(sizing)?;
        let geometry = self.read_body_geometry(sizing.nbl)?;
        let forces = self.read_forces()?;

        let table = ShapeTable::from_indices(&indices);
        let sides = self.read_surface_sides(&table)?;

        let modes = if sizing.nmod == 0 {
            Vec::new()
        } else {
            self.read_modal_block(sizing.nmod, &table)?
        };
        let positions = self.read_position_block(sizing.npos, &table)?;

        debug!(
            records = self.reader.records_read(),
            bytes = self.reader.offset(),
            "sensx decode complete"
        );

        Ok(SensitivityData {
            code,
            name,
            kalfa: fixed[0].max(1),
            kmach: fixed[1].max(1),
            kreyn: fixed[2].max(1),
            ldepma: dependencies[0],
            ldepre: dependencies[1],
            alfa: flow[0],
            mach: flow[1],
            reyn: flow[2],
            residuals,
            sizing,
            indices,
            geometry,
            forces,
            sides,
            modes,
            positions,
        })
    }

    fn read_sizing(&mut self) -> DecodeResult<SensxSizing> {
        let values = self.ints(4)?;
        let limits = self.limits;
        Ok(SensxSizing {
            ii: sizing_scalar("ii", values[0], 1, limits.max_streamwise_points)?,
            nbl: sizing_scalar("nbl", values[1], 1, limits.max_bodies)?,
            nmod: sizing_scalar("nmod", values[2], 0, limits.max_modes)?,
            npos: sizing_scalar("npos", values[3], 0, limits.max_positions)?,
        })
    }

    fn read_body_indices(&mut self, sizing: SensxSizing) -> DecodeResult<Vec<BodyIndices>> {
        let values = self.ints(2 * sizing.nbl)?;
        let ii = sizing.ii as i32;
        let mut indices = reserve(sizing.nbl)?;
        for (body, pair) in values.chunks_exact(2).enumerate() {
            let (raw_ileb, raw_iteb) = (pair[0], pair[1]);
            if raw_ileb < 1 || raw_ileb > ii || raw_iteb < raw_ileb - 1 {
                return Err(MsesError::malformed(
                    "FORMAT.SENSX_INDICES",
                    format!(
                        "body {body} has inconsistent edge indices ileb={raw_ileb} iteb={raw_iteb} for ii={ii}"
                    ),
                ));
            }
            indices.push(BodyIndices::from_raw(ii, raw_ileb, raw_iteb));
        }
        Ok(indices)
    }

    fn read_body_geometry(&mut self, nbl: usize) -> DecodeResult<Vec<BodyGeometry>> {
        let values = self.doubles(5 * nbl)?;
        let mut geometry = reserve(nbl)?;
        geometry.extend(values.chunks_exact(5).map(|body| BodyGeometry {
            xleb: body[0],
            yleb: body[1],
            xteb: body[2],
            yteb: body[3],
            sblegn: body[4],
        }));
        Ok(geometry)
    }

    fn read_forces(&mut self) -> DecodeResult<GlobalForces> {
        let values = self.doubles(SENSX_FORCE_COUNT)?;
        Ok(GlobalForces {
            cl: values[0],
            cm: values[1],
            cdw: values[2],
            cdv: values[3],
            cdf: values[4],
            alfa: FlowDerivatives::from_slice(&values[5..11]),
            mach: FlowDerivatives::from_slice(&values[11..17]),
            reyn: FlowDerivatives::from_slice(&values[17..23]),
        })
    }

    fn read_surface_sides(&mut self, table: &ShapeTable) -> DecodeResult<Vec<SurfaceSideData>> {
        let mut sides = reserve(table.side_count())?;
        for shape in table.iter() {
            let values = self.doubles(shape.surface_len * SENSX_SURFACE_TUPLE)?;
            let [
                xbi,
                ybi,
                cp,
                hk,
                cp_alfa,
                hk_alfa,
                cp_mach,
                hk_mach,
                cp_reyn,
                hk_reyn,
            ] = columns::<SENSX_SURFACE_TUPLE>(&values)?;
            sides.push(SurfaceSideData {
                xbi,
                ybi,
                cp,
                hk,
                cp_alfa,
                hk_alfa,
                cp_mach,
                hk_mach,
                cp_reyn,
                hk_reyn,
            });
        }
        Ok(sides)
    }

    fn read_modal_block(&mut self, nmod: usize, table: &ShapeTable) -> DecodeResult<Vec<ShapeMode>> {
        let mut modes = reserve(nmod)?;
        for _ in 0..nmod {
            let scalars = ModalScalars::from_slice(&self.doubles(MODAL_SCALAR_COUNT)?);
            let mut sides = reserve(table.side_count())?;
            for shape in table.iter() {
                let gn = self.doubles(shape.gn_len)?;
                let values = self.doubles(shape.surface_len * SENSX_MODE_TUPLE)?;
                let [xbi, ybi, cp, hk] = columns::<SENSX_MODE_TUPLE>(&values)?;
                sides.push(ModeSide {
                    gn,
                    xbi,
                    ybi,
                    cp,
                    hk,
                });
            }
            modes.push(ShapeMode { scalars, sides });
        }
        debug!(modes = nmod, "sensx modal block decoded");
        Ok(modes)
    }

    fn read_position_block(
        &mut self,
        npos: usize,
        table: &ShapeTable,
    ) -> DecodeResult<Vec<ShapePosition>> {
        match self.position_block {
            // The historical guard enters the block only when npos == 0.
            PositionBlockPolicy::LegacySkip if npos != 0 => {
                warn!(
                    npos,
                    "sensx position block present but skipped by the legacy guard"
                );
                Ok(Vec::new())
            }
            PositionBlockPolicy::LegacySkip => self.read_positions(0, table),
            PositionBlockPolicy::Read => self.read_positions(npos, table),
        }
    }

    fn read_positions(&mut self, npos: usize, table: &ShapeTable) -> DecodeResult<Vec<ShapePosition>> {
        let mut positions = reserve(npos)?;
        for position in 0..npos {
            let scalars = ModalScalars::from_slice(&self.doubles(MODAL_SCALAR_COUNT)?);
            let nposel = self.reader.read_i32().map_err(record_error)?;
            let nposel = usize::try_from(nposel).map_err(|_| {
                MsesError::malformed(
                    "FORMAT.SENSX_POSITION",
                    format!("position {position} has negative element count {nposel}"),
                )
            })?;
            let nbpos = self.ints(nposel)?;

            let mut sides = reserve(table.side_count())?;
            for shape in table.iter() {
                let values = self.doubles(shape.surface_len * SENSX_POSITION_TUPLE)?;
                let [xbi, ybi, abpos] = columns::<SENSX_POSITION_TUPLE>(&values)?;
                sides.push(PositionSide { xbi, ybi, abpos });
            }
            positions.push(ShapePosition {
                scalars,
                nbpos,
                sides,
            });
        }
        Ok(positions)
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
            "FORMAT.SENSX_SIZING",
            format!("{label}={value} is outside the accepted range {minimum}..={maximum}"),
        )),
    }
}

fn reserve<T>(count: usize) -> DecodeResult<Vec<T>> {
    let mut values = Vec::new();
    values.try_reserve_exact(count).map_err(|_| {
        MsesError::resource(
            "ALLOC.SENSX",
            format!("cannot allocate {count} sensx elements"),
        )
    })?;
    Ok(values)
}

fn columns<const N: usize>(values: &[f64]) -> DecodeResult<[Vec<f64>; N]> {
    split_columns::<N>(values).map_err(|_| {
        MsesError::resource(
            "ALLOC.SENSX",
            format!("cannot allocate {} sensx surface points", values.len() / N),
        )
    })
}
