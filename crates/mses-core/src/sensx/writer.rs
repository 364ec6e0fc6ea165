use super::model::SensitivityData;
use crate::common::constants::TEXT_FIELD_LEN;
use crate::record::{RecordWriter, interleave};
use std::io::{self, Write};

/// Writes `data` in sensx record order.
///
/// Edge indices are written back in their on-disk form so that decoding the
/// output renormalises them to the same values again.
pub(super) fn write_sensitivity<W: Write>(
    writer: &mut RecordWriter<W>,
    data: &SensitivityData,
) -> io::Result<()> {
    writer.write_text(&data.code, TEXT_FIELD_LEN)?;
    writer.write_text(&data.name, TEXT_FIELD_LEN)?;
    writer.write_i32s(&[data.kalfa, data.kmach, data.kreyn])?;
    writer.write_i32s(&[data.ldepma, data.ldepre])?;
    writer.write_f64s(&[data.alfa, data.mach, data.reyn])?;
    writer.write_f64s(&data.residuals)?;

    let ii = wire_int(data.sizing.ii)?;
    writer.write_i32s(&[
        ii,
        wire_int(data.indices.len())?,
        wire_int(data.modes.len())?,
        wire_int(data.positions.len())?,
    ])?;

    let raw_indices: Vec<i32> = data
        .indices
        .iter()
        .flat_map(|body| {
            let (ileb, iteb) = body.to_raw(ii);
            [ileb, iteb]
        })
        .collect();
    writer.write_i32s(&raw_indices)?;

    let geometry: Vec<f64> = data
        .geometry
        .iter()
        .flat_map(|body| [body.xleb, body.yleb, body.xteb, body.yteb, body.sblegn])
        .collect();
    writer.write_f64s(&geometry)?;

    let forces = &data.forces;
    let mut force_record = vec![forces.cl, forces.cm, forces.cdw, forces.cdv, forces.cdf];
    force_record.extend(forces.alfa.to_array());
    force_record.extend(forces.mach.to_array());
    force_record.extend(forces.reyn.to_array());
    writer.write_f64s(&force_record)?;

    for side in &data.sides {
        writer.write_f64s(&interleave(&[
            side.xbi.as_slice(),
            side.ybi.as_slice(),
            side.cp.as_slice(),
            side.hk.as_slice(),
            side.cp_alfa.as_slice(),
            side.hk_alfa.as_slice(),
            side.cp_mach.as_slice(),
            side.hk_mach.as_slice(),
            side.cp_reyn.as_slice(),
            side.hk_reyn.as_slice(),
        ]))?;
    }

    for mode in &data.modes {
        writer.write_f64s(&mode.scalars.to_array())?;
        for side in &mode.sides {
            writer.write_f64s(&side.gn)?;
            writer.write_f64s(&interleave(&[
                side.xbi.as_slice(),
                side.ybi.as_slice(),
                side.cp.as_slice(),
                side.hk.as_slice(),
            ]))?;
        }
    }

    for position in &data.positions {
        writer.write_f64s(&position.scalars.to_array())?;
        writer.write_i32s(&[wire_int(position.nposel())?])?;
        writer.write_i32s(&position.nbpos)?;
        for side in &position.sides {
            writer.write_f64s(&interleave(&[
                side.xbi.as_slice(),
                side.ybi.as_slice(),
                side.abpos.as_slice(),
            ]))?;
        }
    }

    Ok(())
}

fn wire_int(value: usize) -> io::Result<i32> {
    i32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{value} does not fit a 32-bit record integer"),
        )
    })
}
