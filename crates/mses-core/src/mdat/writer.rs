use super::model::SolutionData;
use crate::common::constants::TEXT_FIELD_LEN;
use crate::record::{RecordWriter, interleave};
use std::io::{self, Write};

pub(super) fn write_solution<W: Write>(
    writer: &mut RecordWriter<W>,
    data: &SolutionData,
) -> io::Result<()> {
    writer.write_text(&data.code, TEXT_FIELD_LEN)?;
    writer.write_text(&data.name, TEXT_FIELD_LEN)?;
    writer.write_i32s(&[
        wire_int(data.sizing.ii)?,
        wire_int(data.grid.len())?,
        wire_int(data.edges.len())?,
        wire_int(data.mode_derivatives.len())?,
        wire_int(data.position_derivatives.len())?,
    ])?;

    let switches = &data.switches;
    writer.write_i32s(&[
        switches.ismom,
        switches.iffbc,
        switches.kalfa,
        switches.kmach,
        switches.kreyn,
    ])?;
    writer.write_f64s(&data.flow.to_array())?;

    let edges: Vec<i32> = data
        .edges
        .iter()
        .flat_map(|edge| [edge.ileb, edge.iteb])
        .collect();
    writer.write_i32s(&edges)?;

    for line in &data.grid {
        writer.write_f64s(&interleave(&[line.x.as_slice(), line.y.as_slice()]))?;
    }
    for body in &data.bodies {
        writer.write_f64s(&interleave(&[
            body.xb.as_slice(),
            body.yb.as_slice(),
            body.sb.as_slice(),
        ]))?;
    }
    for side in &data.boundary_layer {
        writer.write_f64s(&interleave(&[
            side.xbi.as_slice(),
            side.ybi.as_slice(),
            side.sbi.as_slice(),
            side.theta.as_slice(),
            side.dstar.as_slice(),
            side.uedg.as_slice(),
            side.ctau.as_slice(),
            side.hk.as_slice(),
            side.cf.as_slice(),
        ]))?;
    }

    let tables = &data.frequencies;
    let counts = (0..tables.side_count())
        .map(|side| wire_int(tables.nfreq(side)))
        .collect::<io::Result<Vec<i32>>>()?;
    writer.write_i32s(&counts)?;
    for side in 0..tables.side_count() {
        let table = tables.side(side);
        writer.write_f64s(&interleave(&[table.freq, table.amplitude, table.phase]))?;
    }

    writer.write_i32s(&[wire_int(data.probes.len())?, wire_int(data.probe_points)?])?;
    for probe in &data.probes {
        writer.write_i32s(&[probe.side, probe.point])?;
        writer.write_f64s(&interleave(&[
            probe.eta.as_slice(),
            probe.q.as_slice(),
            probe.rho.as_slice(),
        ]))?;
    }

    for scalars in data
        .mode_derivatives
        .iter()
        .chain(&data.position_derivatives)
    {
        writer.write_f64s(&scalars.to_array())?;
    }

    writer.write_i32s(&data.bitmask.words)
}

fn wire_int(value: usize) -> io::Result<i32> {
    i32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{value} does not fit a 32-bit record integer"),
        )
    })
}
