//! Decoder and encoder for the solver's `sensx` sensitivity file.

mod model;
mod parser;
mod writer;

pub use model::{
    BodyGeometry, BodyIndices, FlowDerivatives, GlobalForces, ModalScalars, ModeSide,
    PositionSide, SensitivityData, SensxSizing, ShapeMode, ShapePosition, ShapeTable, SideShape,
    SurfaceSideData,
};

use crate::common::MsesConfig;
use crate::domain::{DecodeResult, MsesError, MsesResult};
use crate::record::RecordWriter;
use parser::SensxDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

/// Decodes a sensx stream positioned at its first record.
pub fn decode_sensitivity<R: Read>(
    reader: R,
    config: &MsesConfig,
) -> DecodeResult<SensitivityData> {
    SensxDecoder::new(reader, config).decode()
}

pub fn decode_sensitivity_file(path: impl AsRef<Path>) -> DecodeResult<SensitivityData> {
    decode_sensitivity_file_with(path, &MsesConfig::default())
}

pub fn decode_sensitivity_file_with(
    path: impl AsRef<Path>,
    config: &MsesConfig,
) -> DecodeResult<SensitivityData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| {
        MsesError::io_system(
            "IO.SENSX_OPEN",
            format!("failed to open sensx file '{}': {}", path.display(), source),
        )
    })?;
    decode_sensitivity(BufReader::new(file), config).map_err(|error| {
        MsesError::new(
            error.category(),
            error.placeholder(),
            format!("{} ({})", error.message(), path.display()),
        )
    })
}

/// Encodes `data` in the sensx wire format.
///
/// The sizing record declares the positions actually carried, so a value
/// decoded under the legacy guard (`npos > 0`, no positions) re-encodes
/// with `npos = 0`.
pub fn encode_sensitivity(data: &SensitivityData) -> MsesResult<Vec<u8>> {
    let mut writer = RecordWriter::new(Vec::new());
    writer::write_sensitivity(&mut writer, data).map_err(|source| {
        MsesError::internal(
            "SYS.SENSX_ENCODE",
            format!("failed to encode sensx records: {source}"),
        )
    })?;
    Ok(writer.into_inner())
}

pub fn write_sensitivity_file(path: impl AsRef<Path>, data: &SensitivityData) -> MsesResult<()> {
    let path = path.as_ref();
    let bytes = encode_sensitivity(data)?;
    fs::write(path, bytes).map_err(|source| {
        MsesError::io_system(
            "IO.SENSX_WRITE",
            format!("failed to write sensx file '{}': {}", path.display(), source),
        )
    })
}
