//! Decoder and encoder for the solver's `mdat` solution snapshot.

mod model;
mod parser;
mod writer;

pub use model::{
    BitmaskTable, BodyStreamline, BoundaryLayerSide, EdgeIndices, FlowState, FrequencySide,
    FrequencyTables, GridLine, MdatSizing, ProbeProfile, SolutionData, SolverSwitches,
};

use crate::common::MsesConfig;
use crate::domain::{DecodeResult, MsesError, MsesResult};
use crate::record::RecordWriter;
use parser::MdatDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

pub fn decode_solution<R: Read>(reader: R, config: &MsesConfig) -> DecodeResult<SolutionData> {
    MdatDecoder::new(reader, config).decode()
}

pub fn decode_solution_file(path: impl AsRef<Path>) -> DecodeResult<SolutionData> {
    decode_solution_file_with(path, &MsesConfig::default())
}

pub fn decode_solution_file_with(
    path: impl AsRef<Path>,
    config: &MsesConfig,
) -> DecodeResult<SolutionData> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| {
        MsesError::io_system(
            "IO.MDAT_OPEN",
            format!("failed to open mdat file '{}': {}", path.display(), source),
        )
    })?;
    decode_solution(BufReader::new(file), config).map_err(|error| {
        MsesError::new(
            error.category(),
            error.placeholder(),
            format!("{} ({})", error.message(), path.display()),
        )
    })
}

pub fn encode_solution(data: &SolutionData) -> MsesResult<Vec<u8>> {
    let mut writer = RecordWriter::new(Vec::new());
    writer::write_solution(&mut writer, data).map_err(|source| {
        MsesError::internal(
            "SYS.MDAT_ENCODE",
            format!("failed to encode mdat records: {source}"),
        )
    })?;
    Ok(writer.into_inner())
}

pub fn write_solution_file(path: impl AsRef<Path>, data: &SolutionData) -> MsesResult<()> {
    let path = path.as_ref();
    let bytes = encode_solution(data)?;
    fs::write(path, bytes).map_err(|source| {
        MsesError::io_system(
            "IO.MDAT_WRITE",
            format!("failed to write mdat file '{}': {}", path.display(), source),
        )
    })
}
