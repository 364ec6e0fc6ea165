//! Fortran unformatted sequential records.
//!
//! Every record on disk is `i32 marker, payload, i32 marker` with both markers
//! equal. Integers and doubles use the host's native byte order, since the
//! solver writes them that way and the files carry no byte-order tag.

use crate::domain::MsesError;
use std::collections::TryReserveError;
use std::io::{self, Read, Write};

const MARKER_BYTES: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record {record} at byte {offset}: begin marker {begin} does not match end marker {end}")]
    MarkerMismatch {
        record: usize,
        offset: u64,
        begin: i32,
        end: i32,
    },
    #[error("record {record} at byte {offset}: stream ended before {wanted} bytes could be read")]
    ShortRead {
        record: usize,
        offset: u64,
        wanted: usize,
    },
    #[error("record {record} at byte {offset}: {count} elements exceeds the limit of {limit}")]
    Oversized {
        record: usize,
        offset: u64,
        count: usize,
        limit: usize,
    },
    #[error("record {record}: cannot allocate {bytes} bytes")]
    Allocation { record: usize, bytes: usize },
    #[error("record {record} at byte {offset}: {source}")]
    Io {
        record: usize,
        offset: u64,
        source: io::Error,
    },
}

impl RecordError {
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::MarkerMismatch { .. } | Self::ShortRead { .. } | Self::Oversized { .. }
        )
    }

    /// Maps the record failure into the library error taxonomy.
    pub fn into_mses(self, file_label: &str) -> MsesError {
        match &self {
            Self::MarkerMismatch { .. } | Self::ShortRead { .. } | Self::Oversized { .. } => {
                MsesError::malformed("FORMAT.RECORD", format!("{file_label}: {self}"))
            }
            Self::Allocation { .. } => {
                MsesError::resource("ALLOC.RECORD", format!("{file_label}: {self}"))
            }
            Self::Io { .. } => {
                MsesError::io_system("IO.RECORD_READ", format!("{file_label}: {self}"))
            }
        }
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Reads one bracketed record at a time from a binary stream.
pub struct RecordReader<R> {
    inner: R,
    records_read: usize,
    offset: u64,
    max_elements: usize,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_element_limit(inner, usize::MAX)
    }

    pub fn with_element_limit(inner: R, max_elements: usize) -> Self {
        Self {
            inner,
            records_read: 0,
            offset: 0,
            max_elements,
        }
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn read_i32s(&mut self, count: usize) -> RecordResult<Vec<i32>> {
        self.read_record(count, 4, |chunk| {
            i32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
        })
    }

    pub fn read_f64s(&mut self, count: usize) -> RecordResult<Vec<f64>> {
        self.read_record(count, 8, |chunk| {
            let mut buffer = [0_u8; 8];
            buffer.copy_from_slice(chunk);
            f64::from_ne_bytes(buffer)
        })
    }

    pub fn read_i32(&mut self) -> RecordResult<i32> {
        Ok(self.read_i32s(1)?[0])
    }

    /// Reads a fixed-width character record and trims its padding.
    pub fn read_text(&mut self, len: usize) -> RecordResult<String> {
        let bytes = self.read_record(len, 1, |chunk| chunk[0])?;
        let end = bytes
            .iter()
            .rposition(|byte| *byte != b' ' && *byte != 0)
            .map_or(0, |index| index + 1);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    fn read_record<T>(
        &mut self,
        count: usize,
        element_size: usize,
        decode: impl Fn(&[u8]) -> T,
    ) -> RecordResult<Vec<T>> {
        let record = self.records_read;
        let record_offset = self.offset;
        if count > self.max_elements {
            return Err(RecordError::Oversized {
                record,
                offset: record_offset,
                count,
                limit: self.max_elements,
            });
        }
        let payload_len = count
            .checked_mul(element_size)
            .ok_or(RecordError::Allocation {
                record,
                bytes: usize::MAX,
            })?;

        let begin = self.read_marker()?;

        let mut payload = Vec::new();
        payload
            .try_reserve_exact(payload_len)
            .map_err(|_| RecordError::Allocation {
                record,
                bytes: payload_len,
            })?;
        payload.resize(payload_len, 0_u8);
        self.fill(&mut payload)?;

        let end = self.read_marker()?;
        if begin != end {
            return Err(RecordError::MarkerMismatch {
                record,
                offset: record_offset,
                begin,
                end,
            });
        }

        let mut values = Vec::new();
        values
            .try_reserve_exact(count)
            .map_err(|_| RecordError::Allocation {
                record,
                bytes: payload_len,
            })?;
        values.extend(payload.chunks_exact(element_size).map(decode));

        self.records_read += 1;
        Ok(values)
    }

    fn read_marker(&mut self) -> RecordResult<i32> {
        let mut buffer = [0_u8; MARKER_BYTES];
        self.fill(&mut buffer)?;
        Ok(i32::from_ne_bytes(buffer))
    }

    fn fill(&mut self, buffer: &mut [u8]) -> RecordResult<()> {
        let record = self.records_read;
        let offset = self.offset;
        let wanted = buffer.len();
        self.inner.read_exact(buffer).map_err(|source| {
            if source.kind() == io::ErrorKind::UnexpectedEof {
                RecordError::ShortRead {
                    record,
                    offset,
                    wanted,
                }
            } else {
                RecordError::Io {
                    record,
                    offset,
                    source,
                }
            }
        })?;
        self.offset += wanted as u64;
        Ok(())
    }
}

/// Splits a record of `N`-tuples into `N` column vectors.
pub fn split_columns<const N: usize>(
    values: &[f64],
) -> Result<[Vec<f64>; N], TryReserveError> {
    let rows = values.len() / N;
    let mut columns: [Vec<f64>; N] = std::array::from_fn(|_| Vec::new());
    for column in &mut columns {
        column.try_reserve_exact(rows)?;
    }
    for tuple in values.chunks_exact(N) {
        for (column, value) in columns.iter_mut().zip(tuple) {
            column.push(*value);
        }
    }
    Ok(columns)
}

/// Interleaves equal-length columns into one tuple record.
pub fn interleave(columns: &[&[f64]]) -> Vec<f64> {
    let rows = columns.first().map_or(0, |column| column.len());
    let mut values = Vec::with_capacity(rows * columns.len());
    for row in 0..rows {
        for column in columns {
            values.push(column[row]);
        }
    }
    values
}

/// Writes records in the same layout the solver produces.
pub struct RecordWriter<W> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_i32s(&mut self, values: &[i32]) -> io::Result<()> {
        self.write_marker(values.len() * 4)?;
        for value in values {
            self.inner.write_all(&value.to_ne_bytes())?;
        }
        self.write_marker(values.len() * 4)
    }

    pub fn write_f64s(&mut self, values: &[f64]) -> io::Result<()> {
        self.write_marker(values.len() * 8)?;
        for value in values {
            self.inner.write_all(&value.to_ne_bytes())?;
        }
        self.write_marker(values.len() * 8)
    }

    /// Writes `text` right-padded with spaces to exactly `len` bytes.
    pub fn write_text(&mut self, text: &str, len: usize) -> io::Result<()> {
        let mut bytes = vec![b' '; len];
        let source = text.as_bytes();
        let copied = source.len().min(len);
        bytes[..copied].copy_from_slice(&source[..copied]);

        self.write_marker(len)?;
        self.inner.write_all(&bytes)?;
        self.write_marker(len)
    }

    fn write_marker(&mut self, payload_len: usize) -> io::Result<()> {
        let marker = i32::try_from(payload_len).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("record payload of {payload_len} bytes does not fit an i32 marker"),
            )
        })?;
        self.inner.write_all(&marker.to_ne_bytes())
    }
}
