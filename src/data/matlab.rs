//! Reader for MATLAB level 5 MAT files.
//!
//! Only what the dashboards need is decoded: numeric matrices, char arrays and
//! cell arrays of char arrays, optionally zlib-compressed. Structs, sparse
//! matrices and objects are skipped.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::data::parser::ParsedTable;
use crate::error::LoadError;

const HEADER_LEN: usize = 128;

const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT16: u32 = 3;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_SINGLE: u32 = 7;
const MI_DOUBLE: u32 = 9;
const MI_INT64: u32 = 12;
const MI_UINT64: u32 = 13;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;
const MI_UTF8: u32 = 16;
const MI_UTF16: u32 = 17;

const MX_CELL: u32 = 1;
const MX_CHAR: u32 = 4;
const MX_DOUBLE: u32 = 6;
const MX_UINT64: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u16(self, b: [u8; 2]) -> u16 {
        match self {
            Endian::Little => u16::from_le_bytes(b),
            Endian::Big => u16::from_be_bytes(b),
        }
    }

    fn i16(self, b: [u8; 2]) -> i16 {
        self.u16(b) as i16
    }

    fn u32(self, b: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(b),
            Endian::Big => u32::from_be_bytes(b),
        }
    }

    fn i32(self, b: [u8; 4]) -> i32 {
        self.u32(b) as i32
    }

    fn u64(self, b: [u8; 8]) -> u64 {
        match self {
            Endian::Little => u64::from_le_bytes(b),
            Endian::Big => u64::from_be_bytes(b),
        }
    }
}

fn mat_error(message: impl Into<String>) -> LoadError {
    LoadError::Mat(message.into())
}

fn fixed<const N: usize>(chunk: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(chunk);
    buf
}

fn decode<const N: usize>(data: &[u8], convert: impl Fn([u8; N]) -> f64) -> Vec<f64> {
    data.chunks_exact(N).map(|c| convert(fixed(c))).collect()
}

/// Sequential reader over a buffer of data elements.
struct Elements<'a> {
    bytes: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> Elements<'a> {
    fn new(bytes: &'a [u8], endian: Endian) -> Self {
        Self {
            bytes,
            pos: 0,
            endian,
        }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], LoadError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| mat_error("truncated data element"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn align8(&mut self) {
        let padded = (self.pos + 7) & !7;
        self.pos = padded.min(self.bytes.len());
    }

    /// Next element as `(data type, payload)`. Handles the packed small-element form.
    fn next_element(&mut self) -> Result<(u32, &'a [u8]), LoadError> {
        let tag = self.endian.u32(fixed(self.take(4)?));
        if tag >> 16 != 0 {
            let data_type = tag & 0xFFFF;
            let len = ((tag >> 16) as usize).min(4);
            let payload = self.take(4)?;
            return Ok((data_type, &payload[..len]));
        }

        let len = self.endian.u32(fixed(self.take(4)?)) as usize;
        let payload = self.take(len)?;
        if tag != MI_COMPRESSED {
            self.align8();
        }
        Ok((tag, payload))
    }
}

/// Decoded content of a MAT variable.
#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    /// Column-major real values.
    Numeric(Vec<f64>),
    /// One string per row of the char matrix, right-trimmed.
    Char(Vec<String>),
    Cell(Vec<MatVariable>),
    Unsupported(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatVariable {
    pub name: String,
    pub dims: Vec<usize>,
    pub value: MatValue,
}

impl MatVariable {
    /// Strings held by a char matrix or a cell array of char arrays.
    pub fn strings(&self) -> Option<Vec<String>> {
        match &self.value {
            MatValue::Char(rows) => Some(rows.clone()),
            MatValue::Cell(items) => items
                .iter()
                .map(|item| match &item.value {
                    MatValue::Char(rows) => Some(rows.concat()),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatFile {
    pub variables: Vec<MatVariable>,
}

impl MatFile {
    pub fn find(&self, name: &str) -> Option<&MatVariable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// Parse a level 5 MAT file.
pub fn parse(bytes: &[u8]) -> Result<MatFile, LoadError> {
    if bytes.len() < HEADER_LEN {
        return Err(mat_error("file is shorter than the MAT header"));
    }
    let text = String::from_utf8_lossy(&bytes[..116]);
    if text.starts_with("MATLAB 7.3") {
        return Err(mat_error("HDF5-based MAT files (v7.3) are not supported"));
    }
    let endian = match &bytes[126..128] {
        b"IM" => Endian::Little,
        b"MI" => Endian::Big,
        _ => return Err(mat_error("missing MAT endian indicator")),
    };

    let variables = parse_elements(&bytes[HEADER_LEN..], endian)?;
    Ok(MatFile { variables })
}

fn parse_elements(bytes: &[u8], endian: Endian) -> Result<Vec<MatVariable>, LoadError> {
    let mut elements = Elements::new(bytes, endian);
    let mut variables = Vec::new();
    while !elements.is_done() {
        let (data_type, payload) = elements.next_element()?;
        match data_type {
            MI_COMPRESSED => {
                let mut inflated = Vec::new();
                ZlibDecoder::new(payload).read_to_end(&mut inflated)?;
                variables.extend(parse_elements(&inflated, endian)?);
            }
            MI_MATRIX => {
                if let Some(variable) = parse_matrix(payload, endian)? {
                    variables.push(variable);
                }
            }
            other => tracing::debug!("Skipping top-level MAT element of type {}", other),
        }
    }
    Ok(variables)
}

fn parse_matrix(payload: &[u8], endian: Endian) -> Result<Option<MatVariable>, LoadError> {
    if payload.is_empty() {
        return Ok(None);
    }
    let mut sub = Elements::new(payload, endian);

    let (_, flags) = sub.next_element()?;
    if flags.len() < 4 {
        return Err(mat_error("array flags too short"));
    }
    let class = endian.u32(fixed(&flags[..4])) & 0xFF;

    let (_, dims_raw) = sub.next_element()?;
    let dims: Vec<usize> = dims_raw
        .chunks_exact(4)
        .map(|c| endian.i32(fixed(c)).max(0) as usize)
        .collect();
    let count = dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| mat_error("matrix dimensions overflow"))?;

    let (_, name_raw) = sub.next_element()?;
    let name = String::from_utf8_lossy(name_raw).into_owned();

    let value = match class {
        MX_CHAR => {
            let (data_type, data) = sub.next_element()?;
            let chars = decode_chars(data_type, data, endian);
            if chars.len() < count {
                return Err(mat_error("char array is shorter than its dimensions"));
            }
            MatValue::Char(char_rows(&chars, &dims))
        }
        MX_CELL => {
            // A corrupt count runs out of payload long before it runs out of cells.
            let mut items = Vec::new();
            for _ in 0..count {
                let (data_type, data) = sub.next_element()?;
                if data_type == MI_MATRIX {
                    if let Some(item) = parse_matrix(data, endian)? {
                        items.push(item);
                    }
                }
            }
            MatValue::Cell(items)
        }
        MX_DOUBLE..=MX_UINT64 => {
            let (data_type, data) = sub.next_element()?;
            MatValue::Numeric(decode_numeric(data_type, data, endian)?)
        }
        other => MatValue::Unsupported(other),
    };

    Ok(Some(MatVariable { name, dims, value }))
}

fn decode_numeric(data_type: u32, data: &[u8], endian: Endian) -> Result<Vec<f64>, LoadError> {
    let values = match data_type {
        MI_INT8 => data.iter().map(|&b| b as i8 as f64).collect(),
        MI_UINT8 => data.iter().map(|&b| b as f64).collect(),
        MI_INT16 => decode::<2>(data, |b| endian.i16(b) as f64),
        MI_UINT16 => decode::<2>(data, |b| endian.u16(b) as f64),
        MI_INT32 => decode::<4>(data, |b| endian.i32(b) as f64),
        MI_UINT32 => decode::<4>(data, |b| endian.u32(b) as f64),
        MI_SINGLE => decode::<4>(data, |b| f32::from_bits(endian.u32(b)) as f64),
        MI_DOUBLE => decode::<8>(data, |b| f64::from_bits(endian.u64(b))),
        MI_INT64 => decode::<8>(data, |b| endian.u64(b) as i64 as f64),
        MI_UINT64 => decode::<8>(data, |b| endian.u64(b) as f64),
        other => return Err(mat_error(format!("unsupported numeric data type {other}"))),
    };
    Ok(values)
}

fn decode_chars(data_type: u32, data: &[u8], endian: Endian) -> Vec<char> {
    match data_type {
        MI_UINT16 | MI_UTF16 => {
            let units = data.chunks_exact(2).map(|c| endian.u16(fixed(c)));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        MI_UTF8 => String::from_utf8_lossy(data).chars().collect(),
        _ => data.iter().map(|&b| b as char).collect(),
    }
}

/// Reassemble the rows of a column-major char matrix.
fn char_rows(chars: &[char], dims: &[usize]) -> Vec<String> {
    let rows = dims.first().copied().unwrap_or(0);
    let cols = dims.get(1).copied().unwrap_or(0);
    (0..rows)
        .map(|r| {
            let row: String = (0..cols)
                .filter_map(|c| chars.get(c * rows + r))
                .collect();
            row.trim_end_matches([' ', '\0']).to_string()
        })
        .collect()
}

/// Data table and metadata extracted from a telemetry MAT file.
#[derive(Debug, Clone, PartialEq)]
pub struct MatTable {
    pub table: ParsedTable,
    pub date_created: Option<String>,
}

/// Extract the `DATA` matrix (samples by variables) with names from `NAM`,
/// re-basing `TIME` so the first sample is at zero.
pub fn read_table(bytes: &[u8]) -> Result<MatTable, LoadError> {
    let file = parse(bytes)?;

    let data = file
        .find("DATA")
        .ok_or(LoadError::MissingMatVariable("DATA"))?;
    let MatValue::Numeric(values) = &data.value else {
        return Err(mat_error("DATA is not a numeric matrix"));
    };
    let rows = data.dims.first().copied().unwrap_or(0);
    let cols = data.dims.get(1).copied().unwrap_or(1);
    let expected = rows
        .checked_mul(cols)
        .ok_or_else(|| mat_error("DATA dimensions overflow"))?;
    if values.len() < expected {
        return Err(mat_error("DATA holds fewer values than its dimensions"));
    }

    let names: Vec<String> = file
        .find("NAM")
        .ok_or(LoadError::MissingMatVariable("NAM"))?
        .strings()
        .ok_or_else(|| mat_error("NAM does not hold strings"))?
        .into_iter()
        .map(|n| n.trim().to_string())
        .collect();
    if names.len() != cols {
        return Err(mat_error(format!(
            "NAM has {} names but DATA has {} columns",
            names.len(),
            cols
        )));
    }

    let mut columns: Vec<Vec<f64>> = (0..cols)
        .map(|j| values[j * rows..(j + 1) * rows].to_vec())
        .collect();

    if let Some(idx) = names.iter().position(|n| n == "TIME") {
        if let Some(&t0) = columns[idx].first() {
            for t in &mut columns[idx] {
                *t -= t0;
            }
        }
    }

    let date_created = file
        .find("Date_Created")
        .and_then(MatVariable::strings)
        .and_then(|s| s.into_iter().next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(MatTable {
        table: ParsedTable {
            columns: names,
            values: columns,
        },
        date_created,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn time_column_starts_at_zero() {
        let mat = read_table(&telemetry()).unwrap();
        assert_eq!(mat.table.columns, vec!["TIME", "ALT"]);
        assert_eq!(mat.table.values[0][0], 0.0);
        assert_eq!(mat.table.values[0], vec![0.0, 0.5, 1.0]);
        assert_eq!(mat.table.values[1], vec![1.0, 2.0, 3.0]);
        assert_eq!(mat.date_created.as_deref(), Some("2019-08-14"));
    }

    #[test]
    fn compressed_elements_are_inflated() {
        let bytes = file(&[
            compressed(&double_matrix("DATA", &[vec![5.0, 6.0]])),
            compressed(&char_matrix("NAM", &["TIME"])),
        ]);
        let mat = read_table(&bytes).unwrap();
        assert_eq!(mat.table.values[0], vec![0.0, 1.0]);
        assert_eq!(mat.date_created, None);
    }

    #[test]
    fn char_matrix_rows_are_trimmed() {
        let parsed = parse(&file(&[char_matrix("NAM", &["TIME", "X", "SPEED"])])).unwrap();
        let nam = parsed.find("NAM").unwrap();
        assert_eq!(nam.dims, vec![3, 5]);
        assert_eq!(
            nam.strings().unwrap(),
            vec!["TIME".to_string(), "X".to_string(), "SPEED".to_string()]
        );
    }

    #[test]
    fn missing_variables_are_reported() {
        let bytes = file(&[char_matrix("NAM", &["TIME"])]);
        assert!(matches!(
            read_table(&bytes),
            Err(LoadError::MissingMatVariable("DATA"))
        ));
    }

    #[test]
    fn name_count_must_match_columns() {
        let bytes = file(&[
            double_matrix("DATA", &[vec![1.0], vec![2.0]]),
            char_matrix("NAM", &["TIME"]),
        ]);
        assert!(matches!(read_table(&bytes), Err(LoadError::Mat(_))));
    }

    #[test]
    fn oversized_dimensions_are_errors() {
        let cell = matrix("NAM", MX_CELL, &[i32::MAX, i32::MAX], MI_INT8, &[]);
        assert!(matches!(parse(&file(&[cell])), Err(LoadError::Mat(_))));

        let huge = [i32::MAX, i32::MAX, i32::MAX];
        let numeric = matrix("DATA", MX_DOUBLE, &huge, MI_DOUBLE, &1.0f64.to_le_bytes());
        assert!(matches!(parse(&file(&[numeric])), Err(LoadError::Mat(_))));

        let chars = matrix("NAM", MX_CHAR, &[i32::MAX, 2], MI_UINT16, &[b'A', 0]);
        assert!(matches!(parse(&file(&[chars])), Err(LoadError::Mat(_))));
    }

    #[test]
    fn data_shorter_than_its_dimensions_is_an_error() {
        let dims = [i32::MAX, i32::MAX];
        let data = matrix("DATA", MX_DOUBLE, &dims, MI_DOUBLE, &2.0f64.to_le_bytes());
        let bytes = file(&[data, char_matrix("NAM", &["TIME"])]);
        assert!(matches!(read_table(&bytes), Err(LoadError::Mat(_))));
    }

    #[test]
    fn short_or_foreign_files_are_rejected() {
        assert!(parse(b"not a mat file").is_err());
        let mut bytes = file(&[]);
        bytes[126] = b'X';
        assert!(parse(&bytes).is_err());
    }
}
