//! Workbook globals for legacy `.xls` files.
//!
//! An `.xls` file is an OLE compound file whose `Workbook` stream (`Book` for
//! BIFF5) is a sequence of `[type: u16][len: u16][data]` records. Only the
//! globals substream is walked, up to its `EOF` record.

use crate::error::{DictionaryError, Result};
use std::io::Read as _;
use std::path::Path;

const RECORD_BOF: u16 = 0x0809;
const RECORD_EOF: u16 = 0x000A;
const RECORD_DATEMODE: u16 = 0x0022;
const RECORD_FILEPASS: u16 = 0x002F;
const RECORD_WRITEACCESS: u16 = 0x005C;

const BIFF8_VERSION: u16 = 0x0600;

/// Date system declared by a workbook's `DATEMODE` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMode {
    /// Serial day 1 is 1900-01-01; the default when no flag is set.
    Windows1900,
    /// Serial day 0 is 1904-01-01.
    Mac1904,
}

/// Globals needed by the metadata reader.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LegacyGlobals {
    /// Name from the `WRITEACCESS` record, padding removed.
    pub user_name: Option<String>,
    /// `None` when the globals carry no `DATEMODE` record.
    pub date_mode: Option<DateMode>,
}

/// Open the compound file at `path` and read its workbook globals.
pub fn read_legacy_globals(path: &Path) -> Result<LegacyGlobals> {
    let mut compound = cfb::open(path).map_err(map_cfb_error)?;

    let stream_name = ["/Workbook", "/Book"]
        .into_iter()
        .find(|name| compound.is_stream(name))
        .ok_or_else(|| DictionaryError::corrupt("No Workbook stream in compound file"))?;

    let mut data = Vec::new();
    compound
        .open_stream(stream_name)
        .and_then(|mut stream| stream.read_to_end(&mut data))
        .map_err(map_cfb_error)?;

    tracing::debug!("Read {} bytes from {stream_name}", data.len());
    parse_globals(&data)
}

fn map_cfb_error(err: std::io::Error) -> DictionaryError {
    match err.kind() {
        std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
            DictionaryError::corrupt(format!("Invalid compound file: {err}"))
        }
        _ => DictionaryError::Io(err),
    }
}

struct Record<'a> {
    kind: u16,
    data: &'a [u8],
}

fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    bytes
        .get(offset..offset + 2)
        .and_then(|b| <[u8; 2]>::try_from(b).ok())
        .map(u16::from_le_bytes)
}

fn records(stream: &[u8]) -> impl Iterator<Item = Result<Record<'_>>> {
    let mut offset = 0;
    std::iter::from_fn(move || {
        if offset >= stream.len() {
            return None;
        }
        let header = read_u16(stream, offset).zip(read_u16(stream, offset + 2));
        let Some((kind, len)) = header else {
            offset = stream.len();
            return Some(Err(DictionaryError::corrupt("Truncated record header")));
        };
        let start = offset + 4;
        let end = start + usize::from(len);
        let Some(data) = stream.get(start..end) else {
            offset = stream.len();
            return Some(Err(DictionaryError::corrupt(format!(
                "Record 0x{kind:04X} overruns the workbook stream"
            ))));
        };
        offset = end;
        Some(Ok(Record { kind, data }))
    })
}

pub(crate) fn parse_globals(stream: &[u8]) -> Result<LegacyGlobals> {
    let mut iter = records(stream);

    let bof = iter
        .next()
        .ok_or_else(|| DictionaryError::corrupt("Empty workbook stream"))??;
    // BIFF2-4 use 0x0009/0x0209/0x0409/0x0809 with a version in the high byte.
    if bof.kind & 0x00FF != RECORD_BOF & 0x00FF {
        return Err(DictionaryError::corrupt(format!(
            "Workbook stream does not start with BOF (found 0x{:04X})",
            bof.kind
        )));
    }
    let is_biff8 = read_u16(bof.data, 0) == Some(BIFF8_VERSION);

    let mut globals = LegacyGlobals::default();
    for record in iter {
        let record = record?;
        match record.kind {
            RECORD_EOF => break,
            RECORD_FILEPASS => {
                tracing::warn!("Workbook is encrypted; remaining globals are unreadable");
                break;
            }
            RECORD_WRITEACCESS => {
                globals.user_name = decode_write_access(record.data, is_biff8);
            }
            RECORD_DATEMODE => {
                globals.date_mode = read_u16(record.data, 0).map(|flag| {
                    if flag == 1 {
                        DateMode::Mac1904
                    } else {
                        DateMode::Windows1900
                    }
                });
            }
            _ => {}
        }
    }

    Ok(globals)
}

fn decode_write_access(data: &[u8], is_biff8: bool) -> Option<String> {
    let name = if is_biff8 {
        let cch = usize::from(read_u16(data, 0)?);
        let high_byte = data.get(2)? & 0x01 == 0x01;
        let chars = data.get(3..)?;
        if high_byte {
            let units: Vec<u16> = chars
                .chunks_exact(2)
                .take(cch)
                .filter_map(|b| <[u8; 2]>::try_from(b).ok().map(u16::from_le_bytes))
                .collect();
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect::<String>()
        } else {
            chars.iter().take(cch).map(|&b| char::from(b)).collect()
        }
    } else {
        let cch = usize::from(*data.first()?);
        data.get(1..)?
            .iter()
            .take(cch)
            .map(|&b| char::from(b))
            .collect()
    };

    let name = name.trim_end_matches([' ', '\0']).to_owned();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: u16, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&u16::try_from(data.len()).unwrap().to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    fn bof_biff8() -> Vec<u8> {
        let mut data = vec![0u8; 16];
        data[..2].copy_from_slice(&BIFF8_VERSION.to_le_bytes());
        data[2..4].copy_from_slice(&0x0005u16.to_le_bytes());
        record(RECORD_BOF, &data)
    }

    fn write_access_biff8(name: &str) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&u16::try_from(name.len()).unwrap().to_le_bytes());
        data.push(0);
        data.extend_from_slice(name.as_bytes());
        data.resize(112, b' ');
        record(RECORD_WRITEACCESS, &data)
    }

    #[test]
    fn test_parse_user_name_and_1904_mode() {
        let mut stream = bof_biff8();
        stream.extend(write_access_biff8("jdoe"));
        stream.extend(record(RECORD_DATEMODE, &1u16.to_le_bytes()));
        stream.extend(record(RECORD_EOF, &[]));

        let globals = parse_globals(&stream).unwrap();
        assert_eq!(globals.user_name.as_deref(), Some("jdoe"));
        assert_eq!(globals.date_mode, Some(DateMode::Mac1904));
    }

    #[test]
    fn test_utf16_user_name() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_le_bytes());
        data.push(1);
        for unit in "Zoë".encode_utf16().take(2) {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_write_access(&data, true).as_deref(), Some("Zo"));
    }

    #[test]
    fn test_records_after_eof_are_ignored() {
        let mut stream = bof_biff8();
        stream.extend(record(RECORD_DATEMODE, &0u16.to_le_bytes()));
        stream.extend(record(RECORD_EOF, &[]));
        stream.extend(write_access_biff8("sheet-level"));

        let globals = parse_globals(&stream).unwrap();
        assert_eq!(globals.user_name, None);
        assert_eq!(globals.date_mode, Some(DateMode::Windows1900));
    }

    #[test]
    fn test_missing_bof_is_corrupt() {
        let stream = record(RECORD_DATEMODE, &1u16.to_le_bytes());
        assert!(matches!(
            parse_globals(&stream),
            Err(DictionaryError::CorruptDocument(_))
        ));
    }

    #[test]
    fn test_truncated_record_is_corrupt() {
        let mut stream = bof_biff8();
        stream.extend_from_slice(&RECORD_WRITEACCESS.to_le_bytes());
        stream.extend_from_slice(&50u16.to_le_bytes());
        stream.extend_from_slice(b"short");
        assert!(matches!(
            parse_globals(&stream),
            Err(DictionaryError::CorruptDocument(_))
        ));
    }
}
