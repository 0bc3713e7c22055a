//! Core property extraction for `.xlsx` packages.
//!
//! Core properties live in the `docProps/core.xml` part and follow the Dublin
//! Core / OPC schema. Only the four fields the dictionary records are read.

use crate::error::{DictionaryError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike as _};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::{BufReader, Read as _};
use std::path::Path;
use zip::ZipArchive;

const CORE_PART: &str = "docProps/core.xml";
const PACKAGE_RELS_PART: &str = "_rels/.rels";
const CORE_RELATIONSHIP_SUFFIX: &str = "/metadata/core-properties";

/// Core property values found in the package; `None` when not recorded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoreProperties {
    pub creator: Option<String>,
    pub last_modified_by: Option<String>,
    pub created: Option<CoreTimestamp>,
    pub modified: Option<CoreTimestamp>,
}

/// `dcterms:created`/`dcterms:modified` value as found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreTimestamp {
    /// Parsed W3CDTF timestamp, normalized to UTC and whole seconds.
    Parsed(NaiveDateTime),
    /// Text that is not a recognizable timestamp, kept verbatim.
    Raw(String),
}

/// Read the core property block of the package at `path`.
///
/// A package without a core property part yields empty properties; a file
/// that is not a zip package is a [`DictionaryError::CorruptDocument`].
pub fn read_core_properties(path: &Path) -> Result<CoreProperties> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let Some(part_name) = locate_core_part(&mut archive)? else {
        tracing::warn!("No core property part in {}", path.display());
        return Ok(CoreProperties::default());
    };

    let mut xml = String::new();
    archive
        .by_name(&part_name)?
        .read_to_string(&mut xml)
        .map_err(|e| DictionaryError::corrupt(format!("Unreadable {part_name}: {e}")))?;

    tracing::debug!("Parsing core properties from {part_name}");
    parse_core_properties_xml(&xml)
}

/// Find the core property part: the standard location first, then whatever the
/// package relationships point at.
fn locate_core_part<R>(archive: &mut ZipArchive<R>) -> Result<Option<String>>
where
    R: std::io::Read + std::io::Seek,
{
    if archive.index_for_name(CORE_PART).is_some() {
        return Ok(Some(CORE_PART.to_owned()));
    }

    if archive.index_for_name(PACKAGE_RELS_PART).is_none() {
        return Ok(None);
    }

    let mut rels = String::new();
    archive
        .by_name(PACKAGE_RELS_PART)?
        .read_to_string(&mut rels)
        .map_err(|e| DictionaryError::corrupt(format!("Unreadable {PACKAGE_RELS_PART}: {e}")))?;

    let target = core_target_from_rels(&rels)?;
    Ok(target.filter(|name| archive.index_for_name(name).is_some()))
}

fn core_target_from_rels(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut rel_type = None;
                let mut target = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    match attr.key.as_ref() {
                        b"Type" => rel_type = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                if let (Some(rel_type), Some(target)) = (rel_type, target)
                    && rel_type.ends_with(CORE_RELATIONSHIP_SUFFIX)
                {
                    return Ok(Some(target.trim_start_matches('/').to_owned()));
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Which core field the reader is inside of.
#[derive(Clone, Copy)]
enum Field {
    Creator,
    LastModifiedBy,
    Created,
    Modified,
}

fn field_for(local_name: &[u8]) -> Option<Field> {
    match local_name {
        b"creator" => Some(Field::Creator),
        b"lastModifiedBy" => Some(Field::LastModifiedBy),
        b"created" => Some(Field::Created),
        b"modified" => Some(Field::Modified),
        _ => None,
    }
}

pub(crate) fn parse_core_properties_xml(xml: &str) -> Result<CoreProperties> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut props = CoreProperties::default();
    let mut current: Option<(Field, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                current = field_for(e.local_name().as_ref()).map(|f| (f, String::new()));
            }
            Event::Text(t) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(_) => {
                if let Some((field, text)) = current.take() {
                    let text = text.trim().to_owned();
                    if !text.is_empty() {
                        match field {
                            Field::Creator => props.creator = Some(text),
                            Field::LastModifiedBy => props.last_modified_by = Some(text),
                            Field::Created => props.created = Some(parse_w3cdtf(&text)),
                            Field::Modified => props.modified = Some(parse_w3cdtf(&text)),
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(props)
}

/// Parse the W3CDTF profile of ISO 8601 used by `dcterms:W3CDTF` fields.
fn parse_w3cdtf(text: &str) -> CoreTimestamp {
    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
        });

    match parsed {
        Ok(ts) => CoreTimestamp::Parsed(ts.with_nanosecond(0).unwrap_or(ts)),
        Err(_) => {
            tracing::warn!("Unrecognized core property timestamp: {text:?}");
            CoreTimestamp::Raw(text.to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>Budget</dc:title>
  <dc:creator>Ada &amp; Co</dc:creator>
  <cp:lastModifiedBy>Grace</cp:lastModifiedBy>
  <dcterms:created xsi:type="dcterms:W3CDTF">2024-03-01T09:30:00Z</dcterms:created>
  <dcterms:modified xsi:type="dcterms:W3CDTF">2024-03-02T10:15:30.250+02:00</dcterms:modified>
</cp:coreProperties>"#;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_core_properties() {
        let props = parse_core_properties_xml(CORE_XML).unwrap();
        assert_eq!(props.creator.as_deref(), Some("Ada & Co"));
        assert_eq!(props.last_modified_by.as_deref(), Some("Grace"));
        assert_eq!(
            props.created,
            Some(CoreTimestamp::Parsed(ts(2024, 3, 1, 9, 30, 0)))
        );
        // Offsets are normalized to UTC and sub-seconds dropped.
        assert_eq!(
            props.modified,
            Some(CoreTimestamp::Parsed(ts(2024, 3, 2, 8, 15, 30)))
        );
    }

    #[test]
    fn test_missing_and_empty_fields() {
        let xml = r#"<cp:coreProperties xmlns:cp="x" xmlns:dc="y"><dc:creator></dc:creator></cp:coreProperties>"#;
        let props = parse_core_properties_xml(xml).unwrap();
        assert_eq!(props, CoreProperties::default());
    }

    #[test]
    fn test_unparsable_timestamp_kept_raw() {
        assert_eq!(
            parse_w3cdtf("last tuesday"),
            CoreTimestamp::Raw("last tuesday".to_owned())
        );
        assert_eq!(
            parse_w3cdtf("2023-12-31"),
            CoreTimestamp::Parsed(ts(2023, 12, 31, 0, 0, 0))
        );
    }

    #[test]
    fn test_core_target_from_rels() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="/props/core.xml"/>
</Relationships>"#;
        assert_eq!(
            core_target_from_rels(rels).unwrap().as_deref(),
            Some("props/core.xml")
        );
    }
}
