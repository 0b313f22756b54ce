//! Decoding of attribute-tagged items into plain values.
//!
//! The key/value store returns items as maps of tagged attributes
//! (string, binary, string-set, binary-set). This module flattens those
//! into plain Rust values: binary attributes are gzip blobs holding UTF-8
//! text, and several text attributes are `@`-delimited composite records
//! whose field positions are entity-specific.
//!
//! The `@` encoding has no escaping; free text containing `@` corrupts the
//! record. That is an upstream ingestion-pipeline limitation and is not
//! papered over here.

use std::io::Read;

use aws_sdk_dynamodb::types::AttributeValue;
use flate2::read::GzDecoder;

use super::Item;

/// Delimiter for composite records.
pub const FIELD_DELIMITER: char = '@';

/// Sentinel district value meaning at-large / no district.
pub const AT_LARGE: &str = "@";

/// Month names for long-form date rendering.
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Errors raised while decoding a raw item.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("missing attribute {0}")]
    Missing(&'static str),
    #[error("attribute {0} has an unexpected type tag")]
    WrongType(&'static str),
    #[error("failed to decompress attribute {0}: {1}")]
    Gzip(&'static str, std::io::Error),
    #[error("attribute {0} is not valid UTF-8")]
    Utf8(&'static str),
}

/// Required string attribute.
///
/// # Errors
///
/// Returns [`DecodeError::Missing`] when absent and
/// [`DecodeError::WrongType`] when present under a different tag.
pub fn req_s<'a>(item: &'a Item, name: &'static str) -> Result<&'a str, DecodeError> {
    match item.get(name) {
        None => Err(DecodeError::Missing(name)),
        Some(AttributeValue::S(s)) => Ok(s),
        Some(_) => Err(DecodeError::WrongType(name)),
    }
}

/// Optional string attribute; absent or non-string reads as `None`.
#[must_use]
pub fn opt_s<'a>(item: &'a Item, name: &str) -> Option<&'a str> {
    match item.get(name) {
        Some(AttributeValue::S(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// Optional string attribute rendered as an owned string, `""` when absent.
///
/// Responses keep a stable shape: missing optionals become empty strings,
/// never null or absent keys.
#[must_use]
pub fn s_or_empty(item: &Item, name: &str) -> String {
    opt_s(item, name).unwrap_or_default().to_string()
}

/// String-set attribute; absent reads as an empty list.
#[must_use]
pub fn string_set(item: &Item, name: &str) -> Vec<String> {
    match item.get(name) {
        Some(AttributeValue::Ss(values)) => values.clone(),
        _ => Vec::new(),
    }
}

fn gunzip(name: &'static str, bytes: &[u8]) -> Result<String, DecodeError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut buf = Vec::new();
    decoder
        .read_to_end(&mut buf)
        .map_err(|e| DecodeError::Gzip(name, e))?;
    String::from_utf8(buf).map_err(|_| DecodeError::Utf8(name))
}

/// Required gzip-compressed binary attribute, decompressed to text.
///
/// # Errors
///
/// Fails when the attribute is absent, not binary, not valid gzip, or the
/// decompressed bytes are not UTF-8.
pub fn gzip_s(item: &Item, name: &'static str) -> Result<String, DecodeError> {
    match item.get(name) {
        None => Err(DecodeError::Missing(name)),
        Some(AttributeValue::B(blob)) => gunzip(name, blob.as_ref()),
        Some(_) => Err(DecodeError::WrongType(name)),
    }
}

/// Binary-set attribute of gzip blobs, each decompressed to text.
///
/// Absent attributes read as an empty list, matching the stable-shape rule.
///
/// # Errors
///
/// Fails when any entry is not valid gzip or not UTF-8.
pub fn gzip_set(item: &Item, name: &'static str) -> Result<Vec<String>, DecodeError> {
    match item.get(name) {
        Some(AttributeValue::Bs(blobs)) => blobs
            .iter()
            .map(|blob| gunzip(name, blob.as_ref()))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

/// A `@`-delimited composite record.
///
/// Field positions are entity-specific; reading past the end of a short
/// record yields `""` so the decoder tolerates records written with fewer
/// fields than the current layout.
pub struct Composite<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Composite<'a> {
    #[must_use]
    pub fn split(text: &'a str) -> Self {
        Self {
            fields: text.split(FIELD_DELIMITER).collect(),
        }
    }

    /// Number of fields present in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `idx`, `""` when the record is shorter.
    #[must_use]
    pub fn field(&self, idx: usize) -> &'a str {
        self.fields.get(idx).copied().unwrap_or_default()
    }

    /// Field at `idx` parsed as an integer, `0` when absent or malformed.
    ///
    /// Sequence ids are assigned monotonically at write time, so sorting on
    /// this integer gives reverse-chronological order without a timestamp.
    #[must_use]
    pub fn int_field(&self, idx: usize) -> i64 {
        self.field(idx).trim().parse().unwrap_or(0)
    }
}

/// Render a `YYYY-MM-DD` date as `"<MonthName> <Day>, <Year>"`.
///
/// Store dates are date-only; they are parsed without any timezone
/// conversion so the rendered day never rolls over. Unparseable input
/// passes through verbatim rather than poisoning the whole response.
#[must_use]
pub fn format_long_date(value: &str) -> String {
    let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") else {
        return value.to_string();
    };
    use chrono::Datelike;
    let month = MONTHS[date.month0() as usize];
    format!("{} {}, {}", month, date.day(), date.year())
}
