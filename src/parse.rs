//! Extract `prefix:name="value"` attributes from a metadata
//! island and parse their values.
//!
//! Each key is looked up on its own, so a malformed or
//! unterminated value never hides a neighbouring attribute.
//! Callers pick the first occurrence whose value parses as
//! the expected kind.
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde_derive::*;

use crate::error::ParseError;

/// A `key="value"` pair found in a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Byte offset of the key in the span.
    pub offset: usize,
    pub key: &'a str,
    pub value: &'a str,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

/// Every `key="value"` of exactly `key` in `span`, in order
/// of appearance. `key` must not be the tail of a longer
/// name, and a value without closing quote is skipped.
pub fn occurrences<'a>(span: &'a str, key: &'a str) -> impl Iterator<Item = Attribute<'a>> {
    span.match_indices(key).filter_map(move |(offset, key)| {
        if span[..offset].chars().next_back().map_or(false, is_name_char) {
            return None;
        }
        let rest = span[offset + key.len()..].strip_prefix("=\"")?;
        let end = rest.find('"')?;
        Some(Attribute {
            offset,
            key,
            value: &rest[..end],
        })
    })
}

/// First occurrence of the first spelling in `keys` that is
/// present at all. Spellings are in order of precedence.
pub fn find_attribute<'a>(span: &'a str, keys: &[&'a str]) -> Option<Attribute<'a>> {
    keys.iter().find_map(|&key| occurrences(span, key).next())
}

/// Raw value of the first `name="..."` in `span`.
pub fn extract<'a>(span: &'a str, name: &'a str) -> Option<&'a str> {
    occurrences(span, name).next().map(|attr| attr.value)
}

/// Kind of value an attribute holds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Decimal,
    Integer,
    Timestamp,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Decimal => "decimal",
            ValueKind::Integer => "integer",
            ValueKind::Timestamp => "timestamp",
        }
    }
}

/// Typed parsing of one [`ValueKind`].
pub trait AttributeKind {
    type Value;
    const KIND: ValueKind;

    /// Text actually handed to [`parse_normalized`][Self::parse_normalized].
    fn normalize(raw: &str) -> &str {
        raw
    }

    fn parse_normalized(text: &str) -> Option<Self::Value>;

    fn parse(key: &'static str, raw: &str) -> Result<Self::Value, ParseError> {
        Self::parse_normalized(Self::normalize(raw)).ok_or_else(|| ParseError {
            key,
            value: raw.to_string(),
            kind: Self::KIND.name(),
        })
    }
}

pub struct Text;
pub struct Signed;
pub struct Integer;
pub struct Timestamp;

// Positive numbers carry an explicit `+`.
fn strip_plus(raw: &str) -> &str {
    raw.strip_prefix('+').unwrap_or(raw)
}

impl AttributeKind for Text {
    type Value = String;
    const KIND: ValueKind = ValueKind::Text;

    fn parse_normalized(text: &str) -> Option<String> {
        Some(text.to_string())
    }
}

impl AttributeKind for Signed {
    type Value = Decimal;
    const KIND: ValueKind = ValueKind::Decimal;

    fn normalize(raw: &str) -> &str {
        strip_plus(raw.trim())
    }

    fn parse_normalized(text: &str) -> Option<Decimal> {
        lazy_static! {
            static ref RE: Regex = Regex::new(r"^-?\d+(\.\d+)?$").unwrap();
        }
        if !RE.is_match(text) {
            return None;
        }
        Decimal::from_str(text).ok()
    }
}

impl AttributeKind for Integer {
    type Value = u32;
    const KIND: ValueKind = ValueKind::Integer;

    fn normalize(raw: &str) -> &str {
        strip_plus(raw.trim())
    }

    fn parse_normalized(text: &str) -> Option<u32> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok()
    }
}

impl AttributeKind for Timestamp {
    type Value = NaiveDateTime;
    const KIND: ValueKind = ValueKind::Timestamp;

    fn normalize(raw: &str) -> &str {
        raw.trim()
    }

    fn parse_normalized(text: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_local());
        }
        parse_naive_datetime(text)
    }
}

/// Parse the timestamp layouts cameras write without a zone.
pub(crate) fn parse_naive_datetime(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y:%m:%d %H:%M:%S",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SPAN: &str = r#"<rdf:Description rdf:about="DJI Meta Data"
    xmlns:drone-dji="http://www.dji.com/drone-dji/1.0/"
    drone-dji:GpsLatitude="+31.230416"
    drone-dji:GpsLongitude="-121.473701"
    drone-dji:RtkFlag="50"
    drone-dji:GpsLatitude="+1.0"
    drone-dji:MyGpsStatus="Other""#;

    #[test]
    fn extracts_first_occurrence() {
        assert_eq!(extract(SPAN, "drone-dji:GpsLatitude"), Some("+31.230416"));
        assert_eq!(extract(SPAN, "drone-dji:RtkFlag"), Some("50"));
        assert_eq!(extract(SPAN, "drone-dji:Missing"), None);
    }

    #[test]
    fn keys_are_matched_whole() {
        assert_eq!(extract(SPAN, "drone-dji:MyGpsStatus"), Some("Other"));
        assert_eq!(extract(SPAN, "dji:MyGpsStatus"), None);
        assert_eq!(extract(SPAN, "drone-dji:Gps"), None);
        assert_eq!(extract("xdrone-dji:RtkFlag=\"1\"", "drone-dji:RtkFlag"), None);
    }

    #[test]
    fn all_occurrences_in_order() {
        let found: Vec<_> = occurrences(SPAN, "drone-dji:GpsLatitude").collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, "+31.230416");
        assert_eq!(found[1].value, "+1.0");
        assert!(found[0].offset < found[1].offset);
        assert_eq!(
            &SPAN[found[1].offset..found[1].offset + found[1].key.len()],
            "drone-dji:GpsLatitude"
        );
    }

    #[test]
    fn unterminated_value_does_not_hide_neighbours() {
        let span = r#"drone-dji:SelfData="ab drone-dji:RtkFlag="50" drone-dji:Version="1.0""#;
        assert_eq!(extract(span, "drone-dji:RtkFlag"), Some("50"));
        assert_eq!(extract(span, "drone-dji:Version"), Some("1.0"));
        assert_eq!(extract(r#"drone-dji:RtkFlag="50"#, "drone-dji:RtkFlag"), None);
    }

    #[test]
    fn spellings_by_precedence() {
        let keys = ["drone-dji:GpsLongtitude", "drone-dji:GpsLongitude"];
        let span = r#"drone-dji:GpsLongitude="+121.5" drone-dji:GpsLongtitude="+120.5""#;
        let attr = find_attribute(span, &keys);
        assert_eq!(attr.map(|a| a.value), Some("+120.5"));

        let span = r#"drone-dji:GpsLongitude="+121.5""#;
        let attr = find_attribute(span, &keys);
        assert_eq!(attr.map(|a| a.key), Some("drone-dji:GpsLongitude"));
    }

    #[test]
    fn signed_values() {
        assert_eq!(
            Signed::parse("k", "+31.230416"),
            Ok(Decimal::from_str("31.230416").unwrap())
        );
        assert_eq!(Signed::parse("k", "-0.10"), Ok(Decimal::new(-10, 2)));
        assert_eq!(Signed::parse("k", "12"), Ok(Decimal::new(12, 0)));
        assert_eq!(Signed::normalize("+31.2"), "31.2");

        let err = Signed::parse("k", "north").unwrap_err();
        assert_eq!(err.kind, "decimal");
        assert_eq!(err.value, "north");
        assert!(Signed::parse("k", "").is_err());
        assert!(Signed::parse("k", "1.2.3").is_err());
    }

    #[test]
    fn integer_values() {
        assert_eq!(Integer::parse("k", "50"), Ok(50));
        assert_eq!(Integer::parse("k", "+1"), Ok(1));
        assert!(Integer::parse("k", "-1").is_err());
        assert!(Integer::parse("k", "1.5").is_err());
    }

    #[test]
    fn timestamp_values() {
        let expected = NaiveDate::from_ymd_opt(2022, 3, 14)
            .and_then(|d| d.and_hms_opt(9, 26, 53))
            .unwrap();
        assert_eq!(Timestamp::parse("k", "2022-03-14T09:26:53"), Ok(expected));
        assert_eq!(Timestamp::parse("k", "2022-03-14T09:26:53+08:00"), Ok(expected));
        assert_eq!(Timestamp::parse("k", "2022:03:14 09:26:53"), Ok(expected));
        assert!(Timestamp::parse("k", "yesterday").is_err());
    }
}
