//! Standard EXIF tags of an R-JPEG.
//!
//! The EXIF segment is taken from the JPEG with `img-parts`
//! and decoded with `kamadak-exif`. Anything unreadable is
//! simply absent.
use ::exif::{Exif, In, Reader, Tag, Value};
use chrono::NaiveDateTime;
use img_parts::{jpeg::Jpeg, Bytes, ImageEXIF};
use rust_decimal::Decimal;
use serde_derive::*;
use tracing::debug;

use crate::parse::parse_naive_datetime;

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ExifInfo {
    pub make: Option<String>,
    pub model: Option<String>,
    pub capture_time: Option<NaiveDateTime>,
    /// Millimeters.
    pub focal_length: Option<Decimal>,
    pub focal_length_35mm: Option<u32>,
    /// Decimal degrees, negative south of the equator.
    pub gps_latitude: Option<Decimal>,
    /// Decimal degrees, negative west of Greenwich.
    pub gps_longitude: Option<Decimal>,
    /// Meters, negative below sea level.
    pub gps_altitude: Option<Decimal>,
    pub exif_version: Option<String>,
}

/// Read the EXIF tags of a JPEG. Returns `None` if the bytes
/// are not a JPEG or carry no readable EXIF segment.
pub fn read_exif(bytes: &[u8]) -> Option<ExifInfo> {
    let jpeg = match Jpeg::from_bytes(Bytes::copy_from_slice(bytes)) {
        Ok(jpeg) => jpeg,
        Err(e) => {
            debug!(error = %e, "not a jpeg, skipping exif");
            return None;
        }
    };
    let segment = jpeg.exif()?;
    let tiff = segment
        .strip_prefix(&b"Exif\0\0"[..])
        .unwrap_or(&segment[..]);
    ExifInfo::from_tiff(tiff)
}

impl ExifInfo {
    /// Parse a raw TIFF-structured EXIF block.
    pub fn from_tiff(tiff: &[u8]) -> Option<Self> {
        match Reader::new().read_raw(tiff.to_vec()) {
            Ok(exif) => Some(Self::from_exif(&exif)),
            Err(e) => {
                debug!(error = %e, "unreadable exif segment");
                None
            }
        }
    }

    fn from_exif(exif: &Exif) -> Self {
        let value = |tag| exif.get_field(tag, In::PRIMARY).map(|f| &f.value);
        let text = |tag| value(tag).and_then(ascii);
        let signed = |tag, ref_tag, negative: &[&str]| {
            let magnitude = value(tag).and_then(degrees)?;
            Some(match text(ref_tag) {
                Some(r) if negative.contains(&r.as_str()) => -magnitude,
                _ => magnitude,
            })
        };

        let capture_time = text(Tag::DateTimeOriginal)
            .or_else(|| text(Tag::DateTime))
            .and_then(|s| parse_naive_datetime(&s));

        let gps_altitude = value(Tag::GPSAltitude)
            .and_then(|v| rational(v, 0))
            .map(|alt| match value(Tag::GPSAltitudeRef).and_then(byte) {
                Some(1) => -alt,
                _ => alt,
            });

        let exif_version = value(Tag::ExifVersion).and_then(|v| match v {
            Value::Undefined(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        });

        ExifInfo {
            make: text(Tag::Make),
            model: text(Tag::Model),
            capture_time,
            focal_length: value(Tag::FocalLength).and_then(|v| rational(v, 0)),
            focal_length_35mm: value(Tag::FocalLengthIn35mmFilm).and_then(|v| v.get_uint(0)),
            gps_latitude: signed(Tag::GPSLatitude, Tag::GPSLatitudeRef, &["S"]),
            gps_longitude: signed(Tag::GPSLongitude, Tag::GPSLongitudeRef, &["W"]),
            gps_altitude,
            exif_version,
        }
    }
}

fn ascii(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => {
            let s = String::from_utf8_lossy(parts.first()?);
            let s = s.trim_end_matches('\0').trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        _ => None,
    }
}

fn byte(value: &Value) -> Option<u8> {
    match value {
        Value::Byte(v) => v.first().copied(),
        _ => value.get_uint(0).map(|v| v as u8),
    }
}

fn rational(value: &Value, index: usize) -> Option<Decimal> {
    match value {
        Value::Rational(v) => {
            let r = v.get(index)?;
            Decimal::from(r.num).checked_div(Decimal::from(r.denom))
        }
        _ => None,
    }
}

// degrees, minutes, seconds
fn degrees(value: &Value) -> Option<Decimal> {
    let d = rational(value, 0)?;
    let m = rational(value, 1).unwrap_or_default();
    let s = rational(value, 2).unwrap_or_default();
    Some((d + m / Decimal::from(60) + s / Decimal::from(3600)).round_dp(8))
}
