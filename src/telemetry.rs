//! Flight and camera telemetry from the XMP island of a DJI
//! R-JPEG.
//!
//! The fields are declared once in a catalog that generates
//! the [`TelemetryRecord`] struct, its
//! [`CATALOG`][TelemetryRecord::CATALOG] table, and the code
//! that fills both the record and the [`MetadataBag`] in a
//! single scan.
use std::iter::FromIterator;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_derive::Serialize;
use tracing::debug;

use crate::{
    locate::island,
    parse::{occurrences, Attribute, AttributeKind, Integer, Signed, Text, Timestamp, ValueKind},
};

/// One catalog row: record field, attribute key(s) and the
/// kind of value expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub field: &'static str,
    /// Spellings in order of precedence.
    pub keys: &'static [&'static str],
    pub kind: ValueKind,
}

/// First occurrence whose value parses as `K`, trying the
/// spellings in `keys` in order. Malformed occurrences are
/// skipped.
fn first_parsed<'a, K: AttributeKind>(
    island: &'a str,
    keys: &[&'static str],
) -> Option<(Attribute<'a>, K::Value)> {
    keys.iter().find_map(|&key| {
        occurrences(island, key).find_map(|attr| match K::parse(key, attr.value) {
            Ok(value) => Some((attr, value)),
            Err(e) => {
                debug!(error = %e, "skipping malformed telemetry attribute");
                None
            }
        })
    })
}

/// Declare the telemetry record from a table of
/// `field => "key" | "alias" as Kind` rows.
macro_rules! declare_telemetry_record {
    (
        $(#[$smeta:meta])*
        $svis:vis struct $sname:ident {
            $(
                $(#[$fmeta:meta])*
                $name:ident => $key:literal $(| $alias:literal)* as $kind:ty
            ),* $(,)?
        }
    ) => {
        $(#[$smeta])*
        #[derive(Serialize, Debug, Clone, Default, PartialEq)]
        $svis struct $sname {
            $(
                $(#[$fmeta])*
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $name: Option<<$kind as AttributeKind>::Value>,
            )*
        }

        impl $sname {
            pub const CATALOG: &'static [CatalogEntry] = &[
                $(
                    CatalogEntry {
                        field: stringify!($name),
                        keys: &[$key $(, $alias)*],
                        kind: <$kind as AttributeKind>::KIND,
                    },
                )*
            ];

            /// Build the record and the bag from island text.
            pub fn from_island(island: &str) -> (Self, MetadataBag) {
                let mut record = Self::default();
                let mut found = vec![];
                $(
                    if let Some((attr, value)) =
                        first_parsed::<$kind>(island, &[$key $(, $alias)*])
                    {
                        record.$name = Some(value);
                        found.push((
                            attr.offset,
                            attr.key,
                            <$kind as AttributeKind>::normalize(attr.value),
                        ));
                    }
                )*

                found.sort_by_key(|&(offset, _, _)| offset);
                let bag = found.into_iter().map(|(_, key, value)| (key, value)).collect();
                (record, bag)
            }

            /// `true` if no field was found.
            pub fn is_empty(&self) -> bool {
                true $(&& self.$name.is_none())*
            }
        }
    };
}

declare_telemetry_record! {
    /// Telemetry recorded by the aircraft at capture time.
    ///
    /// Every field is optional: absence means the attribute
    /// was missing from the island or could not be parsed.
    pub struct TelemetryRecord {
        version => "drone-dji:Version" as Text,
        gps_status => "drone-dji:GpsStatus" as Text,
        /// Degrees, WGS-84.
        gps_latitude => "drone-dji:GpsLatitude" as Signed,
        /// Degrees, WGS-84. Some firmware misspells the key;
        /// the misspelling takes precedence when both exist.
        gps_longitude => "drone-dji:GpsLongtitude" | "drone-dji:GpsLongitude" as Signed,
        /// Meters above sea level.
        absolute_altitude => "drone-dji:AbsoluteAltitude" as Signed,
        /// Meters above the take-off point.
        relative_altitude => "drone-dji:RelativeAltitude" as Signed,
        gimbal_roll_degree => "drone-dji:GimbalRollDegree" as Signed,
        gimbal_yaw_degree => "drone-dji:GimbalYawDegree" as Signed,
        gimbal_pitch_degree => "drone-dji:GimbalPitchDegree" as Signed,
        flight_roll_degree => "drone-dji:FlightRollDegree" as Signed,
        flight_yaw_degree => "drone-dji:FlightYawDegree" as Signed,
        flight_pitch_degree => "drone-dji:FlightPitchDegree" as Signed,
        /// Meters per second.
        flight_x_speed => "drone-dji:FlightXSpeed" as Signed,
        flight_y_speed => "drone-dji:FlightYSpeed" as Signed,
        flight_z_speed => "drone-dji:FlightZSpeed" as Signed,
        cam_reverse => "drone-dji:CamReverse" as Integer,
        gimbal_reverse => "drone-dji:GimbalReverse" as Integer,
        /// Opaque vendor data.
        self_data => "drone-dji:SelfData" as Text,
        rtk_flag => "drone-dji:RtkFlag" as Integer,
        capture_time => "xmp:CreateDate" as Timestamp,
        format => "dc:format" as Text,
        camera_model => "tiff:Model" as Text,
        camera_maker => "tiff:Make" as Text,
    }
}

impl TelemetryRecord {
    /// Scan raw image bytes. Without an island both outputs
    /// are empty.
    pub fn scan(bytes: &[u8]) -> (Self, MetadataBag) {
        match island(bytes) {
            Some(text) => Self::from_island(&text),
            None => {
                debug!("no metadata island found");
                Default::default()
            }
        }
    }
}

/// Attribute key to value, in order of appearance in the
/// island.
///
/// Values are the text handed to the value parser: numbers
/// lose their leading `+`, text is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBag {
    entries: Vec<(String, String)>,
}

impl MetadataBag {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(String, String)> = vec![];
        for (k, v) in iter {
            let k = k.into();
            if entries.iter().all(|(existing, _)| *existing != k) {
                entries.push((k, v.into()));
            }
        }
        MetadataBag { entries }
    }
}

impl Serialize for MetadataBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
