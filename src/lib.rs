//! Library to read DJI thermal R-JPEGs.
//!
//! This crate provides three functionalities:
//!
//! 1. Locate the XMP [metadata island](locate) in the raw
//! bytes of an image and build a typed
//! [`TelemetryRecord`] of the flight, gimbal and camera
//! attributes written by the drone, plus a flat
//! [`MetadataBag`] of every attribute found.
//!
//! 2. Hold per-pixel temperatures (°C, one decimal) in a
//! [`TemperatureGrid`] and compute [region statistics](region)
//! over a point, a line segment, a rectangle or the whole
//! image.
//!
//! 3. Load a complete [`ThermalImage`] through a
//! [`Decoder`]. The `dji` feature provides
//! [`DirpDecoder`](dji::DirpDecoder) over the DJI Thermal
//! SDK.
//!
//! # Usage
//!
//! Telemetry needs no decoder:
//!
//! ```rust
//! use rjpeg::TelemetryRecord;
//!
//! let bytes = br#"<rdf:Description drone-dji:RelativeAltitude="+45.20"/>"#;
//! let (record, bag) = TelemetryRecord::scan(bytes);
//! assert_eq!(record.relative_altitude.map(|a| a.to_string()), Some("45.20".into()));
//! assert_eq!(bag.get("drone-dji:RelativeAltitude"), Some("45.20"));
//! ```
//!
//! Region queries report min, max (with coordinates) and the
//! average rounded to two decimals:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use rjpeg::TemperatureGrid;
//!
//! let grid = TemperatureGrid::from_raw(2, 2, &[215, 230, 198, 301])?;
//! let stats = grid.rect_query(0, 0, 1, 1)?;
//! assert_eq!(stats.max_value.to_string(), "30.1");
//! assert_eq!((stats.max_x, stats.max_y), (1, 1));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod parse;
pub mod locate;
pub mod telemetry;

pub mod grid;
pub mod stats;
pub mod region;

pub mod decode;
pub mod exif;
pub mod image;

#[cfg(feature = "dji")]
pub mod dji;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::decode::{Decoder, MeasurementParams};
pub use crate::error::{DecodeError, ParseError, QueryError};
pub use crate::grid::TemperatureGrid;
pub use crate::image::ThermalImage;
pub use crate::region::DiagonalSampling;
pub use crate::stats::RegionStats;
pub use crate::telemetry::{MetadataBag, TelemetryRecord};
