//! Interface to the engine that turns R-JPEG bytes into raw
//! temperature values.
//!
//! The engine itself is opaque: the vendor SDK binding in
//! [`dji`][crate::dji] (feature `dji`) is one implementation,
//! tests use stubs, and nothing here assumes the engine runs
//! in-process.
use rust_decimal::Decimal;
use serde_derive::*;

use crate::{error::DecodeError, grid::TemperatureGrid};

/// Capability to decode the raw thermal payload of an image.
pub trait Decoder {
    /// Decode `bytes`, optionally overriding the measurement
    /// parameters stored in the image. The returned frame
    /// carries the parameters that were actually used.
    fn decode(
        &self,
        bytes: &[u8],
        params: Option<&MeasurementParams>,
    ) -> Result<RawFrame, DecodeError>;
}

impl<D: Decoder + ?Sized> Decoder for &D {
    fn decode(
        &self,
        bytes: &[u8],
        params: Option<&MeasurementParams>,
    ) -> Result<RawFrame, DecodeError> {
        (**self).decode(bytes, params)
    }
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn decode(
        &self,
        bytes: &[u8],
        params: Option<&MeasurementParams>,
    ) -> Result<RawFrame, DecodeError> {
        (**self).decode(bytes, params)
    }
}

/// Output of a [`Decoder`]: row-major raw values in tenths
/// of a degree Celsius.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: usize,
    pub height: usize,
    pub raw: Vec<i16>,
    pub params: MeasurementParams,
}

impl RawFrame {
    pub fn into_grid(self) -> Result<TemperatureGrid, DecodeError> {
        TemperatureGrid::from_raw(self.width, self.height, &self.raw)
    }
}

/// Physical inputs the engine needs to convert sensor
/// counts into temperatures.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct MeasurementParams {
    /// Distance to the subject in meters, 1 to 25.
    pub distance: f32,
    /// Relative humidity in percent, 20 to 100.
    pub humidity: f32,
    /// Emissivity of the subject, 0.10 to 1.00.
    pub emissivity: f32,
    /// Reflected apparent temperature in Celsius, -40 to 500.
    pub reflection: f32,
}

impl Default for MeasurementParams {
    fn default() -> Self {
        MeasurementParams {
            distance: 5.0,
            humidity: 70.0,
            emissivity: 1.0,
            reflection: 23.0,
        }
    }
}

pub const DISTANCE_RANGE: (f32, f32) = (1.0, 25.0);
pub const HUMIDITY_RANGE: (f32, f32) = (20.0, 100.0);
pub const EMISSIVITY_RANGE: (f32, f32) = (0.10, 1.00);
pub const REFLECTION_RANGE: (f32, f32) = (-40.0, 500.0);

impl MeasurementParams {
    pub fn validate(&self) -> Result<(), DecodeError> {
        check_range("distance", self.distance, DISTANCE_RANGE)?;
        check_range("humidity", self.humidity, HUMIDITY_RANGE)?;
        check_range("emissivity", self.emissivity, EMISSIVITY_RANGE)?;
        check_range("reflection", self.reflection, REFLECTION_RANGE)?;
        Ok(())
    }

    pub fn distance_decimal(&self) -> Decimal {
        rounded(self.distance, 2)
    }

    pub fn humidity_percent(&self) -> i32 {
        self.humidity.round() as i32
    }

    pub fn emissivity_decimal(&self) -> Decimal {
        rounded(self.emissivity, 2)
    }

    pub fn reflection_decimal(&self) -> Decimal {
        rounded(self.reflection, 1)
    }
}

fn check_range(name: &'static str, value: f32, (min, max): (f32, f32)) -> Result<(), DecodeError> {
    // NaN fails both comparisons
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(DecodeError::InvalidParams {
            name,
            value,
            min,
            max,
        })
    }
}

fn rounded(value: f32, dp: u32) -> Decimal {
    Decimal::from_f32_retain(value)
        .unwrap_or_default()
        .round_dp(dp)
}

/// Symbolic name of a return code of the vendor SDK.
pub fn return_code_name(code: i32) -> &'static str {
    match code {
        0 => "DIRP_SUCCESS",
        -1 => "DIRP_ERROR_MALLOC",
        -2 => "DIRP_ERROR_POINTER_NULL",
        -3 => "DIRP_ERROR_INVALID_PARAMS",
        -4 => "DIRP_ERROR_INVALID_RAW",
        -5 => "DIRP_ERROR_INVALID_HEADER",
        -6 => "DIRP_ERROR_INVALID_CURVE",
        -7 => "DIRP_ERROR_RJPEG_PARSE",
        -8 => "DIRP_ERROR_SIZE",
        -9 => "DIRP_ERROR_INVALID_HANDLE",
        -10 => "DIRP_ERROR_FORMAT_INPUT",
        -11 => "DIRP_ERROR_FORMAT_OUTPUT",
        -12 => "DIRP_ERROR_UNSUPPORTED_FUNC",
        -13 => "DIRP_ERROR_NOT_READY",
        -14 => "DIRP_ERROR_ACTIVATION",
        -32 => "DIRP_ERROR_ADVANCED",
        _ => "DIRP_ERROR_UNKNOWN",
    }
}
