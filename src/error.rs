//! Error types for decoding, querying and attribute parsing.
//!
//! Decode errors are fatal for the image being loaded.
//! Query and parse errors are local: a query outside the
//! grid or a malformed attribute never aborts anything
//! else.
use thiserror::Error;

use crate::decode::return_code_name;

fn code_name(code: &i32) -> &'static str {
    return_code_name(*code)
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not create decode handle: {} ({0})", code_name(.0))]
    Create(i32),

    #[error("could not query image resolution: {} ({0})", code_name(.0))]
    Resolution(i32),

    #[error("could not access measurement params: {} ({0})", code_name(.0))]
    MeasurementParams(i32),

    #[error("could not measure temperatures: {} ({0})", code_name(.0))]
    Measure(i32),

    #[error("could not release decode handle: {} ({0})", code_name(.0))]
    Destroy(i32),

    #[error("measurement param `{name}` out of range: {value} not in [{min}, {max}]")]
    InvalidParams {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("decoded grid size mismatch: expected {expected} values, found {found}")]
    GridShape { expected: usize, found: usize },

    #[error("input too large for the decode engine: {0} bytes")]
    Size(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query on an empty grid")]
    EmptyGrid,

    #[error("coordinate ({x}, {y}) outside {width}x{height} grid")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("attribute `{key}`: cannot parse {value:?} as {kind}")]
pub struct ParseError {
    pub key: &'static str,
    pub value: String,
    pub kind: &'static str,
}
