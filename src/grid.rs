use ndarray::{Array2, ArrayView2};
use rust_decimal::Decimal;

use crate::error::DecodeError;

/// Decoded temperatures in degrees Celsius.
///
/// Values are exact decimals (one decimal place when built
/// from raw engine output) stored as a `(height, width)`
/// array, so `cell(x, y)` is `values[(y, x)]`. The grid is
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureGrid {
    values: Array2<Decimal>,
}

impl TemperatureGrid {
    /// Build a grid from row-major raw values in tenths of
    /// a degree.
    pub fn from_raw(width: usize, height: usize, raw: &[i16]) -> Result<Self, DecodeError> {
        let expected = width * height;
        if raw.len() != expected {
            return Err(DecodeError::GridShape {
                expected,
                found: raw.len(),
            });
        }

        let values: Vec<Decimal> = raw.iter().map(|&r| Decimal::new(r as i64, 1)).collect();
        let values = Array2::from_shape_vec((height, width), values).map_err(|_| {
            DecodeError::GridShape {
                expected,
                found: raw.len(),
            }
        })?;
        Ok(TemperatureGrid { values })
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    /// `(width, height)`.
    pub fn dim(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cell at column `x`, row `y`; `None` outside the grid.
    /// See [`point_query`][Self::point_query] for the
    /// error-reporting variant.
    pub fn cell(&self, x: usize, y: usize) -> Option<Decimal> {
        self.values.get((y, x)).copied()
    }

    pub fn values(&self) -> ArrayView2<'_, Decimal> {
        self.values.view()
    }
}

impl From<Array2<Decimal>> for TemperatureGrid {
    /// Wrap an existing `(height, width)` array.
    fn from(values: Array2<Decimal>) -> Self {
        TemperatureGrid { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_are_scaled_exactly() -> anyhow::Result<()> {
        let grid = TemperatureGrid::from_raw(3, 2, &[215, -12, 0, 1, 2, 3])?;
        assert_eq!(grid.dim(), (3, 2));
        assert_eq!(grid.cell(0, 0), Some(Decimal::new(215, 1)));
        assert_eq!(grid.cell(1, 0), Some(Decimal::new(-12, 1)));
        assert_eq!(grid.cell(2, 1), Some(Decimal::new(3, 1)));
        assert_eq!(grid.cell(3, 0), None);
        assert_eq!(grid.cell(0, 2), None);
        Ok(())
    }

    #[test]
    fn empty_grid() -> anyhow::Result<()> {
        let grid = TemperatureGrid::from_raw(0, 0, &[])?;
        assert!(grid.is_empty());
        assert_eq!(grid.cell(0, 0), None);
        Ok(())
    }
}
