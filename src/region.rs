//! Point, line and rectangle queries over a
//! [`TemperatureGrid`].
//!
//! All queries return `Err(QueryError)` when the grid is
//! empty or a coordinate falls outside it; use `.ok()` for
//! the optional style. Cells are visited in a fixed order
//! and the first extremum visited is the one reported:
//!
//! - vertical lines: `y` ascending;
//! - horizontal lines: `x` ascending;
//! - diagonal lines and rectangles: row-major, i.e. `y`
//!   ascending, then `x` ascending within a row.
use std::cmp::{max, min};

use itertools::iproduct;
use rust_decimal::Decimal;

use crate::{
    error::QueryError,
    grid::TemperatureGrid,
    stats::{RegionStats, Sample, Stats},
};

/// How a diagonal line query picks the cells it samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagonalSampling {
    /// Sample every cell lying exactly on the segment.
    Collinear,
    /// Legacy sampling: cells are selected on the main
    /// diagonal of the segment's bounding box, but values are
    /// read (and reported) on the row of the endpoint with
    /// the smaller `x`. Kept for callers that need results
    /// matching older tooling.
    StartRow,
}

impl Default for DiagonalSampling {
    fn default() -> Self {
        DiagonalSampling::Collinear
    }
}

impl TemperatureGrid {
    fn check(&self, x: usize, y: usize) -> Result<(), QueryError> {
        let (width, height) = self.dim();
        if self.is_empty() {
            return Err(QueryError::EmptyGrid);
        }
        if x >= width || y >= height {
            return Err(QueryError::OutOfRange {
                x,
                y,
                width,
                height,
            });
        }
        Ok(())
    }

    fn sample(&self, x: usize, y: usize) -> Sample {
        Sample {
            x,
            y,
            value: self.values()[(y, x)],
        }
    }

    /// Temperature at `(x, y)`.
    pub fn point_query(&self, x: usize, y: usize) -> Result<Decimal, QueryError> {
        self.check(x, y)?;
        Ok(self.values()[(y, x)])
    }

    /// Statistics along the segment `(x1, y1)`-`(x2, y2)`,
    /// both endpoints included.
    pub fn line_query(
        &self,
        x1: usize,
        y1: usize,
        x2: usize,
        y2: usize,
    ) -> Result<RegionStats, QueryError> {
        self.line_query_with(x1, y1, x2, y2, DiagonalSampling::default())
    }

    pub fn line_query_with(
        &self,
        x1: usize,
        y1: usize,
        x2: usize,
        y2: usize,
        sampling: DiagonalSampling,
    ) -> Result<RegionStats, QueryError> {
        self.check(x1, y1)?;
        self.check(x2, y2)?;

        let (min_x, max_x) = (min(x1, x2), max(x1, x2));
        let (min_y, max_y) = (min(y1, y2), max(y1, y2));

        let mut stats = Stats::default();
        if x1 == x2 {
            // also covers the single-cell case
            stats.extend((min_y..=max_y).map(|y| self.sample(x1, y)));
        } else if y1 == y2 {
            stats.extend((min_x..=max_x).map(|x| self.sample(x, y1)));
        } else {
            let cells = iproduct!(min_y..=max_y, min_x..=max_x).map(|(y, x)| (x, y));
            match sampling {
                DiagonalSampling::Collinear => {
                    let on_segment = |&(x, y): &(usize, usize)| {
                        let (x, y) = (x as i64, y as i64);
                        let (ax, ay) = (x1 as i64, y1 as i64);
                        let (bx, by) = (x2 as i64, y2 as i64);
                        (x - ax) * (by - ay) == (y - ay) * (bx - ax)
                    };
                    stats.extend(cells.filter(on_segment).map(|(x, y)| self.sample(x, y)));
                }
                DiagonalSampling::StartRow => {
                    let start_y = if x1 < x2 { y1 } else { y2 };
                    let on_diagonal = |&(x, y): &(usize, usize)| {
                        (x - min_x) * (max_y - y) == (max_x - x) * (y - min_y)
                    };
                    stats.extend(
                        cells
                            .filter(on_diagonal)
                            .map(|(x, _)| self.sample(x, start_y)),
                    );
                }
            }
        }

        // both endpoints are on the segment, so at least one
        // cell was sampled
        stats.finish().ok_or(QueryError::EmptyGrid)
    }

    /// Statistics over the rectangle spanning `(x, y)` to
    /// `(x + width, y + height)`, both corners included.
    ///
    /// A rectangle with zero width or height degenerates into
    /// a line (or point) query.
    pub fn rect_query(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<RegionStats, QueryError> {
        let x_end = x.saturating_add(width);
        let y_end = y.saturating_add(height);
        self.check(x, y)?;
        self.check(x_end, y_end)?;

        if width == 0 || height == 0 {
            return self.line_query(x, y, x_end, y_end);
        }

        let mut stats = Stats::default();
        stats.extend(iproduct!(y..=y_end, x..=x_end).map(|(cy, cx)| self.sample(cx, cy)));
        stats.finish().ok_or(QueryError::EmptyGrid)
    }

    /// Statistics over every cell of the grid.
    pub fn whole_image_query(&self) -> Result<RegionStats, QueryError> {
        if self.is_empty() {
            return Err(QueryError::EmptyGrid);
        }
        self.rect_query(0, 0, self.width() - 1, self.height() - 1)
    }
}
