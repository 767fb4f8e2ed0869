//! Running extrema and mean over sampled grid cells.
use std::ops::AddAssign;

use rust_decimal::Decimal;
use serde_derive::*;

/// Result of a region query.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionStats {
    pub min_value: Decimal,
    pub min_x: usize,
    pub min_y: usize,
    pub max_value: Decimal,
    pub max_x: usize,
    pub max_y: usize,
    /// Mean of the sampled cells, rounded to 2 decimal places.
    pub avg_value: Decimal,
}

/// One sampled cell. The coordinates are the ones reported
/// if the value ends up being an extremum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub x: usize,
    pub y: usize,
    pub value: Decimal,
}

#[derive(Debug, Clone, Copy)]
struct Extremum {
    value: Decimal,
    x: usize,
    y: usize,
}

impl From<Sample> for Extremum {
    fn from(s: Sample) -> Self {
        Extremum {
            value: s.value,
            x: s.x,
            y: s.y,
        }
    }
}

/// Accumulates samples in visiting order.
///
/// Comparisons are strict, so among equal extrema the first
/// sample added is the one reported.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    min: Option<Extremum>,
    max: Option<Extremum>,
    sum: Decimal,
    count: usize,
}

impl Stats {
    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` if nothing was sampled.
    pub fn finish(&self) -> Option<RegionStats> {
        let (min, max) = (self.min?, self.max?);
        let avg_value = (self.sum / Decimal::from(self.count)).round_dp(2);
        Some(RegionStats {
            min_value: min.value,
            min_x: min.x,
            min_y: min.y,
            max_value: max.value,
            max_x: max.x,
            max_y: max.y,
            avg_value,
        })
    }
}

impl AddAssign<Sample> for Stats {
    fn add_assign(&mut self, sample: Sample) {
        match self.min {
            Some(m) if sample.value >= m.value => {}
            _ => self.min = Some(sample.into()),
        }
        match self.max {
            Some(m) if sample.value <= m.value => {}
            _ => self.max = Some(sample.into()),
        }
        self.sum += sample.value;
        self.count += 1;
    }
}

impl Extend<Sample> for Stats {
    fn extend<I: IntoIterator<Item = Sample>>(&mut self, iter: I) {
        for sample in iter {
            *self += sample;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: usize, y: usize, tenths: i64) -> Sample {
        Sample {
            x,
            y,
            value: Decimal::new(tenths, 1),
        }
    }

    #[test]
    fn empty_stats() {
        assert_eq!(Stats::default().finish(), None);
    }

    #[test]
    fn first_extremum_wins() {
        let mut stats = Stats::default();
        stats.extend(vec![
            sample(0, 0, 10),
            sample(1, 0, 30),
            sample(2, 0, 10),
            sample(3, 0, 30),
        ]);
        let s = stats.finish().unwrap();
        assert_eq!((s.min_x, s.min_y), (0, 0));
        assert_eq!((s.max_x, s.max_y), (1, 0));
        assert_eq!(s.avg_value, Decimal::new(200, 2));
        assert_eq!(stats.count(), 4);
    }

    #[test]
    fn average_uses_bankers_rounding() {
        // 0.1 + 0.2 + 0.2 + 0.2 = 0.7, / 4 = 0.175 -> 0.18
        let mut stats = Stats::default();
        stats.extend(vec![
            sample(0, 0, 1),
            sample(1, 0, 2),
            sample(2, 0, 2),
            sample(3, 0, 2),
        ]);
        assert_eq!(stats.finish().unwrap().avg_value, Decimal::new(18, 2));

        // 0.1 + 0.1 + 0.1 + 0.2 = 0.5, / 4 = 0.125 -> 0.12
        let mut stats = Stats::default();
        stats.extend(vec![
            sample(0, 0, 1),
            sample(1, 0, 1),
            sample(2, 0, 1),
            sample(3, 0, 2),
        ]);
        assert_eq!(stats.finish().unwrap().avg_value, Decimal::new(12, 2));
    }
}
