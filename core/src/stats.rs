//! Statistics

use crate::common::*;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::fmt;

/// Summary statistics over the finite values of a data set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Statistics {
    /// Number of finite values.
    pub count: usize,

    /// Minimum value.
    pub min: Float,

    /// Maximum value.
    pub max: Float,

    /// Arithmetic mean.
    pub mean: Float,

    /// Population standard deviation.
    pub std_dev: Float,

    /// Median.
    pub median: Float,
}

impl Statistics {
    /// Computes statistics over the finite values; non-finite values are
    /// ignored. Returns `None` if there are no finite values.
    ///
    /// * `values` - The values.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Float>,
    {
        let mut sorted: Vec<OrderedFloat<Float>> = values
            .into_iter()
            .filter(|v| v.is_finite())
            .map(OrderedFloat)
            .collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_unstable();

        let count = sorted.len();
        let n = count as Float;
        let mean = sorted.iter().map(|v| v.0).sum::<Float>() / n;
        let variance = sorted.iter().map(|v| (v.0 - mean) * (v.0 - mean)).sum::<Float>() / n;
        let median = if count % 2 == 1 {
            sorted[count / 2].0
        } else {
            0.5 * (sorted[count / 2 - 1].0 + sorted[count / 2].0)
        };

        Some(Self {
            count,
            min: sorted[0].0,
            max: sorted[count - 1].0,
            mean,
            std_dev: variance.sqrt(),
            median,
        })
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n = {}, min = {:.4}, max = {:.4}, mean = {:.4}, std = {:.4}, median = {:.4}",
            self.count, self.min, self.max, self.mean, self.std_dev, self.median
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn ignores_non_finite() {
        let s = Statistics::from_values([4.0, Float::NAN, 1.0, Float::INFINITY, 3.0, 2.0]).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert!(approx_eq!(Float, s.std_dev, 1.25_f64.sqrt(), epsilon = 1e-12));
    }

    #[test]
    fn odd_median() {
        let s = Statistics::from_values([5.0, 1.0, 3.0]).unwrap();
        assert_eq!(s.median, 3.0);
    }

    #[test]
    fn empty() {
        assert!(Statistics::from_values(Vec::new()).is_none());
        assert!(Statistics::from_values([Float::NAN]).is_none());
    }
}
