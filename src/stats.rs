// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::Serialize;

/// Descriptive statistics of a set of distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,

    /// Population standard deviation.
    pub std: f64,
}

impl DistanceStats {
    /// Computes statistics over all finite distances.
    /// Returns `None` if there are none.
    pub fn from_distances<I: IntoIterator<Item = f64>>(distances: I) -> Option<Self> {
        let mut values: Vec<f64> = distances.into_iter().filter(|d| d.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let median = if count % 2 == 1 {
            values[count / 2]
        } else {
            (values[count / 2 - 1] + values[count / 2]) * 0.5
        };

        Some(Self {
            count,
            min: values[0],
            max: values[count - 1],
            mean,
            median,
            std: variance.sqrt(),
        })
    }
}

/// Distribution of distances over equal-width bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` bin edges, from the minimum to the maximum distance.
    pub edges: Vec<f64>,

    /// Number of distances in every bin. Bins are half-open,
    /// except for the last one which also includes the maximum.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bins all finite distances. Returns `None` if there are none or if `bins` is zero.
    pub fn new<I: IntoIterator<Item = f64>>(distances: I, bins: usize) -> Option<Self> {
        let values: Vec<f64> = distances.into_iter().filter(|d| d.is_finite()).collect();
        if values.is_empty() || bins == 0 {
            return None;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Degenerate range - spread a single value over a unit-wide range
        let (min, max) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
        let width = (max - min) / bins as f64;

        let edges = (0..=bins).map(|i| min + width * i as f64).collect();
        let mut counts = vec![0; bins];
        for v in values {
            let bin = (((v - min) / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }

        Some(Self { edges, counts })
    }
}

/// Statistics of two distance sets side by side,
/// e.g. straight-line distances versus shortest path distances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceComparison {
    pub labels: [String; 2],
    pub stats: [Option<DistanceStats>; 2],

    /// Difference of the means (second minus first).
    pub mean_difference: Option<f64>,

    /// Ratio of the medians (second over first).
    pub median_ratio: Option<f64>,
}

impl DistanceComparison {
    pub fn new<A, B>(first_label: &str, first: A, second_label: &str, second: B) -> Self
    where
        A: IntoIterator<Item = f64>,
        B: IntoIterator<Item = f64>,
    {
        let a = DistanceStats::from_distances(first);
        let b = DistanceStats::from_distances(second);

        let (mean_difference, median_ratio) = match (a, b) {
            (Some(a), Some(b)) => (
                Some(b.mean - a.mean),
                if a.median != 0.0 {
                    Some(b.median / a.median)
                } else {
                    None
                },
            ),
            _ => (None, None),
        };

        Self {
            labels: [first_label.to_string(), second_label.to_string()],
            stats: [a, b],
            mean_difference,
            median_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-9),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn distance_stats() {
        let s = DistanceStats::from_distances(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_almost_eq!(s.mean, 5.0);
        assert_almost_eq!(s.median, 4.5);
        assert_almost_eq!(s.std, 2.0);

        let s = DistanceStats::from_distances(vec![3.0, f64::NAN, 1.0, 2.0, f64::INFINITY]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.median, 2.0);

        assert_eq!(DistanceStats::from_distances(vec![f64::NAN]), None);
        assert_eq!(DistanceStats::from_distances(Vec::new()), None);
    }

    #[test]
    fn histogram() {
        let h = Histogram::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 10.0], 5).unwrap();
        assert_eq!(h.edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(h.counts, vec![2, 2, 1, 0, 1]);

        let h = Histogram::new(vec![7.0, 7.0], 2).unwrap();
        assert_eq!(h.counts, vec![0, 2]);

        assert_eq!(Histogram::new(vec![1.0], 0), None);
        assert_eq!(Histogram::new(Vec::new(), 10), None);
    }

    #[test]
    fn comparison() {
        let c = DistanceComparison::new(
            "Straight Lines",
            vec![100.0, 200.0, 300.0],
            "Shortest Path",
            vec![150.0, 260.0, 400.0],
        );
        assert_eq!(c.labels[1], "Shortest Path");
        assert_almost_eq!(c.mean_difference.unwrap(), 70.0);
        assert_almost_eq!(c.median_ratio.unwrap(), 1.3);

        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["stats"][0]["count"], 3);

        let c = DistanceComparison::new("a", Vec::new(), "b", vec![1.0]);
        assert_eq!(c.mean_difference, None);
        assert!(c.stats[1].is_some());
    }
}
