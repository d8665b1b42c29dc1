/// Histogram normalisation and fixed-width binning helpers.
use serde::Serialize;

/// Normalise counts into a density summing to one.
/// Returns `None` when every bin is zero.
pub fn normalise_counts(bins: &[u64]) -> Option<Vec<f64>> {
    let total: u64 = bins.iter().sum();
    if total == 0 {
        return None;
    }
    Some(bins.iter().map(|&b| b as f64 / total as f64).collect())
}

/// Equal-width histogram over the range of its input values.
///
/// Binning follows NumPy's `histogram`: bins are half open except the last,
/// which also holds the maximum; a constant input is centred in a range
/// widened by 0.5 on each side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrenceHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl OccurrenceHistogram {
    pub fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }

        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0u64; bins];
        for &v in values {
            let bin = (((v - lo) / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }

        Some(Self { edges, counts })
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}
