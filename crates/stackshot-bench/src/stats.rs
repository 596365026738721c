use crate::error::BenchError;
use facet::Facet;

/// Latency summary of one variant, in nanoseconds.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub samples: u64,
    pub min_ns: u64,
    pub median_ns: u64,
    pub mean_ns: u64,
    pub p99_ns: u64,
    pub max_ns: u64,
}

impl Summary {
    pub fn from_samples(samples: &[u64]) -> Result<Self, BenchError> {
        if samples.is_empty() {
            return Err(BenchError::EmptySamples);
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let total: u128 = sorted.iter().map(|&sample| u128::from(sample)).sum();
        let count = sorted.len() as u128;

        Ok(Self {
            samples: sorted.len() as u64,
            min_ns: sorted[0],
            median_ns: nearest_rank(&sorted, 50),
            mean_ns: u64::try_from(total / count).unwrap_or(u64::MAX),
            p99_ns: nearest_rank(&sorted, 99),
            max_ns: sorted[sorted.len() - 1],
        })
    }
}

// `sorted` must be non-empty.
fn nearest_rank(sorted: &[u64], percentile: usize) -> u64 {
    let rank = (percentile * sorted.len()).div_ceil(100).max(1);
    sorted[rank.min(sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_samples_are_an_error() {
        let err = Summary::from_samples(&[]).expect_err("empty input must fail");
        assert!(matches!(err, BenchError::EmptySamples));
    }

    #[test]
    fn single_sample_fills_every_field() {
        let summary = Summary::from_samples(&[420]).expect("one sample summarizes");
        assert_eq!(
            summary,
            Summary {
                samples: 1,
                min_ns: 420,
                median_ns: 420,
                mean_ns: 420,
                p99_ns: 420,
                max_ns: 420,
            }
        );
    }

    #[test]
    fn percentiles_use_nearest_rank() {
        let samples: Vec<u64> = (1..=100).rev().collect();
        let summary = Summary::from_samples(&samples).expect("samples summarize");
        assert_eq!(summary.min_ns, 1);
        assert_eq!(summary.median_ns, 50);
        assert_eq!(summary.mean_ns, 50);
        assert_eq!(summary.p99_ns, 99);
        assert_eq!(summary.max_ns, 100);
    }

    #[test]
    fn outliers_move_the_mean_but_not_the_median() {
        let summary = Summary::from_samples(&[10, 10, 10, 10, 1_000]).expect("samples summarize");
        assert_eq!(summary.median_ns, 10);
        assert_eq!(summary.mean_ns, 208);
        assert_eq!(summary.p99_ns, 1_000);
    }
}
