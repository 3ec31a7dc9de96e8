use serde::Serialize;
use tracing::warn;

use crate::models::{AggregatedBucket, ClassifiedBucket};

/// Mean, sample standard deviation and the alert/action lines derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdModel {
    pub mean: f64,
    pub sd: f64,
    pub alert_line: f64,
    pub action_line: f64,
    /// Set when the series had a single bucket and `sd` fell back to zero.
    pub degenerate: bool,
}

impl ThresholdModel {
    /// `None` for an empty series. A single bucket gets `sd = 0`.
    pub fn from_counts(counts: &[u64]) -> Option<Self> {
        if counts.is_empty() {
            return None;
        }

        let n = counts.len() as f64;
        let mean = counts.iter().map(|&c| c as f64).sum::<f64>() / n;
        let degenerate = counts.len() == 1;
        let sd = if degenerate {
            warn!("single bucket in series; standard deviation set to 0");
            0.0
        } else {
            let squares: f64 = counts
                .iter()
                .map(|&c| {
                    let diff = c as f64 - mean;
                    diff * diff
                })
                .sum();
            (squares / (n - 1.0)).sqrt()
        };

        Some(Self {
            mean,
            sd,
            alert_line: mean + sd,
            action_line: mean + 2.0 * sd,
            degenerate,
        })
    }

    pub fn from_buckets(buckets: &[AggregatedBucket]) -> Option<Self> {
        let counts: Vec<u64> = buckets.iter().map(|bucket| bucket.count).collect();
        Self::from_counts(&counts)
    }
}

/// Marks buckets strictly above the action line.
pub fn classify(buckets: &[AggregatedBucket], action_line: f64) -> Vec<ClassifiedBucket> {
    buckets
        .iter()
        .map(|bucket| ClassifiedBucket {
            label: bucket.label.clone(),
            count: bucket.count,
            exceeds_action: bucket.count as f64 > action_line,
        })
        .collect()
}

/// Labels of flagged buckets in series order.
pub fn exceeding_labels(series: &[ClassifiedBucket]) -> Vec<String> {
    series
        .iter()
        .filter(|bucket| bucket.exceeds_action)
        .map(|bucket| bucket.label.clone())
        .collect()
}
