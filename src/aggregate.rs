use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::WeeklySort;
use crate::models::{AggregatedBucket, BucketKey};

/// Counts keys per bucket and orders the buckets chronologically.
///
/// Buckets are grouped by their serialized key, so `2023-W5` and `2023-W05`
/// stay apart. Only buckets that received a row are emitted.
pub fn aggregate<I>(keys: I, sort: WeeklySort) -> Vec<AggregatedBucket>
where
    I: IntoIterator<Item = BucketKey>,
{
    let mut buckets: HashMap<String, AggregatedBucket> = HashMap::new();

    for key in keys {
        let entry = buckets
            .entry(key.to_string())
            .or_insert_with(|| AggregatedBucket {
                label: key.label(),
                key,
                count: 0,
            });
        entry.count += 1;
    }

    let mut values: Vec<(String, AggregatedBucket)> = buckets.into_iter().collect();
    values.sort_by(|(id_a, a), (id_b, b)| {
        compare_keys(&a.key, &b.key, sort).then_with(|| id_a.cmp(id_b))
    });
    values.into_iter().map(|(_, bucket)| bucket).collect()
}

pub fn total_cases(buckets: &[AggregatedBucket]) -> u64 {
    buckets.iter().map(|bucket| bucket.count).sum()
}

fn compare_keys(a: &BucketKey, b: &BucketKey, sort: WeeklySort) -> Ordering {
    match (a, b) {
        (BucketKey::Date(a), BucketKey::Date(b)) => a.cmp(b),
        (
            BucketKey::Week {
                year: year_a,
                week: week_a,
            },
            BucketKey::Week {
                year: year_b,
                week: week_b,
            },
        ) => {
            let week = numeric_first(week_a.ordinal(), week_b.ordinal());
            let year = numeric_first(year_a.ordinal(), year_b.ordinal());
            match sort {
                WeeklySort::Week => week.then(year),
                WeeklySort::YearWeek => year.then(week),
            }
        }
        (BucketKey::Week { .. }, BucketKey::Date(_)) => Ordering::Less,
        (BucketKey::Date(_), BucketKey::Week { .. }) => Ordering::Greater,
    }
}

// Values without an integer reading go last.
fn numeric_first(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
