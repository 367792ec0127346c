// Aggregation over in-memory record collections
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Scalar summary of a collection under an optional predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    pub total: usize,
    pub count: usize,
    pub sum: f64,
    pub percentage: f64,
}

pub fn count<T>(records: &[T], predicate: impl Fn(&T) -> bool) -> usize {
    records.iter().filter(|r| predicate(r)).count()
}

/// Sum of the selected values; records without a value are skipped.
pub fn sum<T>(records: &[T], selector: impl Fn(&T) -> Option<f64>) -> f64 {
    records.iter().filter_map(selector).sum()
}

/// `part / total * 100`, or 0 for an empty denominator.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Ratio of two sums as a percentage, 0 when the denominator is not positive.
pub fn ratio_percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 || !whole.is_finite() || !part.is_finite() {
        return 0.0;
    }
    part / whole * 100.0
}

pub fn aggregate<T>(
    records: &[T],
    selector: impl Fn(&T) -> Option<f64>,
    predicate: Option<&dyn Fn(&T) -> bool>,
) -> Metric {
    let matching: Vec<&T> = match predicate {
        Some(p) => records.iter().filter(|r| p(r)).collect(),
        None => records.iter().collect(),
    };

    let count = matching.len();
    let sum: f64 = matching.into_iter().filter_map(selector).sum();

    Metric {
        total: records.len(),
        count,
        sum,
        percentage: percentage(count, records.len()),
    }
}

/// Count records per key. Keys come back sorted so summaries are stable.
pub fn group_count<T, K: Into<String>>(
    records: &[T],
    key: impl Fn(&T) -> K,
) -> BTreeMap<String, usize> {
    let mut groups = BTreeMap::new();
    for record in records {
        *groups.entry(key(record).into()).or_insert(0) += 1;
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Overdue,
    ThisWindow,
    Later,
    None,
}

/// Place a date relative to `now` and a look-ahead window.
/// The window is inclusive on both ends.
pub fn classify(date: Option<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) -> TimeBucket {
    match date {
        None => TimeBucket::None,
        Some(d) if d < now => TimeBucket::Overdue,
        Some(d) if d <= now + window => TimeBucket::ThisWindow,
        Some(_) => TimeBucket::Later,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExpiryBuckets {
    pub window_days: i64,
    pub overdue: usize,
    pub expiring_soon: usize,
    pub later: usize,
    pub none: usize,
}

impl ExpiryBuckets {
    pub fn total(&self) -> usize {
        self.overdue + self.expiring_soon + self.later + self.none
    }

    /// Records that carried a usable date.
    pub fn dated(&self) -> usize {
        self.total() - self.none
    }

    fn record(&mut self, bucket: TimeBucket) {
        match bucket {
            TimeBucket::Overdue => self.overdue += 1,
            TimeBucket::ThisWindow => self.expiring_soon += 1,
            TimeBucket::Later => self.later += 1,
            TimeBucket::None => self.none += 1,
        }
    }
}

pub fn bucket_by_date<T>(
    records: &[T],
    selector: impl Fn(&T) -> Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> ExpiryBuckets {
    let mut buckets = ExpiryBuckets {
        window_days: window.num_days(),
        ..ExpiryBuckets::default()
    };

    for record in records {
        buckets.record(classify(selector(record), now, window));
    }

    buckets
}
