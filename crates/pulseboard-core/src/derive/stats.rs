use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::derive::growth::percent_change;
use crate::metrics::RevenueDataPoint;

/// Total, mean and extremes of a numeric sequence.
///
/// Every field is zero for an empty sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

pub fn summarize<I>(values: I) -> Summary
where
    I: IntoIterator<Item = f64>,
{
    let mut summary = Summary::default();
    for value in values {
        if summary.count == 0 {
            summary.max = value;
            summary.min = value;
        } else {
            summary.max = summary.max.max(value);
            summary.min = summary.min.min(value);
        }
        summary.count += 1;
        summary.total += value;
    }
    if summary.count > 0 {
        summary.average = summary.total / summary.count as f64;
    }
    summary
}

/// The `n` records with the largest `key`, highest first.
///
/// The sort is stable, so among equal keys the earlier record wins.
pub fn top_n<T, F>(records: &[T], n: usize, key: F) -> Vec<&T>
where
    F: Fn(&T) -> f64,
{
    let mut ranked: Vec<&T> = records.iter().collect();
    ranked.sort_by(|a, b| key(b).total_cmp(&key(a)));
    ranked.truncate(n);
    ranked
}

/// The record with the largest `key`; the first one on ties.
pub fn max_by_key<T, F>(records: &[T], key: F) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    records.iter().fold(None, |best, r| match best {
        Some(b) if key(r) <= key(b) => Some(b),
        _ => Some(r),
    })
}

/// The record with the smallest `key`; the first one on ties.
pub fn min_by_key<T, F>(records: &[T], key: F) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    records.iter().fold(None, |best, r| match best {
        Some(b) if key(r) >= key(b) => Some(b),
        _ => Some(r),
    })
}

/// Revenue summed over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// First day of the month.
    pub month: NaiveDate,
    /// Display label such as `"Jan 2024"`.
    pub label: String,
    pub revenue: f64,
    /// Change against the previous bucket in percent; `None` for the first
    /// bucket or when the previous month summed to zero.
    pub growth: Option<f64>,
}

/// Sum revenue per calendar month (UTC), oldest month first.
///
/// Months are keyed by year and month, so January of two different years
/// land in separate buckets. The bucket totals add up to the input total.
pub fn monthly_buckets(points: &[RevenueDataPoint]) -> Vec<MonthlyBucket> {
    let mut sums: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for p in points {
        *sums.entry((p.date.year(), p.date.month())).or_insert(0.0) += p.revenue;
    }

    let mut buckets: Vec<MonthlyBucket> = Vec::with_capacity(sums.len());
    for ((year, month), revenue) in sums {
        let Some(first_day) = NaiveDate::from_ymd_opt(year, month, 1) else {
            continue;
        };
        let growth = buckets
            .last()
            .and_then(|prev| percent_change(prev.revenue, revenue));
        buckets.push(MonthlyBucket {
            month: first_day,
            label: first_day.format("%b %Y").to_string(),
            revenue,
            growth,
        });
    }
    buckets
}

/// Best and worst month plus the monthly average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyHighlights {
    pub best: Option<MonthlyBucket>,
    pub worst: Option<MonthlyBucket>,
    pub average: f64,
}

pub fn monthly_highlights(buckets: &[MonthlyBucket]) -> MonthlyHighlights {
    MonthlyHighlights {
        best: max_by_key(buckets, |b| b.revenue).cloned(),
        worst: min_by_key(buckets, |b| b.revenue).cloned(),
        average: summarize(buckets.iter().map(|b| b.revenue)).average,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn point(y: i32, m: u32, d: u32, revenue: f64) -> RevenueDataPoint {
        RevenueDataPoint {
            id: format!("{y}-{m}-{d}"),
            date: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            revenue,
            source: None,
            region: None,
        }
    }

    #[test]
    fn summary_matches_manual_sums() {
        let s = summarize([45000.0, 52000.0, 48000.0]);
        assert_eq!(s.count, 3);
        assert_eq!(s.total, 145000.0);
        assert!((s.average - 145000.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.max, 52000.0);
        assert_eq!(s.min, 45000.0);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(summarize(std::iter::empty()), Summary::default());
    }

    #[test]
    fn top_n_breaks_ties_by_first_occurrence() {
        let records = vec![("a", 10.0), ("b", 30.0), ("c", 30.0), ("d", 20.0)];
        let top: Vec<&str> = top_n(&records, 3, |r| r.1).iter().map(|r| r.0).collect();
        assert_eq!(top, vec!["b", "c", "d"]);
    }

    #[test]
    fn top_n_on_short_input_returns_everything() {
        let records = vec![1.0, 2.0];
        assert_eq!(top_n(&records, 5, |r| *r).len(), 2);
        assert!(top_n(&Vec::<f64>::new(), 5, |r| *r).is_empty());
    }

    #[test]
    fn extremes_prefer_first_occurrence() {
        let records = vec![("a", 5.0), ("b", 9.0), ("c", 9.0), ("d", 1.0), ("e", 1.0)];
        assert_eq!(max_by_key(&records, |r| r.1).map(|r| r.0), Some("b"));
        assert_eq!(min_by_key(&records, |r| r.1).map(|r| r.0), Some("d"));
    }

    #[test]
    fn monthly_buckets_preserve_total() {
        let points = vec![
            point(2024, 1, 3, 100.0),
            point(2024, 2, 1, 250.5),
            point(2024, 1, 20, 300.0),
            point(2025, 1, 5, 42.0),
            point(2024, 2, 1, 0.25),
        ];
        let buckets = monthly_buckets(&points);
        let bucket_total: f64 = buckets.iter().map(|b| b.revenue).sum();
        let input_total: f64 = points.iter().map(|p| p.revenue).sum();
        assert_eq!(bucket_total, input_total);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan 2024", "Feb 2024", "Jan 2025"]);
        assert_eq!(buckets[0].revenue, 400.0);
    }

    #[test]
    fn monthly_growth_compares_with_previous_bucket() {
        let buckets = monthly_buckets(&[point(2024, 1, 1, 100.0), point(2024, 2, 1, 150.0)]);
        assert_eq!(buckets[0].growth, None);
        assert_eq!(buckets[1].growth, Some(50.0));
    }

    #[test]
    fn highlights_pick_best_and_worst() {
        let buckets = monthly_buckets(&[
            point(2024, 1, 1, 100.0),
            point(2024, 2, 1, 300.0),
            point(2024, 3, 1, 50.0),
        ]);
        let h = monthly_highlights(&buckets);
        assert_eq!(h.best.map(|b| b.label), Some("Feb 2024".to_string()));
        assert_eq!(h.worst.map(|b| b.label), Some("Mar 2024".to_string()));
        assert_eq!(h.average, 150.0);
        assert_eq!(monthly_highlights(&[]).average, 0.0);
    }
}
