use chrono::{DateTime, Utc};

use crate::derive::series::ChartSeriesPoint;
use crate::metrics::RevenueDataPoint;

/// `(current - previous) / previous * 100`, or `None` when `previous` is zero.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Growth from the earliest to the latest value, in percent.
///
/// The input is ordered by date first (stable, so same-day points keep their
/// relative order). Returns 0 for fewer than two points or a zero first value.
pub fn overall_growth(points: &[(DateTime<Utc>, f64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut sorted: Vec<&(DateTime<Utc>, f64)> = points.iter().collect();
    sorted.sort_by_key(|(date, _)| *date);
    match (sorted.first(), sorted.last()) {
        (Some((_, first)), Some((_, last))) => percent_change(*first, *last).unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn series_growth(series: &[ChartSeriesPoint]) -> f64 {
    let points: Vec<_> = series.iter().map(|p| (p.date, p.value)).collect();
    overall_growth(&points)
}

pub fn revenue_growth(points: &[RevenueDataPoint]) -> f64 {
    let pairs: Vec<_> = points.iter().map(|p| (p.date, p.revenue)).collect();
    overall_growth(&pairs)
}

/// Each value compared with the one before it.
///
/// The first entry, and any entry whose predecessor is zero, is `None`.
pub fn sequential_growth(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;
    for &value in values {
        out.push(previous.and_then(|p| percent_change(p, value)));
        previous = Some(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn two_points_give_fifty_percent() {
        assert_eq!(overall_growth(&[(day(1), 100.0), (day(2), 150.0)]), 50.0);
    }

    #[test]
    fn short_sequences_give_zero() {
        assert_eq!(overall_growth(&[]), 0.0);
        assert_eq!(overall_growth(&[(day(1), 100.0)]), 0.0);
    }

    #[test]
    fn zero_first_value_gives_zero() {
        assert_eq!(overall_growth(&[(day(1), 0.0), (day(2), 150.0)]), 0.0);
    }

    #[test]
    fn points_are_ordered_by_date() {
        let growth = overall_growth(&[(day(3), 48000.0), (day(1), 45000.0), (day(2), 52000.0)]);
        assert!((growth - 6.666_666_666_666_667).abs() < 1e-9);
    }

    #[test]
    fn sequential_growth_skips_first_and_zero_bases() {
        let growth = sequential_growth(&[100.0, 150.0, 0.0, 20.0]);
        assert_eq!(growth, vec![None, Some(50.0), Some(-100.0), None]);
    }
}
