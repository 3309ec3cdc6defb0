use std::collections::HashMap;

use serde::Serialize;

use crate::metrics::RevenueDataPoint;

const UNTAGGED: &str = "unassigned";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueShare {
    pub name: String,
    pub revenue: f64,
    pub percent: f64,
}

/// Revenue grouped by stream, largest first.
pub fn revenue_by_source(points: &[RevenueDataPoint]) -> Vec<RevenueShare> {
    revenue_by(points, |p| p.source.as_deref())
}

/// Revenue grouped by region, largest first.
pub fn revenue_by_region(points: &[RevenueDataPoint]) -> Vec<RevenueShare> {
    revenue_by(points, |p| p.region.as_deref())
}

/// Group by an optional tag. Untagged points share one bucket; groups with
/// equal revenue keep the order in which their tag first appeared.
fn revenue_by<F>(points: &[RevenueDataPoint], tag: F) -> Vec<RevenueShare>
where
    F: Fn(&RevenueDataPoint) -> Option<&str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();
    for p in points {
        let name = tag(p).filter(|t| !t.is_empty()).unwrap_or(UNTAGGED);
        match sums.get_mut(name) {
            Some(sum) => *sum += p.revenue,
            None => {
                order.push(name.to_string());
                sums.insert(name.to_string(), p.revenue);
            }
        }
    }

    let total: f64 = sums.values().sum();
    let mut shares: Vec<RevenueShare> = order
        .into_iter()
        .map(|name| {
            let revenue = sums.get(&name).copied().unwrap_or(0.0);
            RevenueShare {
                percent: if total > 0.0 { revenue / total * 100.0 } else { 0.0 },
                name,
                revenue,
            }
        })
        .collect();
    shares.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    shares
}
