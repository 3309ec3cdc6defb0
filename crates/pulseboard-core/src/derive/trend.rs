use serde::Serialize;

/// Users trend magnitude relative to primary growth.
pub const USERS_TREND_FACTOR: f64 = 0.8;
/// Conversions trend magnitude relative to primary growth.
pub const CONVERSIONS_TREND_FACTOR: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Direction::Up
        } else if value < 0.0 {
            Direction::Down
        } else {
            Direction::Neutral
        }
    }
}

/// Rising, falling or flat, with an absolute magnitude in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendIndicator {
    pub change: f64,
    pub direction: Direction,
}

impl TrendIndicator {
    pub fn from_growth(growth: f64) -> Self {
        if !growth.is_finite() {
            return Self {
                change: 0.0,
                direction: Direction::Neutral,
            };
        }
        Self {
            change: growth.abs(),
            direction: Direction::of(growth),
        }
    }

    /// A secondary indicator: same direction, magnitude scaled by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            change: (self.change * factor).abs(),
            direction: self.direction,
        }
    }
}

/// Indicators for the four dashboard metric cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricTrends {
    pub revenue: TrendIndicator,
    pub users: TrendIndicator,
    pub conversions: TrendIndicator,
    pub growth: TrendIndicator,
}

pub fn metric_trends(growth: f64) -> MetricTrends {
    let primary = TrendIndicator::from_growth(growth);
    MetricTrends {
        revenue: primary,
        users: primary.scaled(USERS_TREND_FACTOR),
        conversions: primary.scaled(CONVERSIONS_TREND_FACTOR),
        growth: primary,
    }
}
