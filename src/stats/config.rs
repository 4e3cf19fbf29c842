use chrono::Duration;

/// Constants the dashboard feeds into the aggregator.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Length of the trailing window used for weekly counts.
    pub window_days: i64,

    /// Weekly goal each progress ring is measured against.
    pub weekly_target: usize,
}

impl StatsConfig {
    /// Window as a duration. Negative lengths count as zero and lengths
    /// past what `Duration` can hold saturate.
    pub fn window(&self) -> Duration {
        Duration::try_days(self.window_days.max(0)).unwrap_or(Duration::MAX)
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            weekly_target: 10,
        }
    }
}
