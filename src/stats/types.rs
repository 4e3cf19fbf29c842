use serde::{Deserialize, Serialize};

/// Share of accepted vs rejected encounters across the whole collection.
/// The two percentages are rounded independently and need not sum to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSplit {
    pub accepted_pct: u32,
    pub rejected_pct: u32,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Counts inside the trailing window. `approaches` includes records of any
/// status, so it can exceed `accepts + rejects`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyCounts {
    pub approaches: usize,
    pub rejects: usize,
    pub accepts: usize,
}

/// Percent (0-100) of the weekly target reached by each weekly count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub approaches_pct: u32,
    pub rejects_pct: u32,
    pub accepts_pct: u32,
}
