//! Statistics over an encounter collection.
//!
//! Every function here is pure and total: the same `(records, now)` always
//! gives the same answer and nothing panics or errors, whatever was stored.

mod config;
mod types;

pub use config::StatsConfig;
pub use types::{OverallSplit, StatusCounts, WeeklyCounts, WeeklyProgress};

use chrono::{DateTime, Duration, Utc};

use crate::notes::{EncounterRecord, EncounterStatus};

/// `round(100 * part / whole)`, rounding halves up. Zero when `whole` is 0.
fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

pub fn status_counts(records: &[EncounterRecord]) -> StatusCounts {
    records.iter().fold(
        StatusCounts {
            total: records.len(),
            ..StatusCounts::default()
        },
        |mut counts, record| {
            match record.status {
                EncounterStatus::Accepted => counts.accepted += 1,
                EncounterStatus::Rejected => counts.rejected += 1,
                EncounterStatus::Other(_) => {}
            }
            counts
        },
    )
}

pub fn overall_split(records: &[EncounterRecord]) -> OverallSplit {
    let counts = status_counts(records);
    OverallSplit {
        accepted_pct: percent(counts.accepted, counts.total),
        rejected_pct: percent(counts.rejected, counts.total),
        total: counts.total,
    }
}

/// Weekly counts over the default 7-day window ending at `now`.
pub fn weekly_counts(records: &[EncounterRecord], now: DateTime<Utc>) -> WeeklyCounts {
    weekly_counts_within(records, now, StatsConfig::default().window())
}

/// Counts for records stamped within `[now - window, now]`. Records whose
/// timestamp does not parse fall outside every window.
pub fn weekly_counts_within(
    records: &[EncounterRecord],
    now: DateTime<Utc>,
    window: Duration,
) -> WeeklyCounts {
    let since = now
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    records
        .iter()
        .filter(|record| {
            record
                .recorded_at()
                .is_some_and(|at| at >= since && at <= now)
        })
        .fold(WeeklyCounts::default(), |mut counts, record| {
            counts.approaches += 1;
            match record.status {
                EncounterStatus::Accepted => counts.accepts += 1,
                EncounterStatus::Rejected => counts.rejects += 1,
                EncounterStatus::Other(_) => {}
            }
            counts
        })
}

/// Percent of `target` reached, capped at 100. A zero target counts as
/// already reached.
pub fn progress_toward(count: usize, target: usize) -> u32 {
    if target == 0 {
        return 100;
    }
    percent(count, target).min(100)
}

pub fn weekly_progress(counts: &WeeklyCounts, target: usize) -> WeeklyProgress {
    WeeklyProgress {
        approaches_pct: progress_toward(counts.approaches, target),
        rejects_pct: progress_toward(counts.rejects, target),
        accepts_pct: progress_toward(counts.accepts, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{materialize_at, EncounterDraft};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 20, 0, 0).unwrap()
    }

    fn record(id: &str, status: EncounterStatus, at: DateTime<Utc>) -> EncounterRecord {
        materialize_at(EncounterDraft::new(id, status), Some(id), at)
    }

    fn with_statuses(statuses: &[EncounterStatus]) -> Vec<EncounterRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| record(&i.to_string(), status.clone(), now()))
            .collect()
    }

    #[test]
    fn test_overall_split_empty() {
        assert_eq!(
            overall_split(&[]),
            OverallSplit {
                accepted_pct: 0,
                rejected_pct: 0,
                total: 0
            }
        );
    }

    #[test]
    fn test_overall_split_even() {
        use crate::notes::EncounterStatus::{Accepted, Rejected};
        let records = with_statuses(&[Accepted, Rejected, Accepted, Rejected]);

        assert_eq!(
            overall_split(&records),
            OverallSplit {
                accepted_pct: 50,
                rejected_pct: 50,
                total: 4
            }
        );
    }

    #[test]
    fn test_overall_split_rounds_independently() {
        use crate::notes::EncounterStatus::{Accepted, Rejected};

        // 2/3 -> 67, 1/3 -> 33
        let split = overall_split(&with_statuses(&[Accepted, Accepted, Rejected]));
        assert_eq!((split.accepted_pct, split.rejected_pct), (67, 33));

        // 1/8 = 12.5 rounds up; 7/8 = 87.5 rounds up; sum is 101.
        let mut statuses = vec![Rejected; 7];
        statuses.push(Accepted);
        let split = overall_split(&with_statuses(&statuses));
        assert_eq!((split.accepted_pct, split.rejected_pct), (13, 88));
    }

    #[test]
    fn test_overall_split_counts_unknown_status_in_total_only() {
        use crate::notes::EncounterStatus::{Accepted, Rejected};
        let records = with_statuses(&[Accepted, Rejected, EncounterStatus::parse("")]);

        let split = overall_split(&records);
        assert_eq!(split.total, 3);
        assert_eq!((split.accepted_pct, split.rejected_pct), (33, 33));

        assert_eq!(
            status_counts(&records),
            StatusCounts {
                total: 3,
                accepted: 1,
                rejected: 1
            }
        );
    }

    #[test]
    fn test_weekly_window_edges() {
        let records = vec![
            record("eight", EncounterStatus::Accepted, now() - Duration::days(8)),
            record("six", EncounterStatus::Rejected, now() - Duration::days(6)),
            record("edge", EncounterStatus::Accepted, now() - Duration::days(7)),
            record("future", EncounterStatus::Accepted, now() + Duration::seconds(1)),
            record("now", EncounterStatus::Accepted, now()),
        ];

        assert_eq!(
            weekly_counts(&records, now()),
            WeeklyCounts {
                approaches: 3,
                rejects: 1,
                accepts: 2
            }
        );
    }

    #[test]
    fn test_weekly_counts_skip_bad_timestamps_and_count_other_status() {
        let mut broken = record("broken", EncounterStatus::Accepted, now());
        broken.timestamp = "2025-13-45".into();
        let records = vec![
            broken,
            record("blank", EncounterStatus::parse(""), now() - Duration::days(1)),
        ];

        assert_eq!(
            weekly_counts(&records, now()),
            WeeklyCounts {
                approaches: 1,
                rejects: 0,
                accepts: 0
            }
        );
        assert_eq!(overall_split(&records).total, 2);
    }

    #[test]
    fn test_custom_window() {
        let records = vec![record("two", EncounterStatus::Rejected, now() - Duration::days(2))];
        assert_eq!(weekly_counts_within(&records, now(), Duration::days(1)).approaches, 0);
        assert_eq!(weekly_counts_within(&records, now(), Duration::days(3)).approaches, 1);
    }

    #[test]
    fn test_date_only_timestamp_falls_in_window() {
        let mut dated = record("dated", EncounterStatus::Accepted, now());
        dated.timestamp = "2025-06-10".into();
        let mut stale = record("stale", EncounterStatus::Accepted, now());
        stale.timestamp = "2025-06-01".into();

        let counts = weekly_counts(&[dated, stale], now());
        assert_eq!((counts.approaches, counts.accepts), (1, 1));
    }

    #[test]
    fn test_extreme_clock_and_window_do_not_panic() {
        let records = vec![record("now", EncounterStatus::Rejected, now())];

        assert_eq!(weekly_counts(&[], DateTime::<Utc>::MIN_UTC), WeeklyCounts::default());
        assert_eq!(
            weekly_counts(&records, DateTime::<Utc>::MIN_UTC),
            WeeklyCounts::default()
        );

        let huge = StatsConfig {
            window_days: i64::MAX,
            ..StatsConfig::default()
        };
        let counts = weekly_counts_within(&records, now(), huge.window());
        assert_eq!((counts.approaches, counts.rejects), (1, 1));
        let counts = weekly_counts_within(&records, DateTime::<Utc>::MAX_UTC, huge.window());
        assert_eq!(counts.approaches, 1);

        let negative = StatsConfig {
            window_days: -3,
            ..StatsConfig::default()
        };
        assert_eq!(negative.window(), Duration::zero());
    }

    #[test]
    fn test_progress_toward() {
        assert_eq!(progress_toward(10, 10), 100);
        assert_eq!(progress_toward(15, 10), 100);
        assert_eq!(progress_toward(3, 10), 30);
        assert_eq!(progress_toward(0, 10), 0);
        assert_eq!(progress_toward(0, 0), 100);
    }

    #[test]
    fn test_weekly_progress() {
        let counts = WeeklyCounts {
            approaches: 12,
            rejects: 7,
            accepts: 5,
        };
        assert_eq!(
            weekly_progress(&counts, 10),
            WeeklyProgress {
                approaches_pct: 100,
                rejects_pct: 70,
                accepts_pct: 50
            }
        );
    }

    #[test]
    fn test_split_serializes_camel_case() {
        let json = serde_json::to_value(OverallSplit {
            accepted_pct: 60,
            rejected_pct: 40,
            total: 5,
        })
        .unwrap();
        assert_eq!(json["acceptedPct"], 60);
        assert_eq!(json["rejectedPct"], 40);
    }
}
