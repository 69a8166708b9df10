use crate::core::{
    csv::Record,
    dates::parse_date,
    leaderboard::{parse_points, CHALLENGE, NAME, POINTS},
};
use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::warn;

/// Number of completions shown in the feed.
pub const FEED_SIZE: usize = 10;
pub const DATE: &'static str = "Date";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentCompletion {
    pub name: String,
    pub challenge: String,
    pub points: f64,
    /// Date as written in the feed
    pub date: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// Completed less than a day before `now`
    pub is_new: bool,
}

/// Latest completions, newest first. Rows whose date cannot be parsed are
/// listed after every dated row, in feed order.
pub fn recent_completions(completions: &[Record], now: DateTime<Utc>) -> Vec<RecentCompletion> {
    completions
        .iter()
        .map(|r| {
            let date = r.field(DATE).trim();
            let timestamp = match parse_date(date) {
                Ok(timestamp) => Some(timestamp),
                Err(e) => {
                    warn!("Completion by '{}' has no usable date: {e}", r.field(NAME).trim());
                    None
                }
            };
            RecentCompletion {
                name: r.field(NAME).trim().to_string(),
                challenge: r.field(CHALLENGE).trim().to_string(),
                points: parse_points(r.field(POINTS)),
                date: date.to_string(),
                is_new: timestamp.map_or(false, |t| now - t < Duration::days(1)),
                timestamp,
            }
        })
        // stable sort: None sorts below every Some once reversed
        .sorted_by_key(|c| Reverse(c.timestamp))
        .take(FEED_SIZE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn completion(name: &str, date: &str) -> Record {
        [(NAME, name), (CHALLENGE, "Dishes"), (POINTS, "5"), (DATE, date)]
            .into_iter()
            .collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn newest_first_with_undated_rows_last() {
        let completions = vec![
            completion("old", "2026-02-20"),
            completion("undated", "sometime"),
            completion("new", "01.03.2026"),
            completion("blank", ""),
            completion("mid", "2/25/2026"),
        ];
        let names = recent_completions(&completions, now())
            .into_iter()
            .map(|c| c.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["new", "mid", "old", "undated", "blank"]);
    }

    #[test]
    fn keeps_only_latest_entries() {
        let completions = (1..=15)
            .map(|day| completion(&day.to_string(), &format!("2026-02-{day:02}")))
            .collect::<Vec<_>>();
        let feed = recent_completions(&completions, now());
        assert_eq!(feed.len(), FEED_SIZE);
        assert_eq!(feed[0].name, "15");
        assert_eq!(feed[9].name, "6");
    }

    #[test]
    fn flags_completions_from_the_last_day() {
        let completions = vec![completion("today", "2026-03-01"), completion("older", "2026-02-27")];
        let feed = recent_completions(&completions, now());
        assert!(feed[0].is_new);
        assert!(!feed[1].is_new);
        assert_eq!(feed[0].points, 5.0);
    }
}
