use crate::core::csv::Record;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Number of entries shown on the podium.
pub const PODIUM_SIZE: usize = 3;

// Feed column names
pub const NAME: &'static str = "Name";
pub const CHALLENGE: &'static str = "Challenge";
pub const POINTS: &'static str = "Points";
pub const CONFIRMED: &'static str = "Confirmed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub points: f64,
    pub rank: usize,
}

/// challenge name => number of confirmed completions, in order of first appearance.
pub type CompletionCounts = IndexMap<String, usize>;

/// Keep only completions marked as confirmed ("YES", any case).
pub fn confirmed_only(completions: Vec<Record>) -> Vec<Record> {
    completions
        .into_iter()
        .filter(|r| r.field(CONFIRMED).to_uppercase() == "YES")
        .collect()
}

/// Ranked standings: highest total first, ties ordered by name and sharing a rank.
///
/// Ranking is "competition" style: after a group of tied entries the next
/// entry's rank is its position, so `[10, 10, 5]` ranks as `1, 1, 3`.
pub fn build_leaderboard(completions: &[Record]) -> Vec<LeaderboardEntry> {
    let sorted = completions
        .iter()
        .map(|r| (r.field(NAME).trim(), parse_points(r.field(POINTS))))
        .filter(|(name, _)| !name.is_empty())
        .into_grouping_map_by(|(name, _)| *name)
        .fold(0.0, |acc, _name, (_, points)| acc + points)
        .into_iter()
        .sorted_by(|a, b| match b.1.partial_cmp(&a.1) {
            Some(Ordering::Equal) | None => compare_names(a.0, b.0),
            Some(ordering) => ordering,
        })
        .collect::<Vec<(&str, f64)>>();

    let mut standings: Vec<LeaderboardEntry> = Vec::with_capacity(sorted.len());
    for (idx, (name, points)) in sorted.into_iter().enumerate() {
        let rank = match standings.last() {
            Some(previous) if previous.points == points => previous.rank,
            _ => idx + 1,
        };
        standings.push(LeaderboardEntry {
            name: name.to_string(),
            points,
            rank,
        });
    }
    standings
}

/// challenge name => number of completions referencing it (trimmed, non-empty).
pub fn completion_counts(completions: &[Record]) -> CompletionCounts {
    completions
        .iter()
        .map(|r| r.field(CHALLENGE).trim())
        .filter(|challenge| !challenge.is_empty())
        .fold(CompletionCounts::new(), |mut acc, challenge| {
            *acc.entry(challenge.to_string()).or_insert(0) += 1;
            acc
        })
}

/// Top of the standings, in rank order.
pub fn podium(standings: &[LeaderboardEntry]) -> &[LeaderboardEntry] {
    &standings[..standings.len().min(PODIUM_SIZE)]
}

/// Standings below the podium.
pub fn rest(standings: &[LeaderboardEntry]) -> &[LeaderboardEntry] {
    &standings[standings.len().min(PODIUM_SIZE)..]
}

/// Lenient numeric coercion: the longest numeric prefix, 0 when there is none.
pub fn parse_points(input: &str) -> f64 {
    let input = input.trim_start();
    let candidate = input
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .last()
        .map(|(idx, c)| &input[..idx + c.len_utf8()])
        .unwrap_or_default();

    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .filter(|points| points.is_finite())
        .unwrap_or(0.0)
}

/// Name ordering, as a locale collation would: letters first with accents and
/// case ignored, then unaccented before accented, then lowercase before uppercase.
fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().nfd().cmp(b.to_lowercase().nfd()))
        .then_with(|| b.cmp(a))
}

// "Ärni" => "arni"
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn completion(name: &str, challenge: &str, points: &str) -> Record {
        [(NAME, name), (CHALLENGE, challenge), (POINTS, points)]
            .into_iter()
            .collect()
    }

    fn ranks(standings: &[LeaderboardEntry]) -> Vec<(&str, f64, usize)> {
        standings
            .iter()
            .map(|e| (e.name.as_str(), e.points, e.rank))
            .collect()
    }

    #[test]
    fn tied_entries_share_rank_and_next_rank_skips_to_position() {
        let completions = vec![
            completion("A", "x", "10"),
            completion("B", "x", "10"),
            completion("C", "x", "5"),
        ];
        assert_eq!(
            ranks(&build_leaderboard(&completions)),
            vec![("A", 10.0, 1), ("B", 10.0, 1), ("C", 5.0, 3)]
        );
    }

    #[test]
    fn empty_input_gives_empty_leaderboard() {
        assert!(build_leaderboard(&[]).is_empty());
    }

    #[test]
    fn points_are_summed_per_trimmed_name() {
        let completions = vec![
            completion("Alice", "a", "10"),
            completion("  Alice ", "b", "2.5"),
            completion("Bob", "a", "-3"),
            completion("Bob", "b", "oops"),
        ];
        assert_eq!(
            ranks(&build_leaderboard(&completions)),
            vec![("Alice", 12.5, 1), ("Bob", -3.0, 2)]
        );
    }

    #[test]
    fn blank_names_are_excluded() {
        let completions = vec![completion("   ", "a", "100"), completion("", "a", "50")];
        assert!(build_leaderboard(&completions).is_empty());
    }

    #[test]
    fn ties_are_ordered_by_name_case_insensitively() {
        let completions = vec![
            completion("charlie", "a", "1"),
            completion("Bravo", "a", "1"),
            completion("alpha", "a", "1"),
        ];
        let names = build_leaderboard(&completions)
            .into_iter()
            .map(|e| e.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["alpha", "Bravo", "charlie"]);
    }

    #[test]
    fn accented_names_sort_by_their_base_letter() {
        let completions = ["Zoe", "Ärni", "Émile", "Bob", "Arni", "émile"]
            .iter()
            .map(|name| completion(name, "a", "5"))
            .collect::<Vec<_>>();
        let names = build_leaderboard(&completions)
            .into_iter()
            .map(|e| e.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Arni", "Ärni", "Bob", "émile", "Émile", "Zoe"]);
    }

    #[test]
    fn leaderboard_is_idempotent() {
        let completions = vec![completion("A", "a", "3"), completion("B", "a", "4")];
        assert_eq!(build_leaderboard(&completions), build_leaderboard(&completions));
    }

    #[test]
    fn completion_counts_merge_trimmed_names() {
        let completions = vec![
            completion("A", "Dishes", "1"),
            completion("B", " Dishes  ", "1"),
            completion("C", "", "1"),
            completion("D", "Laundry", "1"),
        ];
        let counts = completion_counts(&completions);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["Dishes"], 2);
        assert_eq!(counts["Laundry"], 1);
    }

    #[test]
    fn confirmed_filter_is_case_insensitive() {
        let mut yes = completion("A", "a", "1");
        yes.insert(CONFIRMED.to_string(), "yes".to_string());
        let mut no = completion("B", "a", "1");
        no.insert(CONFIRMED.to_string(), "NO".to_string());
        let missing = completion("C", "a", "1");

        let confirmed = confirmed_only(vec![yes, no, missing]);
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].field(NAME), "A");
    }

    #[test]
    fn podium_and_rest_split_standings() {
        let completions = ["A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(idx, name)| completion(name, "a", &(10 - idx).to_string()))
            .collect::<Vec<_>>();
        let standings = build_leaderboard(&completions);
        assert_eq!(podium(&standings).len(), 3);
        assert_eq!(rest(&standings)[0].name, "D");
        assert!(rest(&standings[..2]).is_empty());
    }

    #[test]
    fn points_coercion_follows_numeric_prefix() {
        assert_eq!(parse_points("10"), 10.0);
        assert_eq!(parse_points("  7.5 pts"), 7.5);
        assert_eq!(parse_points("-2"), -2.0);
        assert_eq!(parse_points("1e2"), 100.0);
        assert_eq!(parse_points("12e"), 12.0);
        assert_eq!(parse_points(""), 0.0);
        assert_eq!(parse_points("NaN"), 0.0);
        assert_eq!(parse_points("abc"), 0.0);
    }
}
