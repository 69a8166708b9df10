use crate::{
    core::{challenges::ChallengeCard, leaderboard::LeaderboardEntry},
    utils::{format_points, suffix},
};
use itertools::Itertools;

// Display ranked standings as an aligned text board
pub fn standings(entries: &[LeaderboardEntry]) -> String {
    // calculate width for ranks
    // the width of the largest rank, plus the ordinal suffix
    let width_rank = 2 + entries
        .iter()
        .map(|e| e.rank.to_string().len())
        .max()
        .unwrap_or_default();

    // calculate width for names
    // the length of the longest name, plus one for ':'
    let width_name = 1 + entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or_default();

    let width_points = entries
        .iter()
        .map(|e| format_points(e.points).len())
        .max()
        .unwrap_or_default();

    entries
        .iter()
        .map(|e| {
            format!(
                "{:>width_rank$} {:<width_name$} {:>width_points$} pts",
                format!("{}{}", e.rank, suffix(e.rank)),
                format!("{}:", e.name),
                format_points(e.points),
            )
        })
        .join("\n")
}

// Display challenges with their completion counts
pub fn challenges(cards: &[&ChallengeCard]) -> String {
    let width_name = cards
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or_default();

    cards
        .iter()
        .map(|c| {
            let points = match c.points > 0.0 {
                true => format!("+{}", format_points(c.points)),
                false => format_points(c.points),
            };
            let done = match c.completions {
                0 => "not yet completed".to_string(),
                n => format!("{n}x completed"),
            };
            format!("{:<width_name$} {:>5}  [{}] {}", c.name, points, c.category, done)
        })
        .join("\n")
}
