use crate::core::{
    csv::Record,
    leaderboard::{parse_points, CompletionCounts, POINTS},
};
use serde::Serialize;

pub const CATEGORY: &'static str = "Category";
pub const CHALLENGE_NAME: &'static str = "Challenge Name";
pub const DESCRIPTION: &'static str = "Description";
/// Category filter value matching every card.
pub const ALL_CATEGORIES: &'static str = "all";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeCard {
    pub category: String,
    pub name: String,
    pub description: String,
    pub points: f64,
    pub completions: usize,
}

/// One card per challenge row, with how many times it was completed.
pub fn challenge_cards(challenges: &[Record], counts: &CompletionCounts) -> Vec<ChallengeCard> {
    challenges
        .iter()
        .map(|r| {
            let name = r.field(CHALLENGE_NAME).trim().to_string();
            ChallengeCard {
                category: r.field(CATEGORY).trim().to_string(),
                description: r.field(DESCRIPTION).trim().to_string(),
                points: parse_points(r.field(POINTS)),
                completions: counts.get(&name).copied().unwrap_or_default(),
                name,
            }
        })
        .collect()
}

pub fn filter_by_category<'a>(cards: &'a [ChallengeCard], category: &str) -> Vec<&'a ChallengeCard> {
    cards
        .iter()
        .filter(|card| category == ALL_CATEGORIES || card.category == category)
        .collect()
}
