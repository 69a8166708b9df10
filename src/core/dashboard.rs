use crate::{
    client::sheets::{Feed, Sheets},
    core::{
        challenges::{challenge_cards, ChallengeCard},
        csv::Record,
        leaderboard::{build_leaderboard, completion_counts, confirmed_only, CompletionCounts, LeaderboardEntry},
        recent::{recent_completions, RecentCompletion},
        stats::Statistics,
    },
    error::BoardResult,
};
use chrono::{DateTime, Utc};
use tracing::info;

/// Feed data loaded for one render cycle.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub challenges: Vec<Record>,
    /// Confirmed completions only
    pub completions: Vec<Record>,
}

impl AppState {
    pub fn new(challenges: Vec<Record>, completions: Vec<Record>) -> AppState {
        AppState {
            challenges,
            completions: confirmed_only(completions),
        }
    }

    /// Fetch both feeds concurrently. The first failure aborts the load.
    pub async fn load(sheets: &Sheets) -> BoardResult<AppState> {
        let (challenges, completions) = futures::try_join!(
            sheets.fetch(Feed::Challenges),
            sheets.fetch(Feed::Completions)
        )?;
        let state = AppState::new(challenges, completions);
        info!(
            "Loaded {} challenges and {} confirmed completions",
            state.challenges.len(),
            state.completions.len()
        );
        Ok(state)
    }
}

/// Every view derived from an `AppState`, rebuilt from scratch on each render.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub standings: Vec<LeaderboardEntry>,
    pub counts: CompletionCounts,
    pub cards: Vec<ChallengeCard>,
    pub recent: Vec<RecentCompletion>,
    pub statistics: Statistics,
}

impl Dashboard {
    pub fn derive(state: &AppState, total_residents: u32, now: DateTime<Utc>) -> Dashboard {
        let standings = build_leaderboard(&state.completions);
        let counts = completion_counts(&state.completions);
        let statistics =
            Statistics::compute(&standings, &counts, state.completions.len(), total_residents);

        Dashboard {
            cards: challenge_cards(&state.challenges, &counts),
            recent: recent_completions(&state.completions, now),
            standings,
            counts,
            statistics,
        }
    }
}
