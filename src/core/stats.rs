use crate::core::leaderboard::{CompletionCounts, LeaderboardEntry};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    /// Participants with a positive total
    pub active_participants: usize,
    pub total_completions: usize,
    pub most_popular: Option<String>,
    /// Active participants as a rounded percentage of all residents
    pub participation_rate: u32,
}

impl Statistics {
    pub fn compute(
        standings: &[LeaderboardEntry],
        counts: &CompletionCounts,
        total_completions: usize,
        total_residents: u32,
    ) -> Statistics {
        let active_participants = standings.iter().filter(|e| e.points > 0.0).count();

        // first challenge reaching the highest count wins ties
        let most_popular = counts
            .iter()
            .fold(None, |best: Option<(&String, usize)>, (name, count)| match best {
                Some((_, max)) if *count <= max => best,
                _ => Some((name, *count)),
            })
            .map(|(name, _)| name.clone());

        let participation_rate = match total_residents {
            0 => 0,
            total => (active_participants as f64 / total as f64 * 100.0).round() as u32,
        };

        Statistics {
            active_participants,
            total_completions,
            most_popular,
            participation_rate,
        }
    }
}
