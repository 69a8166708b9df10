pub mod challenges;
pub mod csv;
pub mod dashboard;
pub mod dates;
pub mod display;
pub mod leaderboard;
pub mod recent;
pub mod stats;
pub mod templates;
