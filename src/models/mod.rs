pub mod category;
pub mod leaderboard;
