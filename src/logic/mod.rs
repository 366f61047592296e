//! Business logic: the match engine and read-only statistics.

mod fixtures;
mod stats;

pub use fixtures::{record_result, schedule_fixture};
pub use stats::{average_squad_size, teams_per_league, wins_leaderboard, LeagueTeamCount, TeamWins};
