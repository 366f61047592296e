//! Sports league web app: library with entity models, the match engine,
//! statistics projections, and the auth gateway.

pub mod auth;
pub mod logic;
pub mod models;
pub mod store;

pub use auth::{Claims, Role, TokenSigner, User, UserDirectory, UserId};
pub use logic::{
    average_squad_size, record_result, schedule_fixture, teams_per_league, wins_leaderboard,
    LeagueTeamCount, TeamWins,
};
pub use models::{
    Coach, CoachId, Fixture, FixtureId, League, LeagueId, Player, PlayerId, Team, TeamId,
};
pub use store::{EntityKind, LeagueError, LeagueStore};
