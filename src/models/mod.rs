//! Entity records for the league manager: leagues, teams, coaches, players, fixtures.

mod coach;
mod fixture;
mod league;
mod player;
mod team;

pub use coach::{Coach, CoachId};
pub use fixture::{Fixture, FixtureId};
pub use league::{League, LeagueId};
pub use player::{Player, PlayerId};
pub use team::{Team, TeamId};
