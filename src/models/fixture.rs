//! Fixture (scheduled match) entity.

use crate::models::league::LeagueId;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a fixture.
pub type FixtureId = u64;

/// A scheduled match between two distinct teams.
///
/// Scores stay `None` until a result is recorded, which also flips
/// `finalized` exactly once; there is no way back to scheduled.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub scheduled_at: DateTime<Utc>,
    pub league_id: Option<LeagueId>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub finalized: bool,
}
