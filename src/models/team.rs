//! Team entity.

use crate::models::coach::CoachId;
use crate::models::league::LeagueId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a team.
pub type TeamId = u64;

/// A participant team, optionally scoped to a league and coached by a coach.
///
/// `wins` is derived from recorded match results and only ever moves up;
/// plain updates never touch it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub league_id: Option<LeagueId>,
    pub coach_id: Option<CoachId>,
    pub wins: u32,
}

impl Team {
    /// Credit one won match.
    pub fn add_win(&mut self) {
        self.wins += 1;
    }
}
