//! Player entity.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a player.
pub type PlayerId = u64;

/// A player, optionally on a team's roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub age: u32,
    pub position: Option<String>,
    pub team_id: Option<TeamId>,
}
