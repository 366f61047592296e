//! League entity.

use serde::{Deserialize, Serialize};

/// Unique identifier for a league.
pub type LeagueId = u64;

/// Named grouping of teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub description: Option<String>,
}
