//! Read-only statistics projections over the store. Nothing here mutates.

use crate::models::{LeagueId, TeamId};
use crate::store::LeagueStore;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// One leaderboard row: a team and its win counter.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TeamWins {
    pub team_id: TeamId,
    pub name: String,
    pub wins: u32,
}

/// All teams ranked by wins, descending; ties keep id order.
pub fn wins_leaderboard(store: &LeagueStore) -> Vec<TeamWins> {
    let mut rows: Vec<TeamWins> = store
        .teams()
        .into_iter()
        .map(|t| TeamWins {
            team_id: t.id,
            name: t.name.clone(),
            wins: t.wins,
        })
        .collect();
    rows.sort_by_key(|r| Reverse(r.wins));
    rows
}

/// One row of the per-league team count.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LeagueTeamCount {
    pub league_id: LeagueId,
    pub name: String,
    pub teams: usize,
}

/// Team count per league. Leagues with no teams are included with 0.
pub fn teams_per_league(store: &LeagueStore) -> Vec<LeagueTeamCount> {
    let mut counts: BTreeMap<LeagueId, usize> = BTreeMap::new();
    for team in store.teams() {
        if let Some(league_id) = team.league_id {
            *counts.entry(league_id).or_default() += 1;
        }
    }
    store
        .leagues()
        .into_iter()
        .map(|l| LeagueTeamCount {
            league_id: l.id,
            name: l.name.clone(),
            teams: counts.get(&l.id).copied().unwrap_or(0),
        })
        .collect()
}

/// Average roster size over teams with at least one player assigned
/// (free agents do not count towards any roster). 0.0 when no player is
/// assigned anywhere.
pub fn average_squad_size(store: &LeagueStore) -> f64 {
    let mut counts: BTreeMap<TeamId, usize> = BTreeMap::new();
    for player in store.players() {
        if let Some(team_id) = player.team_id {
            *counts.entry(team_id).or_default() += 1;
        }
    }
    if counts.is_empty() {
        return 0.0;
    }
    counts.values().sum::<usize>() as f64 / counts.len() as f64
}
