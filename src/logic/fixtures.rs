//! Match engine: fixture scheduling and result recording.

use crate::models::{Fixture, FixtureId, LeagueId, TeamId};
use crate::store::{LeagueError, LeagueStore};
use chrono::{DateTime, Utc};

/// Schedule a fixture between two distinct teams.
///
/// 1. Home and away must be different teams.
/// 2. Both teams must exist.
/// 3. The effective league is the explicit `league_id` if given (and it must
///    exist), else the home team's own league, else none.
/// 4. With an effective league, a team assigned to a *different* league is
///    rejected; unassigned teams may play anywhere.
pub fn schedule_fixture(
    store: &mut LeagueStore,
    scheduled_at: DateTime<Utc>,
    league_id: Option<LeagueId>,
    home_team_id: TeamId,
    away_team_id: TeamId,
) -> Result<Fixture, LeagueError> {
    if home_team_id == away_team_id {
        return Err(LeagueError::SameTeam);
    }
    let home_league = store.team(home_team_id)?.league_id;
    let away_league = store.team(away_team_id)?.league_id;

    let effective = match league_id {
        Some(id) => {
            store.league(id)?;
            Some(id)
        }
        None => home_league,
    };

    if let Some(league) = effective {
        if home_league.is_some_and(|l| l != league) {
            return Err(LeagueError::WrongLeague { side: "home" });
        }
        if away_league.is_some_and(|l| l != league) {
            return Err(LeagueError::WrongLeague { side: "away" });
        }
    }

    Ok(store.insert_fixture(scheduled_at, effective, home_team_id, away_team_id))
}

/// Record the final score of a fixture and credit the winner.
///
/// The score writes, the finalized flag, and the winner's counter move as one
/// unit: the caller holds the store exclusively for the whole call, and every
/// lookup happens before the first write, so no error path can leave a
/// partial result behind.
///
/// A draw credits nobody; otherwise the strictly higher-scoring team gains
/// exactly one win. Negative and out-of-range scores are rejected, and so is
/// a second call on an already-finalized fixture.
pub fn record_result(
    store: &mut LeagueStore,
    fixture_id: FixtureId,
    home_score: i64,
    away_score: i64,
) -> Result<Fixture, LeagueError> {
    if home_score < 0 || away_score < 0 {
        return Err(LeagueError::NegativeScore);
    }
    // Scores persist as u32; anything larger must fail here, not truncate.
    let (Ok(home_score), Ok(away_score)) =
        (u32::try_from(home_score), u32::try_from(away_score))
    else {
        return Err(LeagueError::InvalidField {
            field: "score",
            reason: format!("must be at most {}", u32::MAX),
        });
    };

    let fixture = store.fixture(fixture_id)?;
    if fixture.finalized {
        return Err(LeagueError::AlreadyFinalized(fixture_id));
    }
    let home_team_id = fixture.home_team_id;
    let away_team_id = fixture.away_team_id;

    let winner = if home_score > away_score {
        Some(home_team_id)
    } else if away_score > home_score {
        Some(away_team_id)
    } else {
        None
    };
    if let Some(team_id) = winner {
        store.team(team_id)?;
    }

    let fixture = store.fixture_mut(fixture_id)?;
    fixture.home_score = Some(home_score);
    fixture.away_score = Some(away_score);
    fixture.finalized = true;

    if let Some(team_id) = winner {
        store.team_mut(team_id)?.add_win();
    }

    Ok(store.fixture(fixture_id)?.clone())
}
