//! In-memory entity store with referential lookups.
//!
//! One store instance holds every entity table, keyed by server-assigned
//! sequential ids. The binary keeps the store behind a single `RwLock`; an
//! exclusive borrow of the store is the transaction scope for any operation
//! that touches more than one row (see `logic::fixtures::record_result`).

use crate::models::{
    Coach, CoachId, Fixture, FixtureId, League, LeagueId, Player, PlayerId, Team, TeamId,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Entity kind, for not-found reporting.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    League,
    Team,
    Coach,
    Player,
    Match,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::League => "league",
            EntityKind::Team => "team",
            EntityKind::Coach => "coach",
            EntityKind::Player => "player",
            EntityKind::Match => "match",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by the store, the match engine, and the auth gateway.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LeagueError {
    /// Referenced entity id does not exist.
    NotFound(EntityKind, u64),
    /// Home and away team of a fixture are the same team.
    SameTeam,
    /// A team is assigned to a different league than the fixture's.
    WrongLeague { side: &'static str },
    /// A result was already recorded for this fixture.
    AlreadyFinalized(FixtureId),
    /// Scores must be non-negative.
    NegativeScore,
    /// A field failed validation.
    InvalidField { field: &'static str, reason: String },
    /// The coach is already assigned to another team.
    CoachTaken { coach_id: CoachId, team_id: TeamId },
    /// The email is already registered.
    EmailTaken,
    /// Unknown email or wrong password.
    BadCredentials,
    /// Missing, malformed, tampered or expired bearer token.
    InvalidToken,
    /// Valid identity without the required role.
    Forbidden,
}

impl std::fmt::Display for LeagueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeagueError::NotFound(kind, id) => write!(f, "{kind} not found: {id}"),
            LeagueError::SameTeam => write!(f, "home and away team must be different"),
            LeagueError::WrongLeague { side } => {
                write!(f, "{side} team does not belong to the indicated league")
            }
            LeagueError::AlreadyFinalized(id) => {
                write!(f, "result already recorded for match {id}")
            }
            LeagueError::NegativeScore => write!(f, "scores must be non-negative"),
            LeagueError::InvalidField { field, reason } => write!(f, "{field} {reason}"),
            LeagueError::CoachTaken { coach_id, team_id } => {
                write!(f, "coach {coach_id} already coaches team {team_id}")
            }
            LeagueError::EmailTaken => write!(f, "email already registered"),
            LeagueError::BadCredentials => write!(f, "invalid credentials"),
            LeagueError::InvalidToken => write!(f, "invalid or expired token"),
            LeagueError::Forbidden => write!(f, "insufficient permissions for this operation"),
        }
    }
}

/// All entity tables. Ids are per-table counters starting at 1; `BTreeMap`
/// keys keep listings in stable id order.
#[derive(Clone, Debug, Default)]
pub struct LeagueStore {
    leagues: BTreeMap<LeagueId, League>,
    teams: BTreeMap<TeamId, Team>,
    coaches: BTreeMap<CoachId, Coach>,
    players: BTreeMap<PlayerId, Player>,
    fixtures: BTreeMap<FixtureId, Fixture>,
    next_league_id: LeagueId,
    next_team_id: TeamId,
    next_coach_id: CoachId,
    next_player_id: PlayerId,
    next_fixture_id: FixtureId,
}

impl LeagueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // --- reference resolvers -------------------------------------------------
    // Every mutation path resolves referenced entities through these before
    // writing anything, so partially applied writes never occur.

    pub fn league(&self, id: LeagueId) -> Result<&League, LeagueError> {
        self.leagues
            .get(&id)
            .ok_or(LeagueError::NotFound(EntityKind::League, id))
    }

    pub fn team(&self, id: TeamId) -> Result<&Team, LeagueError> {
        self.teams
            .get(&id)
            .ok_or(LeagueError::NotFound(EntityKind::Team, id))
    }

    pub fn coach(&self, id: CoachId) -> Result<&Coach, LeagueError> {
        self.coaches
            .get(&id)
            .ok_or(LeagueError::NotFound(EntityKind::Coach, id))
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, LeagueError> {
        self.players
            .get(&id)
            .ok_or(LeagueError::NotFound(EntityKind::Player, id))
    }

    pub fn fixture(&self, id: FixtureId) -> Result<&Fixture, LeagueError> {
        self.fixtures
            .get(&id)
            .ok_or(LeagueError::NotFound(EntityKind::Match, id))
    }

    pub fn team_mut(&mut self, id: TeamId) -> Result<&mut Team, LeagueError> {
        self.teams
            .get_mut(&id)
            .ok_or(LeagueError::NotFound(EntityKind::Team, id))
    }

    pub fn fixture_mut(&mut self, id: FixtureId) -> Result<&mut Fixture, LeagueError> {
        self.fixtures
            .get_mut(&id)
            .ok_or(LeagueError::NotFound(EntityKind::Match, id))
    }

    // --- listings ------------------------------------------------------------

    pub fn leagues(&self) -> Vec<&League> {
        self.leagues.values().collect()
    }

    pub fn teams(&self) -> Vec<&Team> {
        self.teams.values().collect()
    }

    pub fn coaches(&self) -> Vec<&Coach> {
        self.coaches.values().collect()
    }

    pub fn players(&self) -> Vec<&Player> {
        self.players.values().collect()
    }

    pub fn fixtures(&self) -> Vec<&Fixture> {
        self.fixtures.values().collect()
    }

    /// Teams assigned to the given league (the league must exist).
    pub fn teams_in_league(&self, league_id: LeagueId) -> Result<Vec<&Team>, LeagueError> {
        self.league(league_id)?;
        Ok(self
            .teams
            .values()
            .filter(|t| t.league_id == Some(league_id))
            .collect())
    }

    /// Players on the given team's roster (the team must exist).
    pub fn players_in_team(&self, team_id: TeamId) -> Result<Vec<&Player>, LeagueError> {
        self.team(team_id)?;
        Ok(self
            .players
            .values()
            .filter(|p| p.team_id == Some(team_id))
            .collect())
    }

    // --- leagues -------------------------------------------------------------

    pub fn create_league(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<League, LeagueError> {
        let name = validate_name(name)?;
        let description = validate_limited("description", description, 400)?;
        self.next_league_id += 1;
        let league = League {
            id: self.next_league_id,
            name,
            description,
        };
        self.leagues.insert(league.id, league.clone());
        Ok(league)
    }

    pub fn update_league(
        &mut self,
        id: LeagueId,
        name: &str,
        description: Option<&str>,
    ) -> Result<League, LeagueError> {
        let name = validate_name(name)?;
        let description = validate_limited("description", description, 400)?;
        let league = self
            .leagues
            .get_mut(&id)
            .ok_or(LeagueError::NotFound(EntityKind::League, id))?;
        league.name = name;
        league.description = description;
        Ok(league.clone())
    }

    /// Delete a league. Teams and fixtures that pointed at it become
    /// league-less; they are not removed.
    pub fn delete_league(&mut self, id: LeagueId) -> Result<(), LeagueError> {
        self.league(id)?;
        self.leagues.remove(&id);
        for team in self.teams.values_mut() {
            if team.league_id == Some(id) {
                team.league_id = None;
            }
        }
        for fixture in self.fixtures.values_mut() {
            if fixture.league_id == Some(id) {
                fixture.league_id = None;
            }
        }
        Ok(())
    }

    // --- teams ---------------------------------------------------------------

    pub fn create_team(
        &mut self,
        name: &str,
        league_id: Option<LeagueId>,
        coach_id: Option<CoachId>,
    ) -> Result<Team, LeagueError> {
        let name = validate_name(name)?;
        if let Some(league_id) = league_id {
            self.league(league_id)?;
        }
        if let Some(coach_id) = coach_id {
            self.coach(coach_id)?;
            self.check_coach_free(coach_id, None)?;
        }
        self.next_team_id += 1;
        let team = Team {
            id: self.next_team_id,
            name,
            league_id,
            coach_id,
            wins: 0,
        };
        self.teams.insert(team.id, team.clone());
        Ok(team)
    }

    /// Update name and references. The win counter is derived state and is
    /// never touched by an update.
    pub fn update_team(
        &mut self,
        id: TeamId,
        name: &str,
        league_id: Option<LeagueId>,
        coach_id: Option<CoachId>,
    ) -> Result<Team, LeagueError> {
        let name = validate_name(name)?;
        self.team(id)?;
        if let Some(league_id) = league_id {
            self.league(league_id)?;
        }
        if let Some(coach_id) = coach_id {
            self.coach(coach_id)?;
            self.check_coach_free(coach_id, Some(id))?;
        }
        let team = self.team_mut(id)?;
        team.name = name;
        team.league_id = league_id;
        team.coach_id = coach_id;
        Ok(team.clone())
    }

    /// Delete a team. Its players become free agents; fixtures referencing the
    /// team are removed, since a fixture's team references are required.
    pub fn delete_team(&mut self, id: TeamId) -> Result<(), LeagueError> {
        self.team(id)?;
        self.teams.remove(&id);
        for player in self.players.values_mut() {
            if player.team_id == Some(id) {
                player.team_id = None;
            }
        }
        self.fixtures
            .retain(|_, fx| fx.home_team_id != id && fx.away_team_id != id);
        Ok(())
    }

    /// A coach may be assigned to at most one team.
    fn check_coach_free(
        &self,
        coach_id: CoachId,
        except_team: Option<TeamId>,
    ) -> Result<(), LeagueError> {
        let taken = self
            .teams
            .values()
            .find(|t| t.coach_id == Some(coach_id) && Some(t.id) != except_team);
        match taken {
            Some(team) => Err(LeagueError::CoachTaken {
                coach_id,
                team_id: team.id,
            }),
            None => Ok(()),
        }
    }

    // --- coaches -------------------------------------------------------------

    pub fn create_coach(
        &mut self,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Coach, LeagueError> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;
        let phone = validate_limited("phone", phone, 30)?;
        self.next_coach_id += 1;
        let coach = Coach {
            id: self.next_coach_id,
            name,
            email,
            phone,
        };
        self.coaches.insert(coach.id, coach.clone());
        Ok(coach)
    }

    pub fn update_coach(
        &mut self,
        id: CoachId,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Coach, LeagueError> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;
        let phone = validate_limited("phone", phone, 30)?;
        let coach = self
            .coaches
            .get_mut(&id)
            .ok_or(LeagueError::NotFound(EntityKind::Coach, id))?;
        coach.name = name;
        coach.email = email;
        coach.phone = phone;
        Ok(coach.clone())
    }

    /// Delete a coach; any team they coached is left without one.
    pub fn delete_coach(&mut self, id: CoachId) -> Result<(), LeagueError> {
        self.coach(id)?;
        self.coaches.remove(&id);
        for team in self.teams.values_mut() {
            if team.coach_id == Some(id) {
                team.coach_id = None;
            }
        }
        Ok(())
    }

    // --- players -------------------------------------------------------------

    pub fn create_player(
        &mut self,
        name: &str,
        age: u32,
        position: Option<&str>,
        team_id: Option<TeamId>,
    ) -> Result<Player, LeagueError> {
        let name = validate_name(name)?;
        validate_age(age)?;
        let position = validate_limited("position", position, 80)?;
        if let Some(team_id) = team_id {
            self.team(team_id)?;
        }
        self.next_player_id += 1;
        let player = Player {
            id: self.next_player_id,
            name,
            age,
            position,
            team_id,
        };
        self.players.insert(player.id, player.clone());
        Ok(player)
    }

    pub fn update_player(
        &mut self,
        id: PlayerId,
        name: &str,
        age: u32,
        position: Option<&str>,
        team_id: Option<TeamId>,
    ) -> Result<Player, LeagueError> {
        let name = validate_name(name)?;
        validate_age(age)?;
        let position = validate_limited("position", position, 80)?;
        self.player(id)?;
        if let Some(team_id) = team_id {
            self.team(team_id)?;
        }
        let player = self
            .players
            .get_mut(&id)
            .ok_or(LeagueError::NotFound(EntityKind::Player, id))?;
        player.name = name;
        player.age = age;
        player.position = position;
        player.team_id = team_id;
        Ok(player.clone())
    }

    pub fn delete_player(&mut self, id: PlayerId) -> Result<(), LeagueError> {
        self.player(id)?;
        self.players.remove(&id);
        Ok(())
    }

    // --- fixtures ------------------------------------------------------------

    /// Insert a new scheduled fixture. Validation lives in the match engine
    /// (`logic::fixtures::schedule_fixture`), the only caller.
    pub(crate) fn insert_fixture(
        &mut self,
        scheduled_at: DateTime<Utc>,
        league_id: Option<LeagueId>,
        home_team_id: TeamId,
        away_team_id: TeamId,
    ) -> Fixture {
        self.next_fixture_id += 1;
        let fixture = Fixture {
            id: self.next_fixture_id,
            scheduled_at,
            league_id,
            home_team_id,
            away_team_id,
            home_score: None,
            away_score: None,
            finalized: false,
        };
        self.fixtures.insert(fixture.id, fixture.clone());
        fixture
    }

    pub fn delete_fixture(&mut self, id: FixtureId) -> Result<(), LeagueError> {
        self.fixture(id)?;
        self.fixtures.remove(&id);
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, LeagueError> {
    let name = name.trim();
    let len = name.chars().count();
    if !(2..=140).contains(&len) {
        return Err(LeagueError::InvalidField {
            field: "name",
            reason: "must be 2-140 characters".to_string(),
        });
    }
    Ok(name.to_string())
}

/// Optional bounded text field; blank input counts as absent.
fn validate_limited(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, LeagueError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > max {
        return Err(LeagueError::InvalidField {
            field,
            reason: format!("must be at most {max} characters"),
        });
    }
    Ok(Some(value.to_string()))
}

fn validate_email(value: Option<&str>) -> Result<Option<String>, LeagueError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let looks_valid = matches!(
        value.split_once('@'),
        Some((local, domain))
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
    );
    if !looks_valid {
        return Err(LeagueError::InvalidField {
            field: "email",
            reason: "must be a valid address".to_string(),
        });
    }
    Ok(Some(value.to_string()))
}

fn validate_age(age: u32) -> Result<(), LeagueError> {
    if age < 1 {
        return Err(LeagueError::InvalidField {
            field: "age",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
