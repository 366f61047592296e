//! Integration tests for the entity store: validation, references, deletion
//! policy.

use chrono::{TimeZone, Utc};
use sports_league_web::{
    record_result, schedule_fixture, EntityKind, LeagueError, LeagueStore,
};

#[test]
fn ids_are_sequential_per_entity() {
    let mut s = LeagueStore::new();
    assert_eq!(s.create_league("Premier", None).unwrap().id, 1);
    assert_eq!(s.create_league("Sunday", None).unwrap().id, 2);
    // Teams count on their own.
    assert_eq!(s.create_team("Foxes", None, None).unwrap().id, 1);
}

#[test]
fn names_are_trimmed_and_bounded() {
    let mut s = LeagueStore::new();
    let league = s.create_league("  Premier  ", None).unwrap();
    assert_eq!(league.name, "Premier");

    assert!(matches!(
        s.create_league("X", None),
        Err(LeagueError::InvalidField { field: "name", .. })
    ));
    let long = "x".repeat(141);
    assert!(matches!(
        s.create_league(&long, None),
        Err(LeagueError::InvalidField { field: "name", .. })
    ));
}

#[test]
fn league_description_is_bounded() {
    let mut s = LeagueStore::new();
    let long = "d".repeat(401);
    assert!(matches!(
        s.create_league("Premier", Some(long.as_str())),
        Err(LeagueError::InvalidField { field: "description", .. })
    ));
    // Blank descriptions collapse to none.
    let league = s.create_league("Premier", Some("   ")).unwrap();
    assert_eq!(league.description, None);
}

#[test]
fn coach_email_and_phone_are_validated() {
    let mut s = LeagueStore::new();
    assert!(matches!(
        s.create_coach("Pep", Some("not-an-address"), None),
        Err(LeagueError::InvalidField { field: "email", .. })
    ));
    let long_phone = "9".repeat(31);
    assert!(matches!(
        s.create_coach("Pep", None, Some(long_phone.as_str())),
        Err(LeagueError::InvalidField { field: "phone", .. })
    ));
    let coach = s
        .create_coach("Pep", Some("pep@example.com"), Some("555-0100"))
        .unwrap();
    assert_eq!(coach.email.as_deref(), Some("pep@example.com"));
}

#[test]
fn player_age_and_position_are_validated() {
    let mut s = LeagueStore::new();
    assert!(matches!(
        s.create_player("Kid", 0, None, None),
        Err(LeagueError::InvalidField { field: "age", .. })
    ));
    let long_position = "p".repeat(81);
    assert!(matches!(
        s.create_player("Ana", 21, Some(long_position.as_str()), None),
        Err(LeagueError::InvalidField { field: "position", .. })
    ));
}

#[test]
fn team_references_must_resolve() {
    let mut s = LeagueStore::new();
    assert_eq!(
        s.create_team("Foxes", Some(9), None),
        Err(LeagueError::NotFound(EntityKind::League, 9))
    );
    assert_eq!(
        s.create_team("Foxes", None, Some(4)),
        Err(LeagueError::NotFound(EntityKind::Coach, 4))
    );
}

#[test]
fn a_coach_runs_at_most_one_team() {
    let mut s = LeagueStore::new();
    let pep = s.create_coach("Pep", None, None).unwrap().id;
    let foxes = s.create_team("Foxes", None, Some(pep)).unwrap().id;

    assert_eq!(
        s.create_team("Owls", None, Some(pep)),
        Err(LeagueError::CoachTaken { coach_id: pep, team_id: foxes })
    );
    // Re-saving the same team with the same coach is fine.
    let updated = s.update_team(foxes, "Foxes FC", None, Some(pep)).unwrap();
    assert_eq!(updated.coach_id, Some(pep));
}

#[test]
fn team_update_preserves_the_win_counter() {
    let mut s = LeagueStore::new();
    let foxes = s.create_team("Foxes", None, None).unwrap().id;
    let owls = s.create_team("Owls", None, None).unwrap().id;
    let kickoff = Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap();
    let fx = schedule_fixture(&mut s, kickoff, None, foxes, owls).unwrap();
    record_result(&mut s, fx.id, 1, 0).unwrap();

    let updated = s.update_team(foxes, "Fierce Foxes", None, None).unwrap();
    assert_eq!(updated.wins, 1);
}

#[test]
fn deleting_a_league_detaches_teams_and_fixtures() {
    let mut s = LeagueStore::new();
    let league = s.create_league("Premier", None).unwrap().id;
    let foxes = s.create_team("Foxes", Some(league), None).unwrap().id;
    let owls = s.create_team("Owls", Some(league), None).unwrap().id;
    let kickoff = Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap();
    let fx = schedule_fixture(&mut s, kickoff, None, foxes, owls).unwrap();
    assert_eq!(fx.league_id, Some(league));

    s.delete_league(league).unwrap();
    assert_eq!(s.team(foxes).unwrap().league_id, None);
    assert_eq!(s.team(owls).unwrap().league_id, None);
    assert_eq!(s.fixture(fx.id).unwrap().league_id, None);
}

#[test]
fn deleting_a_team_frees_players_and_removes_its_fixtures() {
    let mut s = LeagueStore::new();
    let foxes = s.create_team("Foxes", None, None).unwrap().id;
    let owls = s.create_team("Owls", None, None).unwrap().id;
    let ana = s.create_player("Ana", 21, None, Some(foxes)).unwrap().id;
    let kickoff = Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap();
    let fx = schedule_fixture(&mut s, kickoff, None, foxes, owls).unwrap();

    s.delete_team(foxes).unwrap();
    assert_eq!(s.player(ana).unwrap().team_id, None);
    assert_eq!(
        s.fixture(fx.id).unwrap_err(),
        LeagueError::NotFound(EntityKind::Match, fx.id)
    );
    assert!(s.team(owls).is_ok());
}

#[test]
fn deleting_a_coach_leaves_the_team_coachless() {
    let mut s = LeagueStore::new();
    let pep = s.create_coach("Pep", None, None).unwrap().id;
    let foxes = s.create_team("Foxes", None, Some(pep)).unwrap().id;

    s.delete_coach(pep).unwrap();
    assert_eq!(s.team(foxes).unwrap().coach_id, None);
}

#[test]
fn scoped_listings_require_the_parent_to_exist() {
    let mut s = LeagueStore::new();
    assert_eq!(
        s.teams_in_league(3).unwrap_err(),
        LeagueError::NotFound(EntityKind::League, 3)
    );
    let league = s.create_league("Premier", None).unwrap().id;
    let foxes = s.create_team("Foxes", Some(league), None).unwrap().id;
    s.create_team("Free Rangers", None, None).unwrap();

    let in_league = s.teams_in_league(league).unwrap();
    assert_eq!(in_league.len(), 1);
    assert_eq!(in_league[0].id, foxes);

    assert_eq!(
        s.players_in_team(77).unwrap_err(),
        LeagueError::NotFound(EntityKind::Team, 77)
    );
}
