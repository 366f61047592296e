//! Integration tests for the match engine: scheduling and result recording.

use chrono::{DateTime, TimeZone, Utc};
use sports_league_web::{record_result, schedule_fixture, EntityKind, LeagueError, LeagueStore};

fn kickoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap()
}

/// Two teams with no league assignment.
fn store_with_two_teams() -> (LeagueStore, u64, u64) {
    let mut s = LeagueStore::new();
    let home = s.create_team("Foxes", None, None).unwrap().id;
    let away = s.create_team("Owls", None, None).unwrap().id;
    (s, home, away)
}

#[test]
fn same_team_on_both_sides_is_rejected() {
    let (mut s, home, _) = store_with_two_teams();
    assert_eq!(
        schedule_fixture(&mut s, kickoff(), None, home, home),
        Err(LeagueError::SameTeam)
    );
}

#[test]
fn unknown_team_is_rejected() {
    let (mut s, home, _) = store_with_two_teams();
    assert_eq!(
        schedule_fixture(&mut s, kickoff(), None, home, 99),
        Err(LeagueError::NotFound(EntityKind::Team, 99))
    );
    assert_eq!(
        schedule_fixture(&mut s, kickoff(), None, 98, home),
        Err(LeagueError::NotFound(EntityKind::Team, 98))
    );
}

#[test]
fn unknown_league_is_rejected() {
    let (mut s, home, away) = store_with_two_teams();
    assert_eq!(
        schedule_fixture(&mut s, kickoff(), Some(7), home, away),
        Err(LeagueError::NotFound(EntityKind::League, 7))
    );
}

#[test]
fn league_defaults_to_home_teams_league() {
    let mut s = LeagueStore::new();
    let league = s.create_league("Premier", None).unwrap().id;
    let home = s.create_team("Foxes", Some(league), None).unwrap().id;
    let away = s.create_team("Owls", None, None).unwrap().id;

    let fx = schedule_fixture(&mut s, kickoff(), None, home, away).unwrap();
    assert_eq!(fx.league_id, Some(league));
    assert!(!fx.finalized);
    assert_eq!(fx.home_score, None);
    assert_eq!(fx.away_score, None);
}

#[test]
fn no_league_anywhere_leaves_fixture_unassigned() {
    let (mut s, home, away) = store_with_two_teams();
    let fx = schedule_fixture(&mut s, kickoff(), None, home, away).unwrap();
    assert_eq!(fx.league_id, None);
}

#[test]
fn home_team_from_other_league_is_rejected() {
    let mut s = LeagueStore::new();
    let premier = s.create_league("Premier", None).unwrap().id;
    let sunday = s.create_league("Sunday", None).unwrap().id;
    let home = s.create_team("Foxes", Some(sunday), None).unwrap().id;
    let away = s.create_team("Owls", None, None).unwrap().id;

    assert_eq!(
        schedule_fixture(&mut s, kickoff(), Some(premier), home, away),
        Err(LeagueError::WrongLeague { side: "home" })
    );
}

#[test]
fn away_team_from_other_league_is_rejected() {
    let mut s = LeagueStore::new();
    let premier = s.create_league("Premier", None).unwrap().id;
    let sunday = s.create_league("Sunday", None).unwrap().id;
    let home = s.create_team("Foxes", Some(premier), None).unwrap().id;
    let away = s.create_team("Owls", Some(sunday), None).unwrap().id;

    // Explicit league and defaulted-from-home league both trip the away check.
    assert_eq!(
        schedule_fixture(&mut s, kickoff(), Some(premier), home, away),
        Err(LeagueError::WrongLeague { side: "away" })
    );
    assert_eq!(
        schedule_fixture(&mut s, kickoff(), None, home, away),
        Err(LeagueError::WrongLeague { side: "away" })
    );
}

#[test]
fn unassigned_teams_may_play_in_any_league() {
    let mut s = LeagueStore::new();
    let premier = s.create_league("Premier", None).unwrap().id;
    let home = s.create_team("Foxes", None, None).unwrap().id;
    let away = s.create_team("Owls", None, None).unwrap().id;

    let fx = schedule_fixture(&mut s, kickoff(), Some(premier), home, away).unwrap();
    assert_eq!(fx.league_id, Some(premier));
}

#[test]
fn recording_a_result_credits_the_winner_only() {
    let (mut s, home, away) = store_with_two_teams();
    let fx = schedule_fixture(&mut s, kickoff(), None, home, away).unwrap();

    let fx = record_result(&mut s, fx.id, 3, 1).unwrap();
    assert!(fx.finalized);
    assert_eq!(fx.home_score, Some(3));
    assert_eq!(fx.away_score, Some(1));
    assert_eq!(s.team(home).unwrap().wins, 1);
    assert_eq!(s.team(away).unwrap().wins, 0);
}

#[test]
fn away_win_credits_the_away_team() {
    let (mut s, home, away) = store_with_two_teams();
    let fx = schedule_fixture(&mut s, kickoff(), None, home, away).unwrap();

    record_result(&mut s, fx.id, 0, 2).unwrap();
    assert_eq!(s.team(home).unwrap().wins, 0);
    assert_eq!(s.team(away).unwrap().wins, 1);
}

#[test]
fn draw_credits_nobody() {
    let (mut s, home, away) = store_with_two_teams();
    let fx = schedule_fixture(&mut s, kickoff(), None, home, away).unwrap();

    let fx = record_result(&mut s, fx.id, 2, 2).unwrap();
    assert!(fx.finalized);
    assert_eq!(s.team(home).unwrap().wins, 0);
    assert_eq!(s.team(away).unwrap().wins, 0);
}

#[test]
fn second_result_is_a_conflict_and_counters_stay_put() {
    let (mut s, home, away) = store_with_two_teams();
    let fx = schedule_fixture(&mut s, kickoff(), None, home, away).unwrap();

    record_result(&mut s, fx.id, 3, 1).unwrap();
    assert_eq!(
        record_result(&mut s, fx.id, 5, 0),
        Err(LeagueError::AlreadyFinalized(fx.id))
    );
    // No double-count, no overwritten score.
    assert_eq!(s.team(home).unwrap().wins, 1);
    assert_eq!(s.fixture(fx.id).unwrap().home_score, Some(3));
}

#[test]
fn negative_scores_are_rejected_without_side_effects() {
    let (mut s, home, away) = store_with_two_teams();
    let fx = schedule_fixture(&mut s, kickoff(), None, home, away).unwrap();

    assert_eq!(
        record_result(&mut s, fx.id, -1, 0),
        Err(LeagueError::NegativeScore)
    );
    assert_eq!(
        record_result(&mut s, fx.id, 2, -3),
        Err(LeagueError::NegativeScore)
    );
    let stored = s.fixture(fx.id).unwrap();
    assert!(!stored.finalized);
    assert_eq!(stored.home_score, None);
    assert_eq!(s.team(home).unwrap().wins, 0);
    assert_eq!(s.team(away).unwrap().wins, 0);
}

#[test]
fn scores_beyond_u32_are_rejected_without_truncation() {
    let (mut s, home, away) = store_with_two_teams();
    let fx = schedule_fixture(&mut s, kickoff(), None, home, away).unwrap();

    // A score past the stored width must fail, not wrap into a bogus
    // scoreline with the wrong side credited.
    let too_big = (u32::MAX as i64) + 1;
    assert!(matches!(
        record_result(&mut s, fx.id, too_big, 1),
        Err(LeagueError::InvalidField { field: "score", .. })
    ));
    assert!(matches!(
        record_result(&mut s, fx.id, 0, too_big),
        Err(LeagueError::InvalidField { field: "score", .. })
    ));
    let stored = s.fixture(fx.id).unwrap();
    assert!(!stored.finalized);
    assert_eq!(stored.home_score, None);
    assert_eq!(stored.away_score, None);
    assert_eq!(s.team(home).unwrap().wins, 0);
    assert_eq!(s.team(away).unwrap().wins, 0);

    // The top of the range itself is still a valid score.
    let fx = record_result(&mut s, fx.id, u32::MAX as i64, 1).unwrap();
    assert_eq!(fx.home_score, Some(u32::MAX));
    assert_eq!(s.team(home).unwrap().wins, 1);
}

#[test]
fn unknown_fixture_is_not_found() {
    let mut s = LeagueStore::new();
    assert_eq!(
        record_result(&mut s, 42, 1, 0),
        Err(LeagueError::NotFound(EntityKind::Match, 42))
    );
}

#[test]
fn concurrent_finalizations_lose_no_wins() {
    use std::sync::{Arc, RwLock};

    let mut s = LeagueStore::new();
    let favorite = s.create_team("Foxes", None, None).unwrap().id;
    let mut fixture_ids = Vec::new();
    for i in 0..8 {
        let rival = s.create_team(format!("Rival {i}").as_str(), None, None).unwrap().id;
        let fx = schedule_fixture(&mut s, kickoff(), None, favorite, rival).unwrap();
        fixture_ids.push(fx.id);
    }

    // Every finalization credits the same team; the write lock is the
    // transaction, so all eight increments must land.
    let store = Arc::new(RwLock::new(s));
    let handles: Vec<_> = fixture_ids
        .into_iter()
        .map(|fixture_id| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let mut g = store.write().unwrap();
                record_result(&mut g, fixture_id, 2, 0).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.read().unwrap().team(favorite).unwrap().wins, 8);
}
