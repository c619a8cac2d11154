//! Storage tests through the public API, against file-backed databases

use cricbuzz_stats::{
    config::DatabaseConfig,
    storage::{
        BattingStat, CricketDatabase, DeleteMode, Match, NewPlayer, PlayerFilter, PlayerUpdate,
        Team,
    },
    CricketError, MatchId, MatchStatus, PlayerId, PlayerRole, TeamId,
};
use std::time::Duration;

fn file_config(dir: &tempfile::TempDir, pool_size: u32) -> DatabaseConfig {
    DatabaseConfig {
        path: dir.path().join("nested").join("cricket.db"),
        pool_size,
        acquire_timeout: Duration::from_secs(2),
        busy_timeout: Duration::from_secs(2),
    }
}

fn india() -> Team {
    Team {
        id: TeamId::new(2),
        name: "India".to_string(),
        short_name: Some("IND".to_string()),
        country: Some("India".to_string()),
    }
}

fn odi(status: MatchStatus) -> Match {
    Match {
        id: MatchId::new(100238),
        series_id: None,
        team1_id: TeamId::new(2),
        team2_id: TeamId::new(4),
        venue_id: None,
        status,
        format: Some("ODI".to_string()),
        start_time: None,
        description: Some("1st ODI".to_string()),
        winner_id: None,
        win_margin: None,
        victory_type: None,
        toss_winner_id: None,
        toss_decision: None,
    }
}

fn seed_match(db: &CricketDatabase) {
    db.upsert_team(&india()).unwrap();
    db.upsert_team(&Team {
        id: TeamId::new(4),
        name: "Australia".to_string(),
        short_name: Some("AUS".to_string()),
        country: Some("Australia".to_string()),
    })
    .unwrap();
    db.upsert_match(&odi(MatchStatus::Live)).unwrap();
}

fn knock(player_id: PlayerId, runs: i64) -> BattingStat {
    BattingStat {
        match_id: MatchId::new(100238),
        player_id,
        innings_no: 1,
        team_id: Some(TeamId::new(2)),
        runs,
        balls: 60,
        fours: 5,
        sixes: 1,
        strike_rate: None,
        batting_pos: Some(3),
        is_out: Some(false),
    }
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir, 2);

    let id = {
        let db = CricketDatabase::open(&config).unwrap();
        db.upsert_team(&india()).unwrap();
        db.create_player(&NewPlayer {
            name: "Shubman Gill".to_string(),
            team_id: Some(TeamId::new(2)),
            role: Some(PlayerRole::Batsman),
            batting_style: Some("Right-hand bat".to_string()),
            ..NewPlayer::default()
        })
        .unwrap()
        .id
    };

    let db = CricketDatabase::open(&config).unwrap();
    let player = db.get_player(id).unwrap();
    assert_eq!(player.name, "Shubman Gill");
    assert_eq!(player.team_id, Some(TeamId::new(2)));
    assert_eq!(player.country, None);
    assert_eq!(db.health().unwrap().players, 1);
}

#[test]
fn test_player_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let db = CricketDatabase::open(&file_config(&dir, 2)).unwrap();
    db.upsert_team(&india()).unwrap();

    let created = db
        .create_player(&NewPlayer {
            name: "  Jasprit Bumrah ".to_string(),
            team_id: Some(TeamId::new(2)),
            role: Some(PlayerRole::Bowler),
            country: Some("India".to_string()),
            ..NewPlayer::default()
        })
        .unwrap();
    assert_eq!(created.name, "Jasprit Bumrah");
    assert_eq!(db.get_player(created.id).unwrap(), created);

    let dup = db.create_player(&NewPlayer {
        name: "jasprit bumrah".to_string(),
        team_id: Some(TeamId::new(2)),
        role: Some(PlayerRole::Bowler),
        ..NewPlayer::default()
    });
    assert!(matches!(dup, Err(CricketError::AlreadyExists { .. })));

    let updated = db
        .update_player(
            created.id,
            &PlayerUpdate {
                bowling_style: Some(Some("Right-arm fast".to_string())),
                country: Some(None),
                ..PlayerUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.bowling_style.as_deref(), Some("Right-arm fast"));
    assert_eq!(updated.country, None);
    assert_eq!(updated.role, Some(PlayerRole::Bowler));

    let bowlers = db
        .list_players(&PlayerFilter {
            role: Some(PlayerRole::Bowler),
            ..PlayerFilter::default()
        })
        .unwrap();
    assert_eq!(bowlers.len(), 1);

    db.delete_player(created.id, DeleteMode::Restrict).unwrap();
    assert!(matches!(
        db.get_player(created.id),
        Err(CricketError::NotFound { entity: "player", .. })
    ));
}

#[test]
fn test_delete_guard_and_cascade() {
    let dir = tempfile::tempdir().unwrap();
    let db = CricketDatabase::open(&file_config(&dir, 2)).unwrap();
    seed_match(&db);
    let kohli = PlayerId::new(1413);
    db.ensure_player(kohli, "Virat Kohli", Some(TeamId::new(2)))
        .unwrap();
    db.record_batting(&knock(kohli, 74)).unwrap();

    let err = db.delete_player(kohli, DeleteMode::Restrict).unwrap_err();
    assert!(matches!(
        err,
        CricketError::ForeignKeyViolation { dependents: 1, .. }
    ));
    assert!(db.get_player(kohli).is_ok());
    assert_eq!(db.batting_for_match(MatchId::new(100238)).unwrap().len(), 1);

    db.delete_player(kohli, DeleteMode::Cascade).unwrap();
    assert!(db.get_player(kohli).is_err());
    assert!(db.batting_for_match(MatchId::new(100238)).unwrap().is_empty());
}

#[test]
fn test_completed_match_locks_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = CricketDatabase::open(&file_config(&dir, 2)).unwrap();
    seed_match(&db);
    let kohli = PlayerId::new(1413);
    let gill = PlayerId::new(9428);
    db.ensure_player(kohli, "Virat Kohli", None).unwrap();
    db.ensure_player(gill, "Shubman Gill", None).unwrap();
    db.record_batting(&knock(kohli, 40)).unwrap();

    db.update_match_status(MatchId::new(100238), MatchStatus::Completed)
        .unwrap();

    let err = db.record_batting(&knock(kohli, 74)).unwrap_err();
    assert!(matches!(err, CricketError::RecordLocked { match_id: 100238 }));
    db.record_batting(&knock(gill, 12)).unwrap();

    let err = db
        .update_match_status(MatchId::new(100238), MatchStatus::Live)
        .unwrap_err();
    assert!(matches!(err, CricketError::InvalidTransition { .. }));

    // a late upsert from a stale match list does not reopen the match
    let stored = db.upsert_match(&odi(MatchStatus::Live)).unwrap();
    assert_eq!(stored, MatchStatus::Completed);
}

#[test]
fn test_pool_serves_threads() {
    let dir = tempfile::tempdir().unwrap();
    let db = CricketDatabase::open(&file_config(&dir, 3)).unwrap();
    db.upsert_team(&india()).unwrap();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let db = db.clone();
            std::thread::spawn(move || {
                db.ensure_player(PlayerId::new(1000 + i), &format!("Player {i}"), None)
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert_eq!(db.list_players(&PlayerFilter::default()).unwrap().len(), 6);
}

#[tokio::test]
async fn test_call_runs_off_the_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let db = CricketDatabase::open(&file_config(&dir, 2)).unwrap();

    let teams = db
        .call(Duration::from_secs(5), |db| {
            db.upsert_team(&india())?;
            db.list_teams()
        })
        .await
        .unwrap();

    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].short_name.as_deref(), Some("IND"));
}
