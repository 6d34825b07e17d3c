use std::path::PathBuf;

use league_dash::config::DataSource;
use league_dash::demo;
use league_dash::integrity::{IntegrityIssue, IntegrityPolicy, Side};
use league_dash::matches::{RawMatch, TeamRef};
use league_dash::pipeline::{PipelineError, build_dataset, load_dataset};
use league_dash::store::QueryExecutor;
use league_dash::teams::RawTeam;

fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "league_dash_pipeline_{name}_{}.sqlite",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn team(id: i64, name: &str, rank: i64) -> RawTeam {
    RawTeam {
        team_id: id,
        team_name: name.to_string(),
        market_value: 1.0,
        rank,
        team: name.to_string(),
        matches: 1,
        wins: 1,
        draws: 0,
        losses: 0,
        goals_for: 2,
        goals_against: 0,
        points: 3,
        xg: 1.5,
        xga: 0.4,
        xpts: 2.4,
    }
}

fn unmapped_match() -> RawMatch {
    RawMatch {
        match_id: 9,
        matchday: 1,
        home_team_id: 99,
        away_team_id: 2,
        home_score: Some(1),
        away_score: Some(0),
        played: true,
    }
}

#[test]
fn demo_database_loads_end_to_end() {
    let path = temp_db("demo");
    demo::seed(&path).expect("seed");
    let executor = QueryExecutor::new(DataSource::Sqlite(path.clone()));

    let data = load_dataset(&executor, IntegrityPolicy::Strict).expect("load");
    assert_eq!(data.teams.len(), 6);
    assert_eq!(data.teams.rows[0].team_name, "Liverpool");
    assert_eq!(data.matches.len(), 15);
    assert!(data.issues.is_empty());
    assert_eq!(data.tables.len(), 2);
    assert_eq!(data.matches.matchdays(), vec![1, 2, 3, 4, 5]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_database_surfaces_store_error() {
    let executor = QueryExecutor::new(DataSource::Sqlite(temp_db("absent")));
    let err = load_dataset(&executor, IntegrityPolicy::PassThrough).unwrap_err();
    assert!(matches!(err, PipelineError::Store(_)), "{err}");
}

#[test]
fn pass_through_keeps_unmapped_id_and_records_issue() {
    let teams = [team(1, "Arsenal", 1), team(2, "Chelsea", 2)];
    let data = build_dataset(
        &teams,
        &[unmapped_match()],
        Vec::new(),
        IntegrityPolicy::PassThrough,
    )
    .expect("pass-through never rejects");
    assert_eq!(data.matches.rows[0].home_team, TeamRef::Unmapped(99));
    assert_eq!(
        data.issues,
        vec![IntegrityIssue::UnmappedTeam {
            match_id: 9,
            side: Side::Home,
            team_id: 99,
        }]
    );
}

#[test]
fn strict_policy_rejects_unmapped_id() {
    let teams = [team(1, "Arsenal", 1), team(2, "Chelsea", 2)];
    let err = build_dataset(&teams, &[unmapped_match()], Vec::new(), IntegrityPolicy::Strict)
        .unwrap_err();
    match err {
        PipelineError::Integrity(inner) => {
            assert_eq!(inner.issues.len(), 1);
            assert!(inner.to_string().contains("team id 99"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn strict_policy_rejects_duplicate_rank() {
    let teams = [team(1, "Arsenal", 1), team(2, "Chelsea", 1)];
    let err = build_dataset(&teams, &[], Vec::new(), IntegrityPolicy::Strict).unwrap_err();
    let PipelineError::Integrity(inner) = err else {
        panic!("expected integrity error");
    };
    assert!(inner.issues.contains(&IntegrityIssue::DuplicateRank {
        rank: 1,
        teams: vec!["Arsenal".to_string(), "Chelsea".to_string()],
    }));
}

#[test]
fn empty_tables_build_an_empty_dataset() {
    let data = build_dataset(&[], &[], Vec::new(), IntegrityPolicy::Strict).expect("build");
    assert!(data.teams.is_empty());
    assert!(data.matches.is_empty());
}
