use league_dash::matches::{RawMatch, enrich_matches};
use league_dash::stats::{
    FormResult, Leader, compare_teams, describe, form_string, head_to_head, outcome_counts,
    points_vs_expected, summarize, team_form,
};
use league_dash::teams::{RawTeam, TeamColumn, normalize_teams};

fn team(id: i64, name: &str, rank: i64, points: i64, goals_against: i64, xpts: f64) -> RawTeam {
    RawTeam {
        team_id: id,
        team_name: name.to_string(),
        market_value: 100.0 * id as f64,
        rank,
        team: name.to_string(),
        matches: 3,
        wins: 1,
        draws: 1,
        losses: 1,
        goals_for: 4,
        goals_against,
        points,
        xg: 3.0,
        xga: 3.0,
        xpts,
    }
}

fn played(id: i64, day: i64, home: i64, away: i64, hs: i64, aws: i64) -> RawMatch {
    RawMatch {
        match_id: id,
        matchday: day,
        home_team_id: home,
        away_team_id: away,
        home_score: Some(hs),
        away_score: Some(aws),
        played: true,
    }
}

fn fixture() -> Vec<RawTeam> {
    vec![
        team(1, "Arsenal", 1, 7, 2, 5.5),
        team(2, "Chelsea", 2, 4, 5, 4.5),
        team(3, "Everton", 3, 4, 6, 3.0),
    ]
}

#[test]
fn summary_reports_max_min_and_mean() {
    let teams = normalize_teams(&fixture());
    let pts = summarize(&teams, TeamColumn::Points).expect("non-empty");
    assert_eq!(pts.max, 7.0);
    assert_eq!(pts.max_team, "Arsenal");
    assert_eq!(pts.min, 4.0);
    assert_eq!(pts.min_team, "Chelsea");
    assert_eq!(pts.mean, 5.0);
    assert_eq!(describe(&teams).len(), 7);
    assert!(summarize(&teams, TeamColumn::TeamName).is_none());
}

#[test]
fn outcome_distribution_counts_unplayed() {
    let teams = normalize_teams(&fixture());
    let mut raw = vec![
        played(1, 1, 1, 2, 2, 0),
        played(2, 1, 3, 1, 1, 1),
        played(3, 2, 2, 3, 0, 3),
    ];
    raw.push(RawMatch {
        match_id: 4,
        matchday: 3,
        home_team_id: 1,
        away_team_id: 3,
        home_score: None,
        away_score: None,
        played: false,
    });
    let matches = enrich_matches(&raw, &teams);
    let counts = outcome_counts(&matches);
    assert_eq!((counts.home, counts.draw, counts.away), (1, 1, 1));
    assert_eq!(counts.unplayed, 1);
    assert_eq!(counts.played(), 3);
}

#[test]
fn form_is_oldest_first_and_limited() {
    let teams = normalize_teams(&fixture());
    let raw = vec![
        played(3, 3, 1, 3, 0, 1),
        played(1, 1, 1, 2, 2, 0),
        played(2, 2, 3, 1, 1, 1),
    ];
    let matches = enrich_matches(&raw, &teams);
    let form = team_form(&matches, "Arsenal", 5);
    assert_eq!(form, vec![FormResult::Win, FormResult::Draw, FormResult::Loss]);
    assert_eq!(form_string(&team_form(&matches, "Arsenal", 2)), "DL");
    assert!(team_form(&matches, "Nobody", 5).is_empty());
}

#[test]
fn comparison_prefers_lower_rank_and_more_points() {
    let teams = normalize_teams(&fixture());
    let cmp = compare_teams(&teams, "Arsenal", "Chelsea").expect("both known");
    let leader = |column: TeamColumn| {
        cmp.rows
            .iter()
            .find(|r| r.column == column)
            .map(|r| r.leader)
    };
    assert_eq!(leader(TeamColumn::Rank), Some(Leader::A));
    assert_eq!(leader(TeamColumn::Points), Some(Leader::A));
    assert_eq!(leader(TeamColumn::GoalsAgainst), Some(Leader::A));
    assert_eq!(leader(TeamColumn::Wins), Some(Leader::Level));
    assert_eq!(leader(TeamColumn::TeamName), None);
    assert!(compare_teams(&teams, "Arsenal", "Nobody").is_none());
}

#[test]
fn head_to_head_covers_both_venues() {
    let teams = normalize_teams(&fixture());
    let raw = vec![
        played(1, 1, 1, 2, 2, 0),
        played(2, 2, 2, 1, 1, 1),
        played(3, 3, 1, 3, 0, 1),
    ];
    let matches = enrich_matches(&raw, &teams);
    let ids: Vec<i64> = head_to_head(&matches, "Arsenal", "Chelsea")
        .iter()
        .map(|m| m.match_id)
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn points_minus_expected_follows_table_order() {
    let teams = normalize_teams(&fixture());
    let diffs = points_vs_expected(&teams);
    assert_eq!(diffs[0], ("Arsenal".to_string(), 1.5));
    assert_eq!(diffs[2], ("Everton".to_string(), 1.0));
}
