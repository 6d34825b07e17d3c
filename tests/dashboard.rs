use league_dash::dashboard::{Page, Selection, ViewBlock, render_error, render_page};
use league_dash::integrity::IntegrityPolicy;
use league_dash::matches::RawMatch;
use league_dash::pipeline::{Dataset, build_dataset};
use league_dash::teams::{RawTeam, SortDirection, TeamColumn};

fn team(id: i64, name: &str, rank: i64, market_value: f64, points: i64) -> RawTeam {
    RawTeam {
        team_id: id,
        team_name: name.to_string(),
        market_value,
        rank,
        team: name.to_string(),
        matches: 2,
        wins: 1,
        draws: 0,
        losses: 1,
        goals_for: 3,
        goals_against: 2,
        points,
        xg: 2.5,
        xga: 2.0,
        xpts: 2.8,
    }
}

fn game(id: i64, day: i64, home: i64, away: i64, score: Option<(i64, i64)>) -> RawMatch {
    RawMatch {
        match_id: id,
        matchday: day,
        home_team_id: home,
        away_team_id: away,
        home_score: score.map(|s| s.0),
        away_score: score.map(|s| s.1),
        played: score.is_some(),
    }
}

fn dataset() -> Dataset {
    let teams = vec![
        team(1, "Arsenal", 2, 900_000_000.0, 3),
        team(2, "Chelsea", 1, 800_000_000.0, 6),
        team(3, "Everton", 3, 300_000_000.0, 0),
    ];
    let matches = vec![
        game(1, 1, 1, 2, Some((2, 1))),
        game(2, 1, 3, 2, Some((0, 1))),
        game(3, 2, 2, 1, Some((1, 1))),
        game(4, 2, 1, 3, None),
    ];
    build_dataset(
        &teams,
        &matches,
        vec!["matches".to_string(), "teams".to_string()],
        IntegrityPolicy::Strict,
    )
    .expect("clean fixture")
}

fn selection(page: Page) -> Selection {
    Selection {
        page,
        ..Selection::default()
    }
}

#[test]
fn home_page_shows_headline_metrics() {
    let view = render_page(&selection(Page::Home), &dataset());
    let ViewBlock::Metrics(metrics) = &view.blocks[0] else {
        panic!("first block should be metrics");
    };
    let value = |label: &str| {
        metrics
            .iter()
            .find(|m| m.label == label)
            .map(|m| m.value.clone())
    };
    assert_eq!(value("Teams").as_deref(), Some("3"));
    assert_eq!(value("Matches played").as_deref(), Some("3/4"));
    assert_eq!(value("Goals").as_deref(), Some("6"));
    assert_eq!(value("Goals per match").as_deref(), Some("2.00"));
    assert_eq!(value("Leader").as_deref(), Some("Chelsea (6 pts)"));
}

#[test]
fn teams_page_follows_sort_selection() {
    let data = dataset();
    let default_view = render_page(&selection(Page::Teams), &data);
    let table = default_view.tables().next().expect("teams table");
    assert_eq!(table.headers.len(), 14);
    assert_eq!(table.headers[0], "Rank");
    let first_names: Vec<&str> = table.rows.iter().map(|r| r[2].as_str()).collect();
    assert_eq!(first_names, vec!["Chelsea", "Arsenal", "Everton"]);

    let by_value = Selection {
        page: Page::Teams,
        sort_column: TeamColumn::MarketValue,
        sort_direction: SortDirection::Descending,
        ..Selection::default()
    };
    let view = render_page(&by_value, &data);
    assert_eq!(view.title, "Teams | sorted by MarketValue DESC");
    let names: Vec<&str> = view.tables().next().unwrap().rows.iter().map(|r| r[2].as_str()).collect();
    assert_eq!(names, vec!["Arsenal", "Chelsea", "Everton"]);
    let bars = view.bars().next().expect("market value bars");
    assert_eq!(bars.bars[0], ("Arsenal".to_string(), 900));
}

#[test]
fn matches_page_filters_by_matchday() {
    let data = dataset();
    let all = render_page(&selection(Page::Matches), &data);
    assert_eq!(all.tables().next().unwrap().rows.len(), 4);

    let day_two = Selection {
        page: Page::Matches,
        matchday: Some(2),
        ..Selection::default()
    };
    let view = render_page(&day_two, &data);
    assert_eq!(view.title, "Matches | matchday 2");
    let rows = &view.tables().next().unwrap().rows;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][2], "Chelsea");
    assert_eq!(rows[0][7], "Draw");
    assert_eq!(rows[1][6], "No");
    assert_eq!(rows[1][7], "");
    let results = view.bars().next().unwrap();
    assert_eq!(results.bars[1], ("Draw".to_string(), 1));
}

#[test]
fn compare_page_defaults_to_top_two() {
    let view = render_page(&selection(Page::Compare), &dataset());
    assert_eq!(view.title, "Compare | Chelsea vs Arsenal");
    let tables: Vec<_> = view.tables().collect();
    assert_eq!(tables[0].title, "Comparison");
    assert_eq!(tables[1].title, "Head to head");
    assert_eq!(tables[1].rows.len(), 2);
}

#[test]
fn compare_page_reports_unknown_team() {
    let pick = Selection {
        page: Page::Compare,
        team_a: Some("Arsenal".to_string()),
        team_b: Some("Spurs".to_string()),
        ..Selection::default()
    };
    let view = render_page(&pick, &dataset());
    assert_eq!(view.texts().collect::<Vec<_>>(), vec!["Unknown team: Spurs"]);
}

#[test]
fn compare_without_meetings_says_so() {
    let teams = vec![
        team(1, "Arsenal", 1, 900_000_000.0, 3),
        team(2, "Chelsea", 2, 800_000_000.0, 0),
    ];
    let data = build_dataset(&teams, &[], Vec::new(), IntegrityPolicy::Strict).expect("clean");
    let view = render_page(&selection(Page::Compare), &data);
    assert!(view.texts().any(|t| t == "No head-to-head matches"));
    assert_eq!(view.tables().count(), 1);
}

#[test]
fn compare_needs_two_teams() {
    let teams = vec![team(1, "Arsenal", 1, 900_000_000.0, 3)];
    let data = build_dataset(&teams, &[], Vec::new(), IntegrityPolicy::Strict).expect("clean");
    let view = render_page(&selection(Page::Compare), &data);
    assert_eq!(
        view.texts().collect::<Vec<_>>(),
        vec!["Need at least two teams to compare"]
    );
}

#[test]
fn stats_and_database_pages_render() {
    let data = dataset();
    let stats = render_page(&selection(Page::Stats), &data);
    let summary = stats.tables().next().unwrap();
    assert_eq!(summary.rows.len(), 7);
    assert_eq!(summary.rows[3][1], "6.00 (Chelsea)");

    let db = render_page(&selection(Page::Database), &data);
    let tables = db.tables().next().unwrap();
    assert_eq!(tables.rows, vec![vec!["matches".to_string()], vec!["teams".to_string()]]);
}

#[test]
fn error_page_lists_causes_and_retry_hint() {
    let err = anyhow::anyhow!("connection refused").context("loading from postgres");
    let view = render_error(&err);
    assert_eq!(view.title, "Something went wrong");
    let texts: Vec<&str> = view.texts().collect();
    assert_eq!(texts[0], "Error: loading from postgres");
    assert_eq!(texts[1], "caused by: connection refused");
    assert_eq!(texts.last().copied(), Some("Press r to retry."));
}

#[test]
fn render_is_a_pure_function_of_inputs() {
    let data = dataset();
    for page in Page::ALL {
        let sel = selection(page);
        assert_eq!(render_page(&sel, &data), render_page(&sel, &data));
    }
}
