//! Page rendering as plain data.
//!
//! `render_page` turns the current UI selection and a freshly loaded dataset
//! into a `PageView`. The terminal front end only draws what it is given.

use serde::{Deserialize, Serialize};

use crate::matches::EnrichedMatch;
use crate::pipeline::Dataset;
use crate::stats::{self, Leader};
use crate::teams::{SortDirection, TeamColumn, sort_teams};

const FORM_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    Home,
    Teams,
    Matches,
    Compare,
    Stats,
    Database,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Home,
        Page::Teams,
        Page::Matches,
        Page::Compare,
        Page::Stats,
        Page::Database,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Teams => "Teams",
            Page::Matches => "Matches",
            Page::Compare => "Compare",
            Page::Stats => "Stats",
            Page::Database => "Database",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Everything the presentation layer feeds back into a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub page: Page,
    pub sort_column: TeamColumn,
    pub sort_direction: SortDirection,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub matchday: Option<i64>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            page: Page::Home,
            sort_column: TeamColumn::Rank,
            sort_direction: SortDirection::Ascending,
            team_a: None,
            team_b: None,
            matchday: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub title: String,
    pub blocks: Vec<ViewBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewBlock {
    Text(String),
    Metrics(Vec<Metric>),
    Table(TableView),
    Bars(BarsView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Bar values are pre-scaled integers in `unit` and may be negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarsView {
    pub title: String,
    pub bars: Vec<(String, i64)>,
    pub unit: String,
}

impl PageView {
    pub fn tables(&self) -> impl Iterator<Item = &TableView> {
        self.blocks.iter().filter_map(|b| match b {
            ViewBlock::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn bars(&self) -> impl Iterator<Item = &BarsView> {
        self.blocks.iter().filter_map(|b| match b {
            ViewBlock::Bars(b) => Some(b),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            ViewBlock::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }
}

pub fn render_page(selection: &Selection, data: &Dataset) -> PageView {
    match selection.page {
        Page::Home => render_home(data),
        Page::Teams => render_teams(selection, data),
        Page::Matches => render_matches(selection, data),
        Page::Compare => render_compare(selection, data),
        Page::Stats => render_stats(data),
        Page::Database => render_database(data),
    }
}

/// The page shown when loading the dataset failed.
pub fn render_error(err: &anyhow::Error) -> PageView {
    let mut blocks = vec![ViewBlock::Text(format!("Error: {err}"))];
    for cause in err.chain().skip(1) {
        blocks.push(ViewBlock::Text(format!("caused by: {cause}")));
    }
    blocks.push(ViewBlock::Text("Press r to retry.".to_string()));
    PageView {
        title: "Something went wrong".to_string(),
        blocks,
    }
}

fn render_home(data: &Dataset) -> PageView {
    let counts = stats::outcome_counts(&data.matches);
    let goals: i64 = data
        .matches
        .played()
        .map(|m| m.home_score.unwrap_or(0) + m.away_score.unwrap_or(0))
        .sum();
    let leader = data
        .teams
        .rows
        .first()
        .map(|t| format!("{} ({} pts)", t.team_name, t.points))
        .unwrap_or_else(|| "-".to_string());
    let avg_goals = if counts.played() == 0 {
        "-".to_string()
    } else {
        format!("{:.2}", goals as f64 / counts.played() as f64)
    };

    let mut blocks = vec![
        ViewBlock::Metrics(vec![
            metric("Teams", data.teams.len().to_string()),
            metric(
                "Matches played",
                format!("{}/{}", counts.played(), data.matches.len()),
            ),
            metric("Goals", goals.to_string()),
            metric("Goals per match", avg_goals),
            metric("Leader", leader),
        ]),
        ViewBlock::Text(format!(
            "Loaded {}",
            data.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
    ];
    if !data.issues.is_empty() {
        blocks.push(ViewBlock::Text(format!(
            "{} data issue(s); see console",
            data.issues.len()
        )));
    }

    PageView {
        title: "League overview".to_string(),
        blocks,
    }
}

fn render_teams(selection: &Selection, data: &Dataset) -> PageView {
    let sorted = sort_teams(&data.teams, selection.sort_column, selection.sort_direction);

    let headers = TeamColumn::ALL.iter().map(|c| c.label().to_string()).collect();
    let rows = sorted
        .iter()
        .map(|team| TeamColumn::ALL.iter().map(|c| c.display(team)).collect())
        .collect();

    let bars = sorted
        .iter()
        .map(|t| (t.team_name.clone(), (t.market_value / 1_000_000.0).round() as i64))
        .collect();

    PageView {
        title: format!(
            "Teams | sorted by {} {}",
            selection.sort_column.label(),
            selection.sort_direction.label()
        ),
        blocks: vec![
            ViewBlock::Table(TableView {
                title: "Teams".to_string(),
                headers,
                rows,
            }),
            ViewBlock::Bars(BarsView {
                title: "Market value".to_string(),
                bars,
                unit: "m".to_string(),
            }),
        ],
    }
}

const MATCH_HEADERS: [&str; 8] = [
    "matchId",
    "matchday",
    "homeTeamId",
    "awayTeamId",
    "homeScore",
    "awayScore",
    "played",
    "outcome",
];

fn match_row(m: &EnrichedMatch) -> Vec<String> {
    vec![
        m.match_id.to_string(),
        m.matchday.to_string(),
        m.home_team.to_string(),
        m.away_team.to_string(),
        opt_to_string(m.home_score),
        opt_to_string(m.away_score),
        m.played.label().to_string(),
        m.outcome.map(|o| o.label().to_string()).unwrap_or_default(),
    ]
}

fn match_table(title: impl Into<String>, rows: Vec<Vec<String>>) -> TableView {
    TableView {
        title: title.into(),
        headers: MATCH_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

fn render_matches(selection: &Selection, data: &Dataset) -> PageView {
    let visible: Vec<&EnrichedMatch> = data
        .matches
        .iter()
        .filter(|m| selection.matchday.is_none_or(|day| m.matchday == day))
        .collect();
    let counts = stats::outcome_counts(visible.iter().copied());

    let scope = match selection.matchday {
        Some(day) => format!("matchday {day}"),
        None => "all matchdays".to_string(),
    };

    PageView {
        title: format!("Matches | {scope}"),
        blocks: vec![
            ViewBlock::Table(match_table(
                "Matches",
                visible.iter().map(|m| match_row(m)).collect(),
            )),
            ViewBlock::Bars(BarsView {
                title: "Results".to_string(),
                bars: vec![
                    ("Home".to_string(), counts.home as i64),
                    ("Draw".to_string(), counts.draw as i64),
                    ("Away".to_string(), counts.away as i64),
                ],
                unit: String::new(),
            }),
        ],
    }
}

fn render_compare(selection: &Selection, data: &Dataset) -> PageView {
    let names = data.teams.names();
    let a = selection
        .team_a
        .clone()
        .or_else(|| names.first().map(|n| n.to_string()));
    let b = selection
        .team_b
        .clone()
        .or_else(|| names.get(1).map(|n| n.to_string()));

    let (Some(a), Some(b)) = (a, b) else {
        return PageView {
            title: "Compare".to_string(),
            blocks: vec![ViewBlock::Text(
                "Need at least two teams to compare".to_string(),
            )],
        };
    };

    let Some(cmp) = stats::compare_teams(&data.teams, &a, &b) else {
        let missing = if data.teams.by_name(&a).is_none() { &a } else { &b };
        return PageView {
            title: format!("Compare | {a} vs {b}"),
            blocks: vec![ViewBlock::Text(format!("Unknown team: {missing}"))],
        };
    };

    let rows = cmp
        .rows
        .iter()
        .map(|row| {
            let leader = match row.leader {
                Leader::A => a.clone(),
                Leader::B => b.clone(),
                Leader::Level => "=".to_string(),
            };
            vec![row.column.label().to_string(), row.a.clone(), row.b.clone(), leader]
        })
        .collect();

    let form_a = stats::form_string(&stats::team_form(&data.matches, &a, FORM_LENGTH));
    let form_b = stats::form_string(&stats::team_form(&data.matches, &b, FORM_LENGTH));
    let h2h: Vec<Vec<String>> = stats::head_to_head(&data.matches, &a, &b)
        .into_iter()
        .map(match_row)
        .collect();

    let mut blocks = vec![
        ViewBlock::Table(TableView {
            title: "Comparison".to_string(),
            headers: vec![
                "Stat".to_string(),
                a.clone(),
                b.clone(),
                "Better".to_string(),
            ],
            rows,
        }),
        ViewBlock::Metrics(vec![
            metric(&format!("{a} form"), or_dash(form_a)),
            metric(&format!("{b} form"), or_dash(form_b)),
        ]),
    ];
    if h2h.is_empty() {
        blocks.push(ViewBlock::Text("No head-to-head matches".to_string()));
    } else {
        blocks.push(ViewBlock::Table(match_table("Head to head", h2h)));
    }

    PageView {
        title: format!("Compare | {a} vs {b}"),
        blocks,
    }
}

fn render_stats(data: &Dataset) -> PageView {
    let rows = stats::describe(&data.teams)
        .into_iter()
        .map(|s| {
            vec![
                s.column.label().to_string(),
                format!("{} ({})", format_stat(s.max), s.max_team),
                format!("{} ({})", format_stat(s.min), s.min_team),
                format_stat(s.mean),
            ]
        })
        .collect();

    let bars = stats::points_vs_expected(&data.teams)
        .into_iter()
        .map(|(name, diff)| (name, (diff * 10.0).round() as i64))
        .collect();

    PageView {
        title: "Stats".to_string(),
        blocks: vec![
            ViewBlock::Table(TableView {
                title: "Summary".to_string(),
                headers: ["Column", "Max", "Min", "Mean"]
                    .iter()
                    .map(|h| h.to_string())
                    .collect(),
                rows,
            }),
            ViewBlock::Bars(BarsView {
                title: "PTS - xPTS".to_string(),
                bars,
                unit: "x0.1".to_string(),
            }),
        ],
    }
}

fn render_database(data: &Dataset) -> PageView {
    let rows = data.tables.iter().map(|t| vec![t.clone()]).collect();
    PageView {
        title: "Database".to_string(),
        blocks: vec![ViewBlock::Table(TableView {
            title: "Base tables".to_string(),
            headers: vec!["table_name".to_string()],
            rows,
        })],
    }
}

fn metric(label: &str, value: String) -> Metric {
    Metric {
        label: label.to_string(),
        value,
    }
}

fn opt_to_string(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn or_dash(value: String) -> String {
    if value.is_empty() { "-".to_string() } else { value }
}

/// Large values (market value) print without decimals.
pub fn format_stat(value: f64) -> String {
    if value.abs() >= 10_000.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_cycle_wraps() {
        assert_eq!(Page::Database.next(), Page::Home);
        assert_eq!(Page::Home.next(), Page::Teams);
    }

    #[test]
    fn format_stat_switches_precision() {
        assert_eq!(format_stat(900_000_000.0), "900000000");
        assert_eq!(format_stat(18.2), "18.20");
    }
}
