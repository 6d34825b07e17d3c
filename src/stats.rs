use serde::Serialize;

use crate::matches::{EnrichedMatch, MatchTable, Outcome, Played};
use crate::teams::{Team, TeamColumn, TeamTable};

/// Columns shown on the stats page.
pub const DESCRIBED_COLUMNS: [TeamColumn; 7] = [
    TeamColumn::MarketValue,
    TeamColumn::GoalsFor,
    TeamColumn::GoalsAgainst,
    TeamColumn::Points,
    TeamColumn::Xg,
    TeamColumn::Xga,
    TeamColumn::Xpts,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: TeamColumn,
    pub max: f64,
    pub max_team: String,
    pub min: f64,
    pub min_team: String,
    pub mean: f64,
}

/// Max/min/mean of one numeric column. The first team in table order wins
/// ties for max and min.
pub fn summarize(teams: &TeamTable, column: TeamColumn) -> Option<ColumnSummary> {
    let mut iter = teams
        .iter()
        .filter_map(|t| column.numeric(t).map(|v| (v, t)));
    let (first, first_team) = iter.next()?;

    let mut max = (first, first_team);
    let mut min = (first, first_team);
    let mut sum = first;
    let mut n = 1usize;
    for (v, team) in iter {
        if v > max.0 {
            max = (v, team);
        }
        if v < min.0 {
            min = (v, team);
        }
        sum += v;
        n += 1;
    }

    Some(ColumnSummary {
        column,
        max: max.0,
        max_team: max.1.team_name.clone(),
        min: min.0,
        min_team: min.1.team_name.clone(),
        mean: sum / n as f64,
    })
}

pub fn describe(teams: &TeamTable) -> Vec<ColumnSummary> {
    DESCRIBED_COLUMNS
        .iter()
        .filter_map(|column| summarize(teams, *column))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub home: usize,
    pub away: usize,
    pub draw: usize,
    pub unplayed: usize,
}

impl OutcomeCounts {
    pub fn played(&self) -> usize {
        self.home + self.away + self.draw
    }
}

pub fn outcome_counts<'a>(matches: impl IntoIterator<Item = &'a EnrichedMatch>) -> OutcomeCounts {
    let mut counts = OutcomeCounts::default();
    for m in matches {
        match m.outcome {
            Some(Outcome::Home) => counts.home += 1,
            Some(Outcome::Away) => counts.away += 1,
            Some(Outcome::Draw) => counts.draw += 1,
            None => counts.unplayed += 1,
        }
    }
    counts
}

/// PTS minus xPTS per team, in table order.
pub fn points_vs_expected(teams: &TeamTable) -> Vec<(String, f64)> {
    teams
        .iter()
        .map(|t| (t.team_name.clone(), t.points as f64 - t.xpts))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    pub fn letter(self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }
}

/// The last `last_n` results of `team`, oldest first, ordered by matchday
/// then match id.
pub fn team_form(matches: &MatchTable, team: &str, last_n: usize) -> Vec<FormResult> {
    let mut played: Vec<&EnrichedMatch> = matches
        .iter()
        .filter(|m| m.played == Played::Yes && m.involves(team))
        .collect();
    played.sort_by_key(|m| (m.matchday, m.match_id));

    let results: Vec<FormResult> = played
        .into_iter()
        .filter_map(|m| {
            let outcome = m.outcome?;
            let at_home = m.home_team.is(team);
            Some(match (outcome, at_home) {
                (Outcome::Draw, _) => FormResult::Draw,
                (Outcome::Home, true) | (Outcome::Away, false) => FormResult::Win,
                _ => FormResult::Loss,
            })
        })
        .collect();

    let skip = results.len().saturating_sub(last_n);
    results[skip..].to_vec()
}

pub fn form_string(form: &[FormResult]) -> String {
    form.iter().map(|r| r.letter()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Leader {
    A,
    B,
    Level,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub column: TeamColumn,
    pub a: String,
    pub b: String,
    pub leader: Leader,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamComparison {
    pub a: Team,
    pub b: Team,
    pub rows: Vec<ComparisonRow>,
}

fn lower_is_better(column: TeamColumn) -> bool {
    matches!(
        column,
        TeamColumn::Rank | TeamColumn::Losses | TeamColumn::GoalsAgainst | TeamColumn::Xga
    )
}

/// Side-by-side figures for two teams. `None` if either name is unknown.
pub fn compare_teams(teams: &TeamTable, a: &str, b: &str) -> Option<TeamComparison> {
    let team_a = teams.by_name(a)?;
    let team_b = teams.by_name(b)?;

    let rows = TeamColumn::ALL
        .into_iter()
        .filter(|c| !matches!(c, TeamColumn::TeamId | TeamColumn::TeamName))
        .map(|column| {
            let va = column.numeric(team_a).unwrap_or_default();
            let vb = column.numeric(team_b).unwrap_or_default();
            let a_ahead = if lower_is_better(column) { va < vb } else { va > vb };
            let leader = if va == vb {
                Leader::Level
            } else if a_ahead {
                Leader::A
            } else {
                Leader::B
            };
            ComparisonRow {
                column,
                a: column.display(team_a),
                b: column.display(team_b),
                leader,
            }
        })
        .collect();

    Some(TeamComparison {
        a: team_a.clone(),
        b: team_b.clone(),
        rows,
    })
}

/// Matches between the two teams in either venue, in table order.
pub fn head_to_head<'a>(matches: &'a MatchTable, a: &str, b: &str) -> Vec<&'a EnrichedMatch> {
    matches
        .iter()
        .filter(|m| {
            (m.home_team.is(a) && m.away_team.is(b)) || (m.home_team.is(b) && m.away_team.is(a))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_string_uses_letters() {
        let form = [FormResult::Win, FormResult::Draw, FormResult::Loss];
        assert_eq!(form_string(&form), "WDL");
    }

    #[test]
    fn summarize_empty_table_is_none() {
        assert!(summarize(&TeamTable::default(), TeamColumn::Points).is_none());
    }

    #[test]
    fn rank_and_conceded_prefer_lower() {
        assert!(lower_is_better(TeamColumn::Rank));
        assert!(lower_is_better(TeamColumn::GoalsAgainst));
        assert!(!lower_is_better(TeamColumn::Points));
    }
}
