use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::store::{DecodeError, ResultSet, RowReader};

const RAW_TEAM_WIDTH: usize = 15;

/// One row of `SELECT * FROM teams`, in table column order:
/// TeamID, TeamName, MarketValue, Rank, Team, M, W, D, L, G, GA, PTS, xG, xGA, xPTS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTeam {
    pub team_id: i64,
    pub team_name: String,
    pub market_value: f64,
    pub rank: i64,
    // Duplicate of `team_name` in the source table.
    pub team: String,
    pub matches: i64,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub points: i64,
    pub xg: f64,
    pub xga: f64,
    pub xpts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub rank: i64,
    pub team_id: i64,
    pub team_name: String,
    pub market_value: f64,
    pub matches: i64,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub points: i64,
    pub xg: f64,
    pub xga: f64,
    pub xpts: f64,
}

impl Team {
    /// Rebuilds the source row shape, repeating the name in the `Team` column.
    pub fn to_raw(&self) -> RawTeam {
        RawTeam {
            team_id: self.team_id,
            team_name: self.team_name.clone(),
            market_value: self.market_value,
            rank: self.rank,
            team: self.team_name.clone(),
            matches: self.matches,
            wins: self.wins,
            draws: self.draws,
            losses: self.losses,
            goals_for: self.goals_for,
            goals_against: self.goals_against,
            points: self.points,
            xg: self.xg,
            xga: self.xga,
            xpts: self.xpts,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        self.goals_for - self.goals_against
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTable {
    pub rows: Vec<Team>,
}

impl TeamTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Team> {
        self.rows.iter()
    }

    pub fn by_name(&self, name: &str) -> Option<&Team> {
        self.rows.iter().find(|t| t.team_name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|t| t.team_name.as_str()).collect()
    }

    /// TeamID -> TeamName. Later duplicates of an id overwrite earlier ones.
    pub fn name_lookup(&self) -> HashMap<i64, &str> {
        self.rows
            .iter()
            .map(|t| (t.team_id, t.team_name.as_str()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a TeamTable {
    type Item = &'a Team;
    type IntoIter = std::slice::Iter<'a, Team>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

pub fn decode_team_rows(result: &ResultSet) -> Result<Vec<RawTeam>, DecodeError> {
    let mut out = Vec::with_capacity(result.rows.len());
    for (idx, row) in result.rows.iter().enumerate() {
        let r = RowReader::new("teams", idx, row, RAW_TEAM_WIDTH)?;
        out.push(RawTeam {
            team_id: r.int(0, "TeamID")?,
            team_name: r.text(1, "TeamName")?,
            market_value: r.float(2, "MarketValue")?,
            rank: r.int(3, "Rank")?,
            team: r.text(4, "Team")?,
            matches: r.int(5, "M")?,
            wins: r.int(6, "W")?,
            draws: r.int(7, "D")?,
            losses: r.int(8, "L")?,
            goals_for: r.int(9, "G")?,
            goals_against: r.int(10, "GA")?,
            points: r.int(11, "PTS")?,
            xg: r.float(12, "xG")?,
            xga: r.float(13, "xGA")?,
            xpts: r.float(14, "xPTS")?,
        });
    }
    Ok(out)
}

/// Drops the duplicate `Team` column, moves `Rank` first and orders rows by
/// rank. Ties keep their input order.
pub fn normalize_teams(raw: &[RawTeam]) -> TeamTable {
    let mut rows: Vec<Team> = raw
        .iter()
        .map(|r| Team {
            rank: r.rank,
            team_id: r.team_id,
            team_name: r.team_name.clone(),
            market_value: r.market_value,
            matches: r.matches,
            wins: r.wins,
            draws: r.draws,
            losses: r.losses,
            goals_for: r.goals_for,
            goals_against: r.goals_against,
            points: r.points,
            xg: r.xg,
            xga: r.xga,
            xpts: r.xpts,
        })
        .collect();
    rows.sort_by_key(|t| t.rank);
    TeamTable { rows }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamColumn {
    Rank,
    TeamId,
    TeamName,
    MarketValue,
    Matches,
    Wins,
    Draws,
    Losses,
    GoalsFor,
    GoalsAgainst,
    Points,
    Xg,
    Xga,
    Xpts,
}

impl TeamColumn {
    /// Normalized column order.
    pub const ALL: [TeamColumn; 14] = [
        TeamColumn::Rank,
        TeamColumn::TeamId,
        TeamColumn::TeamName,
        TeamColumn::MarketValue,
        TeamColumn::Matches,
        TeamColumn::Wins,
        TeamColumn::Draws,
        TeamColumn::Losses,
        TeamColumn::GoalsFor,
        TeamColumn::GoalsAgainst,
        TeamColumn::Points,
        TeamColumn::Xg,
        TeamColumn::Xga,
        TeamColumn::Xpts,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TeamColumn::Rank => "Rank",
            TeamColumn::TeamId => "TeamID",
            TeamColumn::TeamName => "TeamName",
            TeamColumn::MarketValue => "MarketValue",
            TeamColumn::Matches => "M",
            TeamColumn::Wins => "W",
            TeamColumn::Draws => "D",
            TeamColumn::Losses => "L",
            TeamColumn::GoalsFor => "G",
            TeamColumn::GoalsAgainst => "GA",
            TeamColumn::Points => "PTS",
            TeamColumn::Xg => "xG",
            TeamColumn::Xga => "xGA",
            TeamColumn::Xpts => "xPTS",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label().eq_ignore_ascii_case(label))
    }

    /// `None` only for the name column.
    pub fn numeric(self, team: &Team) -> Option<f64> {
        let v = match self {
            TeamColumn::Rank => team.rank as f64,
            TeamColumn::TeamId => team.team_id as f64,
            TeamColumn::TeamName => return None,
            TeamColumn::MarketValue => team.market_value,
            TeamColumn::Matches => team.matches as f64,
            TeamColumn::Wins => team.wins as f64,
            TeamColumn::Draws => team.draws as f64,
            TeamColumn::Losses => team.losses as f64,
            TeamColumn::GoalsFor => team.goals_for as f64,
            TeamColumn::GoalsAgainst => team.goals_against as f64,
            TeamColumn::Points => team.points as f64,
            TeamColumn::Xg => team.xg,
            TeamColumn::Xga => team.xga,
            TeamColumn::Xpts => team.xpts,
        };
        Some(v)
    }

    pub fn display(self, team: &Team) -> String {
        match self {
            TeamColumn::TeamName => team.team_name.clone(),
            TeamColumn::MarketValue => format!("{:.0}", team.market_value),
            TeamColumn::Xg | TeamColumn::Xga | TeamColumn::Xpts => {
                format!("{:.2}", self.numeric(team).unwrap_or_default())
            }
            _ => format!("{}", self.numeric(team).unwrap_or_default() as i64),
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Returns a copy of `table` ordered by `column`. Stable in both directions.
pub fn sort_teams(table: &TeamTable, column: TeamColumn, direction: SortDirection) -> TeamTable {
    let mut rows = table.rows.clone();
    let cmp = |a: &Team, b: &Team| -> Ordering {
        match column {
            TeamColumn::TeamName => a.team_name.cmp(&b.team_name),
            _ => column
                .numeric(a)
                .partial_cmp(&column.numeric(b))
                .unwrap_or(Ordering::Equal),
        }
    };
    match direction {
        SortDirection::Ascending => rows.sort_by(cmp),
        SortDirection::Descending => rows.sort_by(|a, b| cmp(b, a)),
    }
    TeamTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_labels_round_trip() {
        for column in TeamColumn::ALL {
            assert_eq!(TeamColumn::from_label(column.label()), Some(column));
        }
        assert_eq!(TeamColumn::from_label("pts"), Some(TeamColumn::Points));
        assert_eq!(TeamColumn::from_label("Team"), None);
    }

    #[test]
    fn column_cycling_wraps() {
        assert_eq!(TeamColumn::Xpts.next(), TeamColumn::Rank);
        assert_eq!(TeamColumn::Rank.prev(), TeamColumn::Xpts);
    }
}
