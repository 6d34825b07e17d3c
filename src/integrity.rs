use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matches::RawMatch;
use crate::teams::TeamTable;

/// How the pipeline reacts to data-quality issues in the source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegrityPolicy {
    /// Keep going: unmapped ids pass through, rank ties keep input order.
    #[default]
    PassThrough,
    /// Refuse to build a dataset that has any issue.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IntegrityIssue {
    DuplicateRank { rank: i64, teams: Vec<String> },
    RankGap { expected: i64, found: i64 },
    NegativeValue { team: String, column: &'static str },
    UnmappedTeam { match_id: i64, side: Side, team_id: i64 },
    MissingScore { match_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Home,
    Away,
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::DuplicateRank { rank, teams } => {
                write!(f, "rank {rank} shared by {}", teams.join(", "))
            }
            IntegrityIssue::RankGap { expected, found } => {
                write!(f, "ranks are not contiguous: expected {expected}, found {found}")
            }
            IntegrityIssue::NegativeValue { team, column } => {
                write!(f, "{team} has a negative {column}")
            }
            IntegrityIssue::UnmappedTeam {
                match_id,
                side,
                team_id,
            } => {
                let side = match side {
                    Side::Home => "home",
                    Side::Away => "away",
                };
                write!(f, "match {match_id}: {side} team id {team_id} is not in teams")
            }
            IntegrityIssue::MissingScore { match_id } => {
                write!(f, "match {match_id} is marked played but has no score")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} data integrity issue(s){}", .issues.len(), first_issue(.issues))]
pub struct DataIntegrityError {
    pub issues: Vec<IntegrityIssue>,
}

fn first_issue(issues: &[IntegrityIssue]) -> String {
    issues
        .first()
        .map(|issue| format!("; first: {issue}"))
        .unwrap_or_default()
}

pub fn check_teams(teams: &TeamTable) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    let mut by_rank: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for team in teams.iter() {
        by_rank
            .entry(team.rank)
            .or_default()
            .push(team.team_name.clone());
    }
    for (rank, names) in &by_rank {
        if names.len() > 1 {
            issues.push(IntegrityIssue::DuplicateRank {
                rank: *rank,
                teams: names.clone(),
            });
        }
    }

    // Distinct ranks must read 1, 2, 3, ... once duplicates are reported.
    for (expected, found) in (1..).zip(by_rank.keys().copied()) {
        if expected != found {
            issues.push(IntegrityIssue::RankGap { expected, found });
            break;
        }
    }

    for team in teams.iter() {
        let counters = [
            ("MarketValue", team.market_value < 0.0),
            ("M", team.matches < 0),
            ("W", team.wins < 0),
            ("D", team.draws < 0),
            ("L", team.losses < 0),
            ("G", team.goals_for < 0),
            ("GA", team.goals_against < 0),
            ("PTS", team.points < 0),
        ];
        for (column, negative) in counters {
            if negative {
                issues.push(IntegrityIssue::NegativeValue {
                    team: team.team_name.clone(),
                    column,
                });
            }
        }
    }

    issues
}

pub fn check_matches(raw: &[RawMatch], teams: &TeamTable) -> Vec<IntegrityIssue> {
    let known: HashSet<i64> = teams.iter().map(|t| t.team_id).collect();
    let mut issues = Vec::new();
    for m in raw {
        for (side, team_id) in [(Side::Home, m.home_team_id), (Side::Away, m.away_team_id)] {
            if !known.contains(&team_id) {
                issues.push(IntegrityIssue::UnmappedTeam {
                    match_id: m.match_id,
                    side,
                    team_id,
                });
            }
        }
        if m.played && (m.home_score.is_none() || m.away_score.is_none()) {
            issues.push(IntegrityIssue::MissingScore {
                match_id: m.match_id,
            });
        }
    }
    issues
}
