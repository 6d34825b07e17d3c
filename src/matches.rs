use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{DecodeError, ResultSet, RowReader};
use crate::teams::TeamTable;

const RAW_MATCH_WIDTH: usize = 7;

/// One row of `SELECT * FROM matches`:
/// matchId, matchday, homeTeamId, awayTeamId, homeScore, awayScore, played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatch {
    pub match_id: i64,
    pub matchday: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub played: bool,
}

/// A team reference after name substitution. Ids with no matching team are
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamRef {
    Name(String),
    Unmapped(i64),
}

impl TeamRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            TeamRef::Name(name) => Some(name.as_str()),
            TeamRef::Unmapped(_) => None,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == Some(name)
    }
}

impl fmt::Display for TeamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamRef::Name(name) => write!(f, "{name}"),
            TeamRef::Unmapped(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Played {
    Yes,
    No,
}

impl Played {
    pub fn label(self) -> &'static str {
        match self {
            Played::Yes => "Yes",
            Played::No => "No",
        }
    }
}

impl From<bool> for Played {
    fn from(played: bool) -> Self {
        if played { Played::Yes } else { Played::No }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Away,
    Draw,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Home => "Home",
            Outcome::Away => "Away",
            Outcome::Draw => "Draw",
        }
    }

    pub fn from_scores(home: i64, away: i64) -> Self {
        match home.cmp(&away) {
            Ordering::Greater => Outcome::Home,
            Ordering::Less => Outcome::Away,
            Ordering::Equal => Outcome::Draw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedMatch {
    pub match_id: i64,
    pub matchday: i64,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub played: Played,
    pub outcome: Option<Outcome>,
}

impl EnrichedMatch {
    pub fn score_label(&self) -> String {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => format!("{h}-{a}"),
            _ => "-".to_string(),
        }
    }

    pub fn involves(&self, name: &str) -> bool {
        self.home_team.is(name) || self.away_team.is(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchTable {
    pub rows: Vec<EnrichedMatch>,
}

impl MatchTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedMatch> {
        self.rows.iter()
    }

    pub fn played(&self) -> impl Iterator<Item = &EnrichedMatch> {
        self.rows.iter().filter(|m| m.played == Played::Yes)
    }

    /// Distinct matchdays in ascending order.
    pub fn matchdays(&self) -> Vec<i64> {
        let mut days: Vec<i64> = self.rows.iter().map(|m| m.matchday).collect();
        days.sort_unstable();
        days.dedup();
        days
    }
}

impl<'a> IntoIterator for &'a MatchTable {
    type Item = &'a EnrichedMatch;
    type IntoIter = std::slice::Iter<'a, EnrichedMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

pub fn decode_match_rows(result: &ResultSet) -> Result<Vec<RawMatch>, DecodeError> {
    let mut out = Vec::with_capacity(result.rows.len());
    for (idx, row) in result.rows.iter().enumerate() {
        let r = RowReader::new("matches", idx, row, RAW_MATCH_WIDTH)?;
        out.push(RawMatch {
            match_id: r.int(0, "matchId")?,
            matchday: r.int(1, "matchday")?,
            home_team_id: r.int(2, "homeTeamId")?,
            away_team_id: r.int(3, "awayTeamId")?,
            home_score: r.opt_int(4, "homeScore")?,
            away_score: r.opt_int(5, "awayScore")?,
            played: r.flag(6, "played")?,
        });
    }
    Ok(out)
}

/// Substitutes team names for ids, labels the played flag and derives the
/// outcome. One output row per input row; never fails.
///
/// The outcome needs both `played` and both scores. A played row missing
/// either score gets `None` (flagged as `MissingScore` by the integrity
/// checks), and an unplayed row gets `None` even when scores are present.
pub fn enrich_matches(raw: &[RawMatch], teams: &TeamTable) -> MatchTable {
    let names = teams.name_lookup();
    let resolve = |id: i64| match names.get(&id) {
        Some(name) => TeamRef::Name((*name).to_string()),
        None => TeamRef::Unmapped(id),
    };

    let rows = raw
        .iter()
        .map(|m| {
            let played = Played::from(m.played);
            let outcome = match (played, m.home_score, m.away_score) {
                (Played::Yes, Some(home), Some(away)) => Some(Outcome::from_scores(home, away)),
                _ => None,
            };
            EnrichedMatch {
                match_id: m.match_id,
                matchday: m.matchday,
                home_team: resolve(m.home_team_id),
                away_team: resolve(m.away_team_id),
                home_score: m.home_score,
                away_score: m.away_score,
                played,
                outcome,
            }
        })
        .collect();

    MatchTable { rows }
}
