use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::integrity::{self, DataIntegrityError, IntegrityIssue, IntegrityPolicy};
use crate::matches::{self, MatchTable};
use crate::store::{DecodeError, QueryExecutor, Statement, StoreError, Value};
use crate::teams::{self, TeamTable};

/// Everything one page render needs, fetched fresh for that render.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub teams: TeamTable,
    pub matches: MatchTable,
    pub tables: Vec<String>,
    pub issues: Vec<IntegrityIssue>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Integrity(#[from] DataIntegrityError),
}

pub fn load_dataset(
    executor: &QueryExecutor,
    policy: IntegrityPolicy,
) -> Result<Dataset, PipelineError> {
    let raw_teams = teams::decode_team_rows(&executor.execute_query(Statement::AllTeams)?)?;
    let raw_matches = matches::decode_match_rows(&executor.execute_query(Statement::AllMatches)?)?;
    let tables = executor
        .execute_query(Statement::BaseTableNames)?
        .rows
        .into_iter()
        .filter_map(|row| match row.into_iter().next() {
            Some(Value::Text(name)) => Some(name),
            _ => None,
        })
        .collect();

    build_dataset(&raw_teams, &raw_matches, tables, policy)
}

/// The transformation half of `load_dataset`, without any I/O.
pub fn build_dataset(
    raw_teams: &[teams::RawTeam],
    raw_matches: &[matches::RawMatch],
    tables: Vec<String>,
    policy: IntegrityPolicy,
) -> Result<Dataset, PipelineError> {
    let team_table = teams::normalize_teams(raw_teams);

    let mut issues = integrity::check_teams(&team_table);
    issues.extend(integrity::check_matches(raw_matches, &team_table));
    if !issues.is_empty() {
        match policy {
            IntegrityPolicy::Strict => return Err(DataIntegrityError { issues }.into()),
            IntegrityPolicy::PassThrough => {
                for issue in &issues {
                    warn!("{issue}");
                }
            }
        }
    }

    let match_table = matches::enrich_matches(raw_matches, &team_table);
    info!(
        "loaded {} teams, {} matches, {} tables",
        team_table.len(),
        match_table.len(),
        tables.len()
    );

    Ok(Dataset {
        teams: team_table,
        matches: match_table,
        tables,
        issues,
        loaded_at: Utc::now(),
    })
}
