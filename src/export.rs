use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dashboard::format_stat;
use crate::pipeline::Dataset;
use crate::stats;
use crate::teams::TeamColumn;

pub struct ExportReport {
    pub teams: usize,
    pub matches: usize,
    pub summary_rows: usize,
}

pub fn export_xlsx(data: &Dataset, path: &Path) -> Result<ExportReport> {
    let mut teams_rows = vec![
        TeamColumn::ALL
            .iter()
            .map(|c| c.label().to_string())
            .collect::<Vec<_>>(),
    ];
    for team in &data.teams {
        teams_rows.push(TeamColumn::ALL.iter().map(|c| c.display(team)).collect());
    }

    let mut matches_rows = vec![
        [
            "matchId",
            "matchday",
            "homeTeamId",
            "awayTeamId",
            "homeScore",
            "awayScore",
            "played",
            "outcome",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>(),
    ];
    for m in &data.matches {
        matches_rows.push(vec![
            m.match_id.to_string(),
            m.matchday.to_string(),
            m.home_team.to_string(),
            m.away_team.to_string(),
            m.home_score.map(|v| v.to_string()).unwrap_or_default(),
            m.away_score.map(|v| v.to_string()).unwrap_or_default(),
            m.played.label().to_string(),
            m.outcome.map(|o| o.label().to_string()).unwrap_or_default(),
        ]);
    }

    let mut summary_rows = vec![vec![
        "Column".to_string(),
        "Max".to_string(),
        "Max Team".to_string(),
        "Min".to_string(),
        "Min Team".to_string(),
        "Mean".to_string(),
    ]];
    for s in stats::describe(&data.teams) {
        summary_rows.push(vec![
            s.column.label().to_string(),
            format_stat(s.max),
            s.max_team,
            format_stat(s.min),
            s.min_team,
            format_stat(s.mean),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Teams")?;
        write_rows(sheet, &teams_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_rows(sheet, &matches_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        teams: teams_rows.len().saturating_sub(1),
        matches: matches_rows.len().saturating_sub(1),
        summary_rows: summary_rows.len().saturating_sub(1),
    })
}

pub fn export_json(data: &Dataset, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("serialize dataset")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename to {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
