use std::path::PathBuf;

use anyhow::{Context, Result};

use league_dash::config::AppConfig;
use league_dash::console_log;
use league_dash::export;
use league_dash::pipeline;
use league_dash::store::QueryExecutor;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let logger = console_log::init();

    let config = AppConfig::from_env().context("configuration")?;
    let json = std::env::args().skip(1).any(|arg| arg == "--json");
    let out = parse_out_arg().unwrap_or_else(|| {
        if json {
            config.export_path.with_extension("json")
        } else {
            config.export_path.clone()
        }
    });

    let executor = QueryExecutor::new(config.source.clone());
    let result = pipeline::load_dataset(&executor, config.integrity)
        .with_context(|| format!("loading from {}", config.source.label()));

    for line in logger.recent(usize::MAX) {
        eprintln!("{line}");
    }
    let data = result?;

    if json {
        export::export_json(&data, &out)?;
        println!("JSON export complete");
    } else {
        let report = export::export_xlsx(&data, &out)?;
        println!("Workbook export complete");
        println!("Teams: {}", report.teams);
        println!("Matches: {}", report.matches);
        println!("Summary rows: {}", report.summary_rows);
    }
    println!("File: {}", out.display());
    if !data.issues.is_empty() {
        println!("Data issues: {}", data.issues.len());
        for issue in data.issues.iter().take(8) {
            println!(" - {issue}");
        }
    }

    Ok(())
}

fn parse_out_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--out=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--out" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
