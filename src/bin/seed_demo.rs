use std::path::PathBuf;

use anyhow::{Context, Result};

use league_dash::demo;

fn main() -> Result<()> {
    let db_path = parse_db_path_arg()
        .or_else(|| std::env::var("DASH_SQLITE_PATH").ok().map(PathBuf::from))
        .context("pass --db=<path> or set DASH_SQLITE_PATH")?;

    demo::seed(&db_path)?;

    println!("Demo league written");
    println!("DB: {}", db_path.display());
    println!("Run with DASH_SQLITE_PATH={}", db_path.display());
    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
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
