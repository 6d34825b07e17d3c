use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

/// Column names follow the production tables, so they are quoted.
pub const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS teams (
        "TeamID" INTEGER PRIMARY KEY,
        "TeamName" TEXT NOT NULL,
        "MarketValue" INTEGER NOT NULL,
        "Rank" INTEGER NOT NULL,
        "Team" TEXT NOT NULL,
        "M" INTEGER NOT NULL,
        "W" INTEGER NOT NULL,
        "D" INTEGER NOT NULL,
        "L" INTEGER NOT NULL,
        "G" INTEGER NOT NULL,
        "GA" INTEGER NOT NULL,
        "PTS" INTEGER NOT NULL,
        "xG" REAL NOT NULL,
        "xGA" REAL NOT NULL,
        "xPTS" REAL NOT NULL
    );
    CREATE TABLE IF NOT EXISTS matches (
        "matchId" INTEGER PRIMARY KEY,
        "matchday" INTEGER NOT NULL,
        "homeTeamId" INTEGER NOT NULL,
        "awayTeamId" INTEGER NOT NULL,
        "homeScore" INTEGER NULL,
        "awayScore" INTEGER NULL,
        "played" INTEGER NOT NULL
    );
"#;

// (id, name, market value, rank, M, W, D, L, G, GA, PTS, xG, xGA, xPTS)
type DemoTeam = (i64, &'static str, i64, i64, i64, i64, i64, i64, i64, i64, i64, f64, f64, f64);

const TEAMS: [DemoTeam; 6] = [
    (1, "Arsenal", 900_000_000, 3, 4, 2, 1, 1, 7, 4, 7, 6.9, 3.8, 7.4),
    (2, "Chelsea", 780_000_000, 4, 4, 1, 2, 1, 5, 5, 5, 5.6, 4.9, 5.8),
    (3, "Liverpool", 880_000_000, 1, 4, 3, 1, 0, 9, 3, 10, 8.4, 3.1, 8.9),
    (4, "Man City", 1_250_000_000, 2, 4, 3, 0, 1, 10, 4, 9, 9.8, 3.5, 9.6),
    (5, "Newcastle", 560_000_000, 5, 4, 1, 1, 2, 4, 6, 4, 4.7, 5.8, 4.5),
    (6, "Brighton", 480_000_000, 6, 4, 0, 1, 3, 3, 16, 1, 3.9, 8.2, 2.1),
];

// (id, matchday, home, away, home score, away score, played)
type DemoMatch = (i64, i64, i64, i64, Option<i64>, Option<i64>, bool);

const MATCHES: [DemoMatch; 15] = [
    (1, 1, 1, 2, Some(3), Some(1), true),
    (2, 1, 3, 4, Some(2), Some(2), true),
    (3, 1, 5, 6, Some(2), Some(0), true),
    (4, 2, 2, 3, Some(0), Some(2), true),
    (5, 2, 4, 5, Some(3), Some(0), true),
    (6, 2, 6, 1, Some(1), Some(1), true),
    (7, 3, 1, 3, Some(1), Some(2), true),
    (8, 3, 2, 5, Some(2), Some(2), true),
    (9, 3, 4, 6, Some(4), Some(1), true),
    (10, 4, 3, 6, Some(3), Some(1), true),
    (11, 4, 5, 1, Some(0), Some(2), true),
    (12, 4, 6, 2, Some(1), Some(3), true),
    (13, 5, 1, 4, None, None, false),
    (14, 5, 2, 6, None, None, false),
    (15, 5, 3, 5, None, None, false),
];

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).context("create demo schema")?;
    Ok(())
}

/// Creates (or refreshes) a demo league database at `path`.
pub fn seed(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    create_schema(&conn)?;

    let tx = conn.transaction().context("begin seed transaction")?;
    tx.execute("DELETE FROM matches", []).context("clear matches")?;
    tx.execute("DELETE FROM teams", []).context("clear teams")?;
    for (id, name, value, rank, m, w, d, l, g, ga, pts, xg, xga, xpts) in TEAMS {
        tx.execute(
            r#"INSERT INTO teams("TeamID", "TeamName", "MarketValue", "Rank", "Team", "M", "W", "D", "L", "G", "GA", "PTS", "xG", "xGA", "xPTS")
               VALUES (?1, ?2, ?3, ?4, ?2, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"#,
            params![id, name, value, rank, m, w, d, l, g, ga, pts, xg, xga, xpts],
        )
        .with_context(|| format!("insert team {name}"))?;
    }
    for (id, day, home, away, hs, aws, played) in MATCHES {
        tx.execute(
            r#"INSERT INTO matches("matchId", "matchday", "homeTeamId", "awayTeamId", "homeScore", "awayScore", "played")
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![id, day, home, away, hs, aws, played],
        )
        .with_context(|| format!("insert match {id}"))?;
    }
    tx.commit().context("commit seed transaction")?;
    Ok(())
}
