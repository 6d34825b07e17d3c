use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::integrity::IntegrityPolicy;

const DEFAULT_PG_PORT: u16 = 5432;

/// Where the dashboard reads its tables from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Postgres(PgCredentials),
    Sqlite(PathBuf),
}

#[derive(Clone, PartialEq, Eq)]
pub struct PgCredentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl PgCredentials {
    /// Key/value connection string understood by `postgres::Config`.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            quote_conn_value(&self.host),
            self.port,
            quote_conn_value(&self.username),
            quote_conn_value(&self.password),
            quote_conn_value(&self.database)
        )
    }
}

// Credentials must never end up in logs or panic messages.
impl std::fmt::Debug for PgCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl DataSource {
    pub fn label(&self) -> String {
        match self {
            DataSource::Postgres(creds) => {
                format!("postgres://{}@{}/{}", creds.username, creds.host, creds.database)
            }
            DataSource::Sqlite(path) => format!("sqlite:{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: DataSource,
    pub integrity: IntegrityPolicy,
    pub export_path: PathBuf,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy` first if `.env` files
    /// should be honored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let source = if let Some(path) = get("DASH_SQLITE_PATH") {
            DataSource::Sqlite(PathBuf::from(path))
        } else {
            let mut missing = Vec::new();
            // The password may be set but empty (trust auth); it is taken verbatim.
            let mut require = |key: &'static str, allow_empty: bool| {
                let value = if allow_empty { lookup(key) } else { get(key) };
                value.unwrap_or_else(|| {
                    missing.push(key);
                    String::new()
                })
            };
            let host = require("DB_HOST", false);
            let username = require("DB_USERNAME", false);
            let password = require("DB_PASSWORD", true);
            let database = require("DB_NAME", false);
            if !missing.is_empty() {
                return Err(anyhow!(
                    "missing database settings: {} (or set DASH_SQLITE_PATH)",
                    missing.join(", ")
                ));
            }
            let port = match get("DB_PORT") {
                Some(raw) => raw
                    .parse::<u16>()
                    .map_err(|_| anyhow!("DB_PORT is not a valid port: {raw}"))?,
                None => DEFAULT_PG_PORT,
            };
            DataSource::Postgres(PgCredentials {
                host,
                port,
                username,
                password,
                database,
            })
        };

        let integrity = match get("DASH_STRICT_INTEGRITY").as_deref() {
            Some("1") | Some("true") | Some("yes") => IntegrityPolicy::Strict,
            _ => IntegrityPolicy::PassThrough,
        };

        let export_path = get("DASH_EXPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("league_dashboard.xlsx"));

        Ok(Self {
            source,
            integrity,
            export_path,
        })
    }
}

fn quote_conn_value(raw: &str) -> String {
    if !raw.is_empty() && !raw.contains(|c: char| c.is_whitespace() || c == '\'' || c == '\\') {
        return raw.to_string();
    }
    let escaped = raw.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
