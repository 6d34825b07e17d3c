use std::fmt;
use std::path::Path;

use log::debug;
use postgres::types::Type;
use postgres::{Client, NoTls};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{DataSource, PgCredentials};

/// The fixed read statements the dashboard issues. Nothing else is ever sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    AllTeams,
    AllMatches,
    BaseTableNames,
}

impl Statement {
    pub fn name(self) -> &'static str {
        match self {
            Statement::AllTeams => "select-all-teams",
            Statement::AllMatches => "select-all-matches",
            Statement::BaseTableNames => "select-base-table-names",
        }
    }

    fn postgres_sql(self) -> &'static str {
        match self {
            Statement::AllTeams => "SELECT * FROM teams",
            Statement::AllMatches => "SELECT * FROM matches",
            Statement::BaseTableNames => {
                "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_type = 'BASE TABLE'"
            }
        }
    }

    fn sqlite_sql(self) -> &'static str {
        match self {
            Statement::AllTeams => "SELECT * FROM teams",
            Statement::AllMatches => "SELECT * FROM matches",
            Statement::BaseTableNames => {
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Integral floats narrow to ints; nullable integer columns often come
    /// back as DOUBLE PRECISION. Fractional values are rejected.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            Value::Float(v)
                if v.is_finite()
                    && v.fract() == 0.0
                    && *v >= i64::MIN as f64
                    && *v < i64::MAX as f64 =>
            {
                Some(*v as i64)
            }
            _ => None,
        }
    }

    /// Integers widen to floats; monetary columns are often stored as BIGINT.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
        }
    }
}

pub type Row = Vec<Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot connect to {target}: {message}")]
    Connection { target: String, message: String },
    #[error("{statement} failed: {message}")]
    Query {
        statement: &'static str,
        message: String,
    },
    #[error("{statement}: column `{column}` has unsupported type {type_name}")]
    UnsupportedType {
        statement: &'static str,
        column: String,
        type_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("{table} row {row}: expected {expected} columns, found {found}")]
    Width {
        table: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{table} row {row}: column `{column}` expected {expected}, found {found}")]
    Field {
        table: &'static str,
        row: usize,
        column: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Positional accessor over one raw row.
pub struct RowReader<'a> {
    table: &'static str,
    index: usize,
    row: &'a [Value],
}

impl<'a> RowReader<'a> {
    pub fn new(
        table: &'static str,
        index: usize,
        row: &'a [Value],
        width: usize,
    ) -> Result<Self, DecodeError> {
        if row.len() != width {
            return Err(DecodeError::Width {
                table,
                row: index,
                expected: width,
                found: row.len(),
            });
        }
        Ok(Self { table, index, row })
    }

    fn mismatch(&self, pos: usize, column: &'static str, expected: &'static str) -> DecodeError {
        DecodeError::Field {
            table: self.table,
            row: self.index,
            column,
            expected,
            found: self.row[pos].kind(),
        }
    }

    pub fn int(&self, pos: usize, column: &'static str) -> Result<i64, DecodeError> {
        self.row[pos]
            .as_i64()
            .ok_or_else(|| self.mismatch(pos, column, "int"))
    }

    pub fn opt_int(&self, pos: usize, column: &'static str) -> Result<Option<i64>, DecodeError> {
        if self.row[pos].is_null() {
            return Ok(None);
        }
        self.int(pos, column).map(Some)
    }

    pub fn float(&self, pos: usize, column: &'static str) -> Result<f64, DecodeError> {
        self.row[pos]
            .as_f64()
            .ok_or_else(|| self.mismatch(pos, column, "number"))
    }

    pub fn text(&self, pos: usize, column: &'static str) -> Result<String, DecodeError> {
        self.row[pos]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(pos, column, "text"))
    }

    pub fn flag(&self, pos: usize, column: &'static str) -> Result<bool, DecodeError> {
        self.row[pos]
            .as_bool()
            .ok_or_else(|| self.mismatch(pos, column, "bool"))
    }
}

/// Runs one statement per call against a freshly opened connection.
///
/// Connections are owned by the call frame, so they are closed on every
/// return path, including errors.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    source: DataSource,
}

impl QueryExecutor {
    pub fn new(source: DataSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn execute_query(&self, statement: Statement) -> Result<ResultSet, StoreError> {
        debug!("executing {} against {}", statement.name(), self.source.label());
        let result = match &self.source {
            DataSource::Postgres(creds) => run_postgres(creds, statement),
            DataSource::Sqlite(path) => run_sqlite(path, statement),
        }?;
        debug!("{} returned {} rows", statement.name(), result.len());
        Ok(result)
    }
}

fn run_postgres(creds: &PgCredentials, statement: Statement) -> Result<ResultSet, StoreError> {
    let mut client = Client::connect(&creds.connection_string(), NoTls).map_err(|err| {
        StoreError::Connection {
            target: format!("{}:{}/{}", creds.host, creds.port, creds.database),
            message: err.to_string(),
        }
    })?;

    let query_err = |err: postgres::Error| StoreError::Query {
        statement: statement.name(),
        message: err.to_string(),
    };
    let prepared = client.prepare(statement.postgres_sql()).map_err(query_err)?;
    let columns: Vec<String> = prepared
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let rows = client.query(&prepared, &[]).map_err(query_err)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut values = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            values.push(pg_value(row, idx, column.type_(), statement, column.name())?);
        }
        out.push(values);
    }

    if let Err(err) = client.close() {
        debug!("closing postgres connection: {err}");
    }

    Ok(ResultSet { columns, rows: out })
}

fn pg_value(
    row: &postgres::Row,
    idx: usize,
    ty: &Type,
    statement: Statement,
    column: &str,
) -> Result<Value, StoreError> {
    let decode_err = |err: postgres::Error| StoreError::Query {
        statement: statement.name(),
        message: format!("decode column `{column}`: {err}"),
    };

    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)
            .map_err(decode_err)?
            .map(Value::Bool)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)
            .map_err(decode_err)?
            .map(|v| Value::Int(i64::from(v)))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)
            .map_err(decode_err)?
            .map(|v| Value::Int(i64::from(v)))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)
            .map_err(decode_err)?
            .map(Value::Int)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)
            .map_err(decode_err)?
            .map(|v| Value::Float(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)
            .map_err(decode_err)?
            .map(Value::Float)
    } else if [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME].contains(ty) {
        row.try_get::<_, Option<String>>(idx)
            .map_err(decode_err)?
            .map(Value::Text)
    } else {
        return Err(StoreError::UnsupportedType {
            statement: statement.name(),
            column: column.to_string(),
            type_name: ty.name().to_string(),
        });
    };
    Ok(value.unwrap_or(Value::Null))
}

fn run_sqlite(path: &Path, statement: Statement) -> Result<ResultSet, StoreError> {
    // Read-only, and without CREATE: a missing file is a connection failure,
    // not a fresh empty database.
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|err| StoreError::Connection {
        target: path.display().to_string(),
        message: err.to_string(),
    })?;

    let query_err = |err: rusqlite::Error| StoreError::Query {
        statement: statement.name(),
        message: err.to_string(),
    };

    let result = {
        let mut stmt = conn.prepare(statement.sqlite_sql()).map_err(query_err)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = stmt.query([]).map_err(query_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(query_err)? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                let value = match row.get_ref(idx).map_err(query_err)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(v) => Value::Int(v),
                    ValueRef::Real(v) => Value::Float(v),
                    ValueRef::Text(bytes) => {
                        Value::Text(String::from_utf8_lossy(bytes).into_owned())
                    }
                    ValueRef::Blob(_) => {
                        return Err(StoreError::UnsupportedType {
                            statement: statement.name(),
                            column: columns[idx].clone(),
                            type_name: "BLOB".to_string(),
                        });
                    }
                };
                values.push(value);
            }
            out.push(values);
        }
        ResultSet { columns, rows: out }
    };

    if let Err((_, err)) = conn.close() {
        debug!("closing sqlite connection: {err}");
    }
    Ok(result)
}
