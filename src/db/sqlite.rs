use super::{ConnectionProvider, DatabaseConnection, Field, SqlError, quote_identifier};
use crate::config::ConnectionParameters;
use crate::{LoaderError, LoaderResult};
use rusqlite::types::ValueRef;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    Memory,
    File(PathBuf),
}

impl SqliteTarget {
    // Accepts jdbc:sqlite:<path>, sqlite:<path>, sqlite://<path>, file:<path> and :memory:
    pub fn from_url(url: &str) -> Option<Self> {
        let url = url.trim();
        let url = url.strip_prefix("jdbc:").unwrap_or(url);

        let rest = if let Some(rest) = url.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = url.strip_prefix("sqlite:") {
            rest
        } else if let Some(rest) = url.strip_prefix("file:") {
            rest
        } else if url == ":memory:" {
            url
        } else {
            return None;
        };

        match rest {
            "" => None,
            ":memory:" => Some(SqliteTarget::Memory),
            path => Some(SqliteTarget::File(PathBuf::from(path))),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteProvider;

impl SqliteProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ConnectionProvider for SqliteProvider {
    fn connect(&self, params: &ConnectionParameters) -> LoaderResult<Box<dyn DatabaseConnection>> {
        if let Some(driver) = params.driver() {
            if !driver.to_lowercase().contains("sqlite") {
                return Err(LoaderError::Connection(SqlError::new(format!(
                    "unsupported driver: {}",
                    driver
                ))));
            }
        }

        let url = params.url().ok_or_else(|| {
            LoaderError::Connection(SqlError::new("connection url is not set"))
        })?;
        let target = SqliteTarget::from_url(url).ok_or_else(|| {
            LoaderError::Connection(SqlError::new(format!("unsupported connection url: {}", url)))
        })?;

        if params.user().is_some() || params.password().is_some() {
            tracing::debug!("sqlite ignores user and password properties");
        }

        let conn = match &target {
            SqliteTarget::Memory => rusqlite::Connection::open_in_memory(),
            SqliteTarget::File(path) => rusqlite::Connection::open(path),
        }
        .map_err(|e| LoaderError::Connection(e.into()))?;

        tracing::debug!(?target, "opened sqlite connection");
        Ok(Box::new(SqliteConnection { conn }))
    }
}

pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }
}

impl DatabaseConnection for SqliteConnection {
    fn execute(&mut self, sql: &str) -> Result<(), SqlError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn table_columns(&mut self, table: &str) -> Result<Vec<String>, SqlError> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(table));
        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(SqlError::new(format!("no such table: {}", table)));
        }
        Ok(columns)
    }

    fn insert_row(
        &mut self,
        table: &str,
        columns: &[String],
        values: &[Field],
    ) -> Result<(), SqlError> {
        let column_list = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(table),
            column_list,
            placeholders
        );

        let mut stmt = self.conn.prepare_cached(&sql)?;
        stmt.execute(rusqlite::params_from_iter(values.iter()))?;
        Ok(())
    }

    fn select_rows(&mut self, table: &str, columns: &[String]) -> Result<Vec<Vec<Field>>, SqlError> {
        let column_list = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {} FROM {}", column_list, quote_identifier(table));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut result = Vec::new();

        while let Some(row) = rows.next()? {
            let mut fields = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                fields.push(render(row.get_ref(i)?));
            }
            result.push(fields);
        }

        Ok(result)
    }

    fn close(self: Box<Self>) -> Result<(), SqlError> {
        self.conn.close().map_err(|(_, e)| SqlError::from(e))
    }
}

fn render(value: ValueRef<'_>) -> Field {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for b in bytes {
                let _ = write!(hex, "{:02x}", b);
            }
            Some(hex)
        }
    }
}
