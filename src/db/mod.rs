pub mod sqlite;

pub use sqlite::{SqliteConnection, SqliteProvider};

use crate::LoaderResult;
use crate::config::ConnectionParameters;
use thiserror::Error;

// A field as it crosses the database boundary; None is SQL NULL
pub type Field = Option<String>;

// Driver-neutral database failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SqlError {
    message: String,
}

impl SqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<rusqlite::Error> for SqlError {
    fn from(e: rusqlite::Error) -> Self {
        SqlError::new(e.to_string())
    }
}

/// A single live database handle.
///
/// Statements run in auto-commit mode: each `execute` and each `insert_row`
/// is durable once it returns. Implementations are used by one workflow step
/// at a time and are never shared.
pub trait DatabaseConnection {
    /// Runs one SQL statement that returns no rows.
    fn execute(&mut self, sql: &str) -> Result<(), SqlError>;

    /// Column names of `table` in declaration order.
    fn table_columns(&mut self, table: &str) -> Result<Vec<String>, SqlError>;

    fn insert_row(&mut self, table: &str, columns: &[String], values: &[Field])
    -> Result<(), SqlError>;

    /// Every row of `table`, projected onto `columns`.
    fn select_rows(&mut self, table: &str, columns: &[String]) -> Result<Vec<Vec<Field>>, SqlError>;

    /// Releases the handle. Consuming `self` makes a second close impossible.
    fn close(self: Box<Self>) -> Result<(), SqlError>;
}

/// Owns the driver-specific connect logic.
pub trait ConnectionProvider {
    fn connect(&self, params: &ConnectionParameters) -> LoaderResult<Box<dyn DatabaseConnection>>;
}

// Quotes an identifier for use in generated SQL
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
