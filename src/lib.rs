pub mod app;
pub mod args;
pub mod config;
pub mod db;
pub mod logging;
pub mod orchestrator;
pub mod resource;
pub mod script;
pub mod transfer;

use std::path::PathBuf;
use thiserror::Error;

pub use crate::app::{Outcome, dispatch};
pub use crate::args::Cli;
pub use crate::config::{ConnectionParameters, PropertyLoader};
pub use crate::db::{ConnectionProvider, DatabaseConnection, SqlError, SqliteProvider};
pub use crate::logging::{CapturingSink, LogSink, TracingSink};
pub use crate::orchestrator::{Orchestrator, ScopedConnection};
pub use crate::resource::{ResourceFinder, TableDataResource};
pub use crate::script::SqlScriptExecutor;
pub use crate::transfer::{CsvProcessor, TransferEngine};

// Discriminant of every failure the workflows can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Connection,
    Statement,
    Io,
    Transfer,
}

// The two fatal categories an error is reported as at the process boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalCategory {
    State,
    Io,
}

impl std::fmt::Display for FatalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FatalCategory::State => write!(f, "state failure"),
            FatalCategory::Io => write!(f, "I/O failure"),
        }
    }
}

// Where a transfer went wrong: the database side or the file side
#[derive(Debug, Error)]
pub enum TransferFault {
    #[error(transparent)]
    Sql(#[from] SqlError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line} has {found} fields, header has {expected}")]
    Width {
        line: u64,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("cannot read connection properties {}: {message}", path.display())]
    Configuration { path: PathBuf, message: String },

    #[error("cannot connect to database: {0}")]
    Connection(#[source] SqlError),

    #[error("statement {statement} of {} failed: {source}", script.display())]
    Statement {
        script: PathBuf,
        statement: usize,
        #[source]
        source: SqlError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transfer of table {table} failed: {source}")]
    Transfer {
        table: String,
        #[source]
        source: TransferFault,
    },
}

impl LoaderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoaderError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn transfer(table: impl Into<String>, source: impl Into<TransferFault>) -> Self {
        LoaderError::Transfer {
            table: table.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LoaderError::Configuration { .. } => ErrorKind::Configuration,
            LoaderError::Connection(_) => ErrorKind::Connection,
            LoaderError::Statement { .. } => ErrorKind::Statement,
            LoaderError::Io { .. } => ErrorKind::Io,
            LoaderError::Transfer { .. } => ErrorKind::Transfer,
        }
    }

    pub fn category(&self) -> FatalCategory {
        match self {
            LoaderError::Configuration { .. } | LoaderError::Io { .. } => FatalCategory::Io,
            LoaderError::Connection(_) | LoaderError::Statement { .. } => FatalCategory::State,
            LoaderError::Transfer { source, .. } => match source {
                TransferFault::Sql(_) => FatalCategory::State,
                TransferFault::Csv(_) | TransferFault::Io(_) | TransferFault::Width { .. } => {
                    FatalCategory::Io
                }
            },
        }
    }
}

// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;
