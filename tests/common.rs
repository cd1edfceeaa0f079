// Common test utilities for integration tests

#![allow(dead_code)]

use csvloader::db::Field;
use csvloader::{
    CapturingSink, ConnectionParameters, ConnectionProvider, DatabaseConnection, LoaderError,
    LoaderResult, LogSink, Orchestrator, SqlError, TableDataResource, TransferEngine,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tempfile::TempDir;

// Everything the fakes observed during one run
#[derive(Debug, Default)]
pub struct Recorder {
    pub connects: usize,
    pub closes: usize,
    pub statements: Vec<String>,
    pub loaded: Vec<String>,
    pub unloaded: Vec<String>,
}

pub type Shared = Rc<RefCell<Recorder>>;

#[derive(Debug, Default, Clone, Copy)]
pub struct Faults {
    pub refuse_connection: bool,
    // 1-based index of the statement that fails
    pub fail_statement: Option<usize>,
    pub fail_transfer: bool,
}

pub struct FakeProvider {
    recorder: Shared,
    faults: Faults,
}

impl ConnectionProvider for FakeProvider {
    fn connect(&self, _params: &ConnectionParameters) -> LoaderResult<Box<dyn DatabaseConnection>> {
        self.recorder.borrow_mut().connects += 1;
        if self.faults.refuse_connection {
            return Err(LoaderError::Connection(SqlError::new("connection refused")));
        }
        Ok(Box::new(FakeConnection {
            recorder: self.recorder.clone(),
            fail_statement: self.faults.fail_statement,
        }))
    }
}

pub struct FakeConnection {
    recorder: Shared,
    fail_statement: Option<usize>,
}

impl DatabaseConnection for FakeConnection {
    fn execute(&mut self, sql: &str) -> Result<(), SqlError> {
        let mut recorder = self.recorder.borrow_mut();
        if self.fail_statement == Some(recorder.statements.len() + 1) {
            return Err(SqlError::new("syntax error"));
        }
        recorder.statements.push(sql.to_string());
        Ok(())
    }

    fn table_columns(&mut self, _table: &str) -> Result<Vec<String>, SqlError> {
        Ok(vec!["id".to_string()])
    }

    fn insert_row(&mut self, _: &str, _: &[String], _: &[Field]) -> Result<(), SqlError> {
        Ok(())
    }

    fn select_rows(&mut self, _: &str, _: &[String]) -> Result<Vec<Vec<Field>>, SqlError> {
        Ok(Vec::new())
    }

    fn close(self: Box<Self>) -> Result<(), SqlError> {
        self.recorder.borrow_mut().closes += 1;
        Ok(())
    }
}

pub struct FakeEngine {
    recorder: Shared,
    fail: bool,
}

impl FakeEngine {
    fn run(&self, resources: &[TableDataResource], unload: bool) -> LoaderResult<()> {
        if self.fail {
            let table = resources.first().map(|r| r.table()).unwrap_or("unknown");
            return Err(LoaderError::transfer(table, SqlError::new("row rejected")));
        }

        let tables = resources.iter().map(|r| r.table().to_string());
        let mut recorder = self.recorder.borrow_mut();
        if unload {
            recorder.unloaded.extend(tables);
        } else {
            recorder.loaded.extend(tables);
        }
        Ok(())
    }
}

impl TransferEngine for FakeEngine {
    fn load(
        &self,
        _connection: &mut dyn DatabaseConnection,
        resources: &[TableDataResource],
        log: &dyn LogSink,
    ) -> LoaderResult<()> {
        log.accept("fake load");
        self.run(resources, false)
    }

    fn unload(
        &self,
        _connection: &mut dyn DatabaseConnection,
        resources: &[TableDataResource],
        log: &dyn LogSink,
    ) -> LoaderResult<()> {
        log.accept("fake unload");
        self.run(resources, true)
    }
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub recorder: Shared,
    pub sink: Arc<CapturingSink>,
}

pub fn fake_orchestrator(faults: Faults) -> Harness {
    let recorder = Shared::default();
    let sink = Arc::new(CapturingSink::new());

    let orchestrator = Orchestrator::new(
        Box::new(FakeProvider {
            recorder: recorder.clone(),
            faults,
        }),
        Box::new(FakeEngine {
            recorder: recorder.clone(),
            fail: faults.fail_transfer,
        }),
        sink.clone(),
    );

    Harness {
        orchestrator,
        recorder,
        sink,
    }
}

// Writes a properties file pointing at the given url
pub fn write_properties(temp_dir: &TempDir, url: &str) -> PathBuf {
    let path = temp_dir.path().join("connection.properties");
    fs::write(&path, format!("# test connection\nurl={}\n", url))
        .expect("Failed to write properties file");
    path
}

// Creates a resource directory holding the given files
pub fn create_resource_dir(temp_dir: &TempDir, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = temp_dir.path().join(name);
    fs::create_dir_all(&dir).expect("Failed to create resource directory");
    for (file, content) in files {
        fs::write(dir.join(file), content).expect("Failed to write resource file");
    }
    dir
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read file")
}
