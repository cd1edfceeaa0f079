use crate::config::{ConnectionParameters, PropertyLoader};
use crate::db::{ConnectionProvider, DatabaseConnection};
use crate::logging::LogSink;
use crate::resource::ResourceFinder;
use crate::script::SqlScriptExecutor;
use crate::transfer::TransferEngine;
use crate::{LoaderError, LoaderResult};
use std::path::Path;
use std::sync::Arc;

/// Exclusive owner of the workflow's connection.
///
/// The connection is closed exactly once: by `release` on the normal path,
/// or on drop when the workflow bails out early.
pub struct ScopedConnection {
    connection: Option<Box<dyn DatabaseConnection>>,
}

impl ScopedConnection {
    pub fn new(connection: Box<dyn DatabaseConnection>) -> Self {
        Self {
            connection: Some(connection),
        }
    }

    pub fn get(&mut self) -> &mut dyn DatabaseConnection {
        // Only `release` and `drop` take the connection, and both consume the guard
        self.connection
            .as_deref_mut()
            .unwrap_or_else(|| unreachable!("connection used after release"))
    }

    pub fn release(mut self) -> LoaderResult<()> {
        match self.connection.take() {
            Some(connection) => connection.close().map_err(LoaderError::Connection),
            None => Ok(()),
        }
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.close() {
                tracing::warn!(error = %e, "failed to close database connection");
            }
        }
    }
}

// Wires the collaborators into the load and unload workflows
pub struct Orchestrator {
    property_loader: PropertyLoader,
    provider: Box<dyn ConnectionProvider>,
    script_executor: SqlScriptExecutor,
    resource_finder: ResourceFinder,
    engine: Box<dyn TransferEngine>,
    log: Arc<dyn LogSink>,
}

impl Orchestrator {
    pub fn new(
        provider: Box<dyn ConnectionProvider>,
        engine: Box<dyn TransferEngine>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            property_loader: PropertyLoader::new(),
            provider,
            script_executor: SqlScriptExecutor::new(),
            resource_finder: ResourceFinder::new(),
            engine,
            log,
        }
    }

    // ParseConfig -> Connect -> RunScripts -> DiscoverResources -> Transfer -> Release
    pub fn load(&self, properties: &Path, resource_dir: &Path) -> LoaderResult<()> {
        let params = self.property_loader.load_properties(properties)?;
        let log = self.log.as_ref();

        self.with_connection(&params, |connection| {
            let statements =
                self.script_executor
                    .execute_sql_scripts(connection, resource_dir, log)?;
            tracing::debug!(statements, "setup scripts finished");

            let resources = self.resource_finder.find_table_data_resources(resource_dir)?;
            log.accept(&format!(
                "Loading {} tables from {}",
                resources.len(),
                resource_dir.display()
            ));
            self.engine.load(connection, &resources, log)
        })?;

        log.accept("Load completed");
        Ok(())
    }

    // ParseConfig -> Connect -> DiscoverResources -> Transfer -> Release
    pub fn unload(&self, properties: &Path, resource_dir: &Path) -> LoaderResult<()> {
        let params = self.property_loader.load_properties(properties)?;
        let log = self.log.as_ref();

        self.with_connection(&params, |connection| {
            let resources = self.resource_finder.find_table_data_resources(resource_dir)?;
            log.accept(&format!(
                "Unloading {} tables to {}",
                resources.len(),
                resource_dir.display()
            ));
            self.engine.unload(connection, &resources, log)
        })?;

        log.accept("Unload completed");
        Ok(())
    }

    // Acquire, run body, always release. A body error wins over a close error.
    fn with_connection<T, F>(&self, params: &ConnectionParameters, body: F) -> LoaderResult<T>
    where
        F: FnOnce(&mut dyn DatabaseConnection) -> LoaderResult<T>,
    {
        let mut scoped = ScopedConnection::new(self.provider.connect(params)?);
        tracing::debug!("database connection acquired");

        match body(scoped.get()) {
            Ok(value) => {
                scoped.release()?;
                tracing::debug!("database connection released");
                Ok(value)
            }
            Err(e) => {
                drop(scoped);
                Err(e)
            }
        }
    }
}
