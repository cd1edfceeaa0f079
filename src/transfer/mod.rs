pub mod processor;

pub use processor::CsvProcessor;

use crate::LoaderResult;
use crate::db::DatabaseConnection;
use crate::logging::LogSink;
use crate::resource::TableDataResource;

/// Moves rows between table data files and database tables.
///
/// Resources are processed in the order given; the first failure aborts the
/// rest of the transfer.
pub trait TransferEngine {
    /// Inserts the rows of every resource file into its table.
    fn load(
        &self,
        connection: &mut dyn DatabaseConnection,
        resources: &[TableDataResource],
        log: &dyn LogSink,
    ) -> LoaderResult<()>;

    /// Writes the current rows of every table into its resource file,
    /// replacing what the file held.
    fn unload(
        &self,
        connection: &mut dyn DatabaseConnection,
        resources: &[TableDataResource],
        log: &dyn LogSink,
    ) -> LoaderResult<()>;
}
