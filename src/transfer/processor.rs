use super::TransferEngine;
use crate::db::{DatabaseConnection, Field};
use crate::logging::LogSink;
use crate::resource::TableDataResource;
use crate::{LoaderError, LoaderResult, TransferFault};
use std::fs::File;

// Header-first delimited files. Empty fields load as NULL and NULL unloads as
// an empty field, so an empty string does not survive a round trip.
#[derive(Debug, Clone)]
pub struct CsvProcessor {
    delimiter: u8,
}

impl Default for CsvProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvProcessor {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn load_table(
        &self,
        connection: &mut dyn DatabaseConnection,
        resource: &TableDataResource,
    ) -> LoaderResult<usize> {
        let table = resource.table();
        let file = File::open(resource.path()).map_err(|e| LoaderError::io(resource.path(), e))?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| LoaderError::transfer(table, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        if columns.is_empty() {
            tracing::debug!(%table, "empty data file, nothing to load");
            return Ok(0);
        }

        let mut count = 0;
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| LoaderError::transfer(table, e))?;

            if record.len() != columns.len() {
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(index as u64 + 2);
                return Err(LoaderError::transfer(
                    table,
                    TransferFault::Width {
                        line,
                        expected: columns.len(),
                        found: record.len(),
                    },
                ));
            }

            let values: Vec<Field> = record
                .iter()
                .map(|f| if f.is_empty() { None } else { Some(f.to_string()) })
                .collect();

            connection
                .insert_row(table, &columns, &values)
                .map_err(|e| LoaderError::transfer(table, e))?;
            count += 1;
        }

        Ok(count)
    }

    pub fn unload_table(
        &self,
        connection: &mut dyn DatabaseConnection,
        resource: &TableDataResource,
    ) -> LoaderResult<usize> {
        let table = resource.table();
        let columns = connection
            .table_columns(table)
            .map_err(|e| LoaderError::transfer(table, e))?;
        let rows = connection
            .select_rows(table, &columns)
            .map_err(|e| LoaderError::transfer(table, e))?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(resource.path())
            .map_err(|e| LoaderError::transfer(table, e))?;

        writer
            .write_record(&columns)
            .map_err(|e| LoaderError::transfer(table, e))?;
        for row in &rows {
            writer
                .write_record(row.iter().map(|f| f.as_deref().unwrap_or("")))
                .map_err(|e| LoaderError::transfer(table, e))?;
        }
        writer.flush().map_err(|e| LoaderError::transfer(table, e))?;

        Ok(rows.len())
    }
}

impl TransferEngine for CsvProcessor {
    fn load(
        &self,
        connection: &mut dyn DatabaseConnection,
        resources: &[TableDataResource],
        log: &dyn LogSink,
    ) -> LoaderResult<()> {
        for resource in resources {
            let count = self.load_table(connection, resource)?;
            log.accept(&format!(
                "Loaded {} rows into {} from {}",
                count,
                resource.table(),
                resource.path().display()
            ));
        }
        Ok(())
    }

    fn unload(
        &self,
        connection: &mut dyn DatabaseConnection,
        resources: &[TableDataResource],
        log: &dyn LogSink,
    ) -> LoaderResult<()> {
        for resource in resources {
            let count = self.unload_table(connection, resource)?;
            log.accept(&format!(
                "Unloaded {} rows from {} to {}",
                count,
                resource.table(),
                resource.path().display()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FatalCategory;
    use crate::db::SqliteConnection;
    use crate::logging::CapturingSink;
    use std::fs;
    use tempfile::tempdir;

    fn connection_with(sql: &str) -> SqliteConnection {
        let mut conn = SqliteConnection::new(rusqlite::Connection::open_in_memory().unwrap());
        conn.execute(sql).unwrap();
        conn
    }

    #[test]
    fn test_load_inserts_rows_with_nulls() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("customers.csv");
        fs::write(&path, "id,name,email\n1,Alice,alice@example.com\n2,Bob,\n").unwrap();

        let mut conn =
            connection_with("CREATE TABLE customers (id INTEGER, name TEXT, email TEXT)");
        let resource = TableDataResource::new("customers", &path);
        let sink = CapturingSink::new();

        CsvProcessor::new()
            .load(&mut conn, std::slice::from_ref(&resource), &sink)
            .unwrap();

        let columns = conn.table_columns("customers").unwrap();
        let rows = conn.select_rows("customers", &columns).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec![Some("2".to_string()), Some("Bob".to_string()), None]);
        assert!(sink.contains("Loaded 2 rows into customers"));
    }

    #[test]
    fn test_load_rejects_short_record() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("items.csv");
        fs::write(&path, "id,name\n1,pen\n2\n3,ink\n").unwrap();

        let mut conn = connection_with("CREATE TABLE items (id INTEGER, name TEXT)");
        let err = CsvProcessor::new()
            .load_table(&mut conn, &TableDataResource::new("items", &path))
            .unwrap_err();

        assert_eq!(err.category(), FatalCategory::Io);
        assert!(err.to_string().contains("line 3 has 1 fields"));
    }

    #[test]
    fn test_load_into_missing_table_is_state_failure() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("ghosts.csv");
        fs::write(&path, "id\n1\n").unwrap();

        let mut conn = connection_with("CREATE TABLE other (id INTEGER)");
        let err = CsvProcessor::new()
            .load_table(&mut conn, &TableDataResource::new("ghosts", &path))
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Transfer);
        assert_eq!(err.category(), FatalCategory::State);
    }

    #[test]
    fn test_unload_overwrites_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("items.csv");
        fs::write(&path, "stale content that must disappear\n").unwrap();

        let mut conn = connection_with(
            "CREATE TABLE items (id INTEGER, name TEXT);\
             INSERT INTO items VALUES (1, 'pen');\
             INSERT INTO items VALUES (2, NULL);",
        );
        let sink = CapturingSink::new();

        CsvProcessor::new()
            .unload(&mut conn, &[TableDataResource::new("items", &path)], &sink)
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "id,name\n1,pen\n2,\n");
        assert!(sink.contains("Unloaded 2 rows from items"));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("items.csv");
        fs::write(&path, "id;name\n1;pen, blue\n").unwrap();

        let mut conn = connection_with("CREATE TABLE items (id INTEGER, name TEXT)");
        let count = CsvProcessor::new()
            .with_delimiter(b';')
            .load_table(&mut conn, &TableDataResource::new("items", &path))
            .unwrap();

        assert_eq!(count, 1);
        let rows = conn.select_rows("items", &["name".to_string()]).unwrap();
        assert_eq!(rows, vec![vec![Some("pen, blue".to_string())]]);
    }
}
