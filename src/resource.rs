use crate::{LoaderError, LoaderResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const TABLE_DATA_EXTENSION: &str = "csv";

// A target table paired with the file that holds its rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDataResource {
    table: String,
    path: PathBuf,
}

impl TableDataResource {
    pub fn new(table: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            table: table.into(),
            path: path.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Finds the table data files of a resource directory.
///
/// Only the immediate entries of the directory are considered. The returned
/// order is the file-name order and becomes the transfer order. Foreign keys
/// are not analysed: a child table whose name sorts before its parent is
/// loaded first.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResourceFinder;

impl ResourceFinder {
    pub fn new() -> Self {
        Self
    }

    pub fn find_table_data_resources(&self, dir: &Path) -> LoaderResult<Vec<TableDataResource>> {
        let resources = list_files_with_extension(dir, TABLE_DATA_EXTENSION)?
            .into_iter()
            .filter_map(|path| {
                let table = path.file_stem()?.to_str()?.to_string();
                Some(TableDataResource::new(table, path))
            })
            .collect::<Vec<_>>();

        tracing::debug!(dir = %dir.display(), count = resources.len(), "found table data resources");
        Ok(resources)
    }
}

// Immediate regular files of `dir` with the given extension (any case), sorted by file name
pub(crate) fn list_files_with_extension(dir: &Path, extension: &str) -> LoaderResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| LoaderError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoaderError::io(dir, e))?;
        let path = entry.path();

        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
