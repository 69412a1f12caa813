//! Loading raw CSV bytes into a [`Table`]

mod scanner;

use std::path::Path;

use tracing::{debug, warn};

use crate::config::LoadOptions;
use crate::error::{RescueError, Result};
use crate::model::Table;

impl Table {
    /// Replace the table contents with the rows parsed from `data`.
    ///
    /// Empty input is an error. If parsing runs out of memory, the rows
    /// finished before that point are kept and the error is returned.
    pub fn load_from_memory(&mut self, data: &[u8], options: &LoadOptions) -> Result<()> {
        self.clear();
        if data.is_empty() {
            return Err(RescueError::EmptyInput);
        }

        let result = scanner::scan_into(self, data, options);
        match &result {
            Ok(()) => debug!(
                bytes = data.len(),
                rows = self.row_count(),
                columns = self.column_count(),
                "loaded csv"
            ),
            Err(e) => warn!(
                bytes = data.len(),
                rows_kept = self.row_count(),
                error = %e,
                "csv load stopped early"
            ),
        }
        result
    }

    /// Read a whole file and load it with [`Table::load_from_memory`]
    pub fn load_from_file(&mut self, path: impl AsRef<Path>, options: &LoadOptions) -> Result<()> {
        let path = path.as_ref();
        self.clear();

        let data = std::fs::read(path).map_err(|source| RescueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = data.len(), "read csv file");

        self.load_from_memory(&data, options)
    }
}

/// Parse `data` into a new table with default options.
///
/// Use [`Table::load_from_memory`] to keep the partial table on failure.
pub fn parse(data: &[u8]) -> Result<Table> {
    parse_with(data, &LoadOptions::default())
}

/// Parse `data` into a new table
pub fn parse_with(data: &[u8], options: &LoadOptions) -> Result<Table> {
    let mut table = Table::new();
    table.load_from_memory(data, options)?;
    Ok(table)
}

/// Load a file into a new table
pub fn load_file(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Table> {
    let mut table = Table::new();
    table.load_from_file(path, options)?;
    Ok(table)
}
