//! Output formatting for loaded tables and lookups

mod json;
mod terminal;

use std::io::{IsTerminal, Write};
use std::path::Path;

use anyhow::Result;

use crate::config::OutputFormat;
use crate::model::{KeyIndex, Table};

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Result of a key lookup against a loaded table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Lookup key after normalization, as raw bytes
    pub key: Vec<u8>,
    /// Row returned by a single-hit find
    pub first: Option<usize>,
    /// Every row with an equal key, in index order
    pub rows: Vec<usize>,
}

impl Lookup {
    /// Search a sorted index with an already-built key
    pub fn from_index(index: &KeyIndex, key: Vec<u8>) -> Self {
        let first = index.find(&key);
        let rows = index.find_rows(&key);
        Self { key, first, rows }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render every row and column of a table
    fn render_dump(&self, table: &Table, path: &Path, writer: &mut dyn Write) -> Result<()>;

    /// Render the rows hit by a lookup
    fn render_lookup(
        &self,
        lookup: &Lookup,
        table: &Table,
        path: &Path,
        writer: &mut dyn Write,
    ) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter; terminal output is colored only on a tty
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => {
                Box::new(TerminalOutput::with_color(std::io::stdout().is_terminal()))
            }
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Write `bytes` with line breaks and tabs shown as escapes
pub(crate) fn write_escaped<W>(writer: &mut W, bytes: &[u8]) -> std::io::Result<()>
where
    W: Write + ?Sized,
{
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escape: &[u8] = match b {
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            _ => continue,
        };
        writer.write_all(&bytes[start..i])?;
        writer.write_all(escape)?;
        start = i + 1;
    }
    writer.write_all(&bytes[start..])
}
