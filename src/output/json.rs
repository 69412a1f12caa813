//! JSON output format

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::model::{Cell, Table};

use super::{Lookup, OutputFormatter};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    #[cfg(test)]
    fn compact() -> Self {
        Self { pretty: false }
    }

    fn write<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, value)?;
        } else {
            serde_json::to_writer(&mut *writer, value)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonDump<'a> {
    file: String,
    row_count: usize,
    column_count: usize,
    rows: Vec<&'a [Cell]>,
}

#[derive(Serialize)]
struct JsonMatch<'a> {
    row: usize,
    cells: &'a [Cell],
}

#[derive(Serialize)]
struct JsonLookup<'a> {
    file: String,
    key: Cow<'a, str>,
    found: Option<usize>,
    matches: Vec<JsonMatch<'a>>,
}

fn row_cells(table: &Table, row: usize) -> &[Cell] {
    table.row(row).map(|r| r.cells()).unwrap_or(&[])
}

impl OutputFormatter for JsonOutput {
    fn render_dump(&self, table: &Table, path: &Path, writer: &mut dyn Write) -> Result<()> {
        let output = JsonDump {
            file: path.display().to_string(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            rows: table.rows().map(|r| r.cells()).collect(),
        };
        self.write(&output, writer)
    }

    fn render_lookup(
        &self,
        lookup: &Lookup,
        table: &Table,
        path: &Path,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let output = JsonLookup {
            file: path.display().to_string(),
            key: String::from_utf8_lossy(&lookup.key),
            found: lookup.first,
            matches: lookup
                .rows
                .iter()
                .map(|&row| JsonMatch {
                    row,
                    cells: row_cells(table, row),
                })
                .collect(),
        };
        self.write(&output, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_dump_json() {
        let table = parse(b"a,b\n\"x\r\ny\"").unwrap();
        let mut out = Vec::new();
        JsonOutput::compact()
            .render_dump(&table, Path::new("in.csv"), &mut out)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["file"], "in.csv");
        assert_eq!(value["row_count"], 2);
        assert_eq!(value["column_count"], 2);
        assert_eq!(value["rows"][0], serde_json::json!(["a", "b"]));
        assert_eq!(value["rows"][1], serde_json::json!(["x\ny"]));
    }

    #[test]
    fn test_lookup_json() {
        let table = parse(b"id,v\n7,a\n7,b").unwrap();
        let lookup = Lookup {
            key: b"000007".to_vec(),
            first: Some(1),
            rows: vec![1, 2],
        };
        let mut out = Vec::new();
        JsonOutput::new()
            .render_lookup(&lookup, &table, Path::new("in.csv"), &mut out)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["key"], "000007");
        assert_eq!(value["found"], 1);
        assert_eq!(value["matches"][1]["row"], 2);
        assert_eq!(value["matches"][1]["cells"], serde_json::json!(["7", "b"]));
    }
}
