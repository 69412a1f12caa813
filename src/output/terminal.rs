//! Plain terminal output, colored when writing to a tty

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use termcolor::{Ansi, Color, ColorSpec, NoColor, WriteColor};

use crate::model::Table;

use super::{write_escaped, Lookup, OutputFormatter};

/// Terminal output with optional colors
pub struct TerminalOutput {
    color: bool,
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self { color: false }
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn with_writer<F>(&self, writer: &mut dyn Write, f: F) -> Result<()>
    where
        F: FnOnce(&mut dyn WriteColor) -> Result<()>,
    {
        if self.color {
            f(&mut Ansi::new(writer))
        } else {
            f(&mut NoColor::new(writer))
        }
    }

    fn write_heading(&self, writer: &mut dyn WriteColor, text: &str) -> Result<()> {
        writer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(writer, "{}", text)?;
        writer.reset()?;
        writeln!(writer)?;
        Ok(())
    }

    /// One `col N = "..."` line per column up to the table width
    fn write_row_columns(
        &self,
        table: &Table,
        row: usize,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        for col in 0..table.column_count() {
            write!(writer, "  col {} = \"", col)?;
            write_escaped(writer, table.get(row, col).as_bytes())?;
            writeln!(writer, "\"")?;
        }
        Ok(())
    }

    /// All cells of a row on a single line
    fn write_row_inline(
        &self,
        table: &Table,
        row: usize,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        write!(writer, "  row={}:", row)?;
        for col in 0..table.column_count() {
            let sep = if col == 0 { " " } else { ", " };
            write!(writer, "{}\"", sep)?;
            write_escaped(writer, table.get(row, col).as_bytes())?;
            write!(writer, "\"")?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl OutputFormatter for TerminalOutput {
    fn render_dump(&self, table: &Table, _path: &Path, writer: &mut dyn Write) -> Result<()> {
        self.with_writer(writer, |w| {
            writeln!(
                w,
                "rows={}, max_cols={}",
                table.row_count(),
                table.column_count()
            )?;
            for row in 0..table.row_count() {
                self.write_heading(w, &format!("[row {}]", row))?;
                self.write_row_columns(table, row, w)?;
            }
            Ok(())
        })
    }

    fn render_lookup(
        &self,
        lookup: &Lookup,
        table: &Table,
        _path: &Path,
        writer: &mut dyn Write,
    ) -> Result<()> {
        self.with_writer(writer, |w| {
            write!(w, "find_key=\"")?;
            write_escaped(w, &lookup.key)?;
            writeln!(w, "\"")?;
            writeln!(w)?;

            match lookup.first {
                Some(row) => {
                    self.write_heading(w, &format!("[Find] hit row={}", row))?;
                    self.write_row_columns(table, row, w)?;
                }
                None => self.write_heading(w, "[Find] not found")?,
            }
            writeln!(w)?;

            self.write_heading(w, &format!("[FindRows] count={}", lookup.rows.len()))?;
            for &row in &lookup.rows {
                self.write_row_inline(table, row, w)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn render_dump(table: &Table) -> String {
        let mut out = Vec::new();
        TerminalOutput::new()
            .render_dump(table, Path::new("t.csv"), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_dump_pads_short_rows() {
        let table = parse(b"a,\"x\ny\"\n1").unwrap();
        let text = render_dump(&table);
        assert_eq!(
            text,
            "rows=2, max_cols=2\n\
             [row 0]\n  col 0 = \"a\"\n  col 1 = \"x\\ny\"\n\
             [row 1]\n  col 0 = \"1\"\n  col 1 = \"\"\n"
        );
    }

    #[test]
    fn test_lookup_output() {
        let table = parse(b"id,v\n1,a\n2,b\n1,c").unwrap();
        let lookup = Lookup {
            key: b"1".to_vec(),
            first: Some(1),
            rows: vec![1, 3],
        };
        let mut out = Vec::new();
        TerminalOutput::new()
            .render_lookup(&lookup, &table, Path::new("t.csv"), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("find_key=\"1\"\n"));
        assert!(text.contains("[Find] hit row=1\n  col 0 = \"1\"\n  col 1 = \"a\"\n"));
        assert!(text.contains(
            "[FindRows] count=2\n  row=1: \"1\", \"a\"\n  row=3: \"1\", \"c\"\n"
        ));
    }

    #[test]
    fn test_lookup_not_found() {
        let table = parse(b"id\n1").unwrap();
        let lookup = Lookup {
            key: b"9".to_vec(),
            first: None,
            rows: Vec::new(),
        };
        let mut out = Vec::new();
        TerminalOutput::new()
            .render_lookup(&lookup, &table, Path::new("t.csv"), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[Find] not found\n"));
        assert!(text.contains("[FindRows] count=0\n"));
    }
}
