//! Byte-level CSV state machine
//!
//! One forward pass with a single byte of lookahead (for `\r\n`). The
//! recognized control bytes are `"`, `,`, `\r` and `\n`; everything else is
//! copied through untouched.
//!
//! Quoting is deliberately simple: a `"` toggles quoted mode and is never
//! stored, so `""` inside quotes closes and immediately reopens the quote
//! rather than producing a literal quote. Row breaks are only recognized
//! outside quotes, which means an unclosed quote swallows the rest of the
//! input (line breaks included) into one cell.
//!
//! Every buffer grows through `try_reserve_exact`, so running out of memory
//! surfaces as [`RescueError::AllocationFailure`]. Rows are committed to the
//! table before the next allocation is attempted, so a failure never takes
//! back rows that were already finished.

use crate::config::LoadOptions;
use crate::error::{RescueError, Result};
use crate::model::{Cell, Row, Table};

const INITIAL_CELL_CAPACITY: usize = 64;
const INITIAL_ROW_CELLS: usize = 16;

/// Byte budget shared by every cell of one load
#[derive(Debug)]
struct Budget {
    limit: Option<usize>,
    committed: usize,
}

impl Budget {
    fn new(options: &LoadOptions) -> Self {
        Self {
            limit: options.memory_limit,
            committed: 0,
        }
    }

    /// Check that a cell of `pending` bytes still fits
    fn check(&self, pending: usize) -> Result<()> {
        match self.limit {
            Some(limit) if self.committed.saturating_add(pending) > limit => {
                Err(RescueError::alloc("cell buffer", 1))
            }
            _ => Ok(()),
        }
    }

    fn commit(&mut self, bytes: usize) {
        self.committed = self.committed.saturating_add(bytes);
    }
}

/// Grow `buf` so it can hold `need` items, doubling from `initial`
fn grow<T>(buf: &mut Vec<T>, need: usize, initial: usize, what: &'static str) -> Result<()> {
    let cap = buf.capacity();
    if need <= cap {
        return Ok(());
    }
    let mut new_cap = cap.max(initial);
    while new_cap < need {
        new_cap = new_cap
            .checked_mul(2)
            .ok_or_else(|| RescueError::alloc(what, need))?;
    }
    let additional = new_cap - buf.len();
    buf.try_reserve_exact(additional)
        .map_err(|_| RescueError::alloc(what, additional))
}

/// Bytes of the cell currently being assembled
#[derive(Debug)]
pub(crate) struct CellBuffer {
    bytes: Vec<u8>,
}

impl CellBuffer {
    pub(crate) fn new() -> Result<Self> {
        let mut bytes = Vec::new();
        grow(&mut bytes, INITIAL_CELL_CAPACITY, INITIAL_CELL_CAPACITY, "cell buffer")?;
        Ok(Self { bytes })
    }

    fn push(&mut self, byte: u8, budget: &Budget) -> Result<()> {
        let need = self.bytes.len() + 1;
        budget.check(need)?;
        grow(&mut self.bytes, need, INITIAL_CELL_CAPACITY, "cell buffer")?;
        self.bytes.push(byte);
        Ok(())
    }

    /// Copy the contents out as an exactly-sized cell and reset the buffer.
    /// The buffer keeps its capacity for the next cell.
    fn take(&mut self) -> Result<Cell> {
        let mut owned = Vec::new();
        owned
            .try_reserve_exact(self.bytes.len())
            .map_err(|_| RescueError::alloc("cell", self.bytes.len()))?;
        owned.extend_from_slice(&self.bytes);
        self.bytes.clear();
        Ok(Cell::from(owned))
    }

    #[cfg(test)]
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Cells of the row currently being assembled
#[derive(Debug)]
pub(crate) struct RowBuilder {
    cells: Vec<Cell>,
}

impl RowBuilder {
    pub(crate) fn new() -> Result<Self> {
        let mut cells = Vec::new();
        grow(&mut cells, INITIAL_ROW_CELLS, INITIAL_ROW_CELLS, "row buffer")?;
        Ok(Self { cells })
    }

    fn push(&mut self, cell: Cell) -> Result<()> {
        let need = self.cells.len() + 1;
        grow(&mut self.cells, need, INITIAL_ROW_CELLS, "row buffer")?;
        self.cells.push(cell);
        Ok(())
    }

    /// Hand the cells over as a finished row, leaving this builder unusable
    /// until [`RowBuilder::new`] replaces it
    fn finish(&mut self) -> Row {
        Row::new(std::mem::take(&mut self.cells))
    }
}

/// Parser state for one load into a table
struct Scanner<'t> {
    table: &'t mut Table,
    cell: CellBuffer,
    row: RowBuilder,
    budget: Budget,
    in_quote: bool,
}

impl<'t> Scanner<'t> {
    fn new(table: &'t mut Table, options: &LoadOptions) -> Result<Self> {
        table.ensure_row_capacity(table.row_count() + 1)?;
        Ok(Self {
            table,
            cell: CellBuffer::new()?,
            row: RowBuilder::new()?,
            budget: Budget::new(options),
            in_quote: false,
        })
    }

    fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.cell.push(byte, &self.budget)
    }

    /// Move the accumulated cell (possibly empty) onto the row
    fn end_cell(&mut self) -> Result<()> {
        let cell = self.cell.take()?;
        let len = cell.len();
        self.row.push(cell)?;
        self.budget.commit(len);
        Ok(())
    }

    /// Commit the current row to the table
    fn end_row(&mut self) -> Result<()> {
        self.end_cell()?;
        self.table.append_row(self.row.finish())
    }

    fn run(mut self, data: &[u8]) -> Result<()> {
        let mut i = 0;

        while i < data.len() {
            let ch = data[i];

            if self.in_quote {
                match ch {
                    b'"' => {
                        self.in_quote = false;
                        i += 1;
                    }
                    b'\r' | b'\n' => {
                        self.push_byte(b'\n')?;
                        i += line_break_len(data, i);
                    }
                    _ => {
                        self.push_byte(ch)?;
                        i += 1;
                    }
                }
                continue;
            }

            match ch {
                b'"' => {
                    self.in_quote = true;
                    i += 1;
                }
                b',' => {
                    self.end_cell()?;
                    i += 1;
                }
                b'\r' | b'\n' => {
                    self.end_row()?;
                    // the finished row is already in the table; a failure
                    // here only loses the row that has not started yet
                    self.row = RowBuilder::new()?;
                    i += line_break_len(data, i);
                }
                _ => {
                    self.push_byte(ch)?;
                    i += 1;
                }
            }
        }

        // last row is pushed even when empty or still inside a quote
        self.in_quote = false;
        self.end_row()
    }
}

/// Length of the line break at `i`: 2 for `\r\n`, otherwise 1
fn line_break_len(data: &[u8], i: usize) -> usize {
    if data[i] == b'\r' && data.get(i + 1) == Some(&b'\n') {
        2
    } else {
        1
    }
}

/// Parse `data` and append its rows to `table`.
///
/// On error, rows completed before the failure stay in `table`; the row in
/// progress is dropped.
pub(crate) fn scan_into(table: &mut Table, data: &[u8], options: &LoadOptions) -> Result<()> {
    Scanner::new(table, options)?.run(data)
}
