//! Table, Row, and Cell data structures

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Serializer};

use crate::error::{RescueError, Result};

/// Initial row capacity once the first row arrives
const INITIAL_ROW_CAPACITY: usize = 64;

static EMPTY_CELL: Cell = Cell(Vec::new());

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Raw cell contents.
///
/// Bytes are kept verbatim (no encoding is assumed), except that line breaks
/// inside quoted cells have been normalized to a single `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell(Vec<u8>);

impl Cell {
    /// The shared empty cell returned for out-of-range reads
    pub fn empty() -> &'static Cell {
        &EMPTY_CELL
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode as UTF-8, replacing invalid sequences
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Cell {
    fn from(bytes: Vec<u8>) -> Self {
        Cell(bytes)
    }
}

impl From<&[u8]> for Cell {
    fn from(bytes: &[u8]) -> Self {
        Cell(bytes.to_vec())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell(s.as_bytes().to_vec())
    }
}

impl PartialEq<str> for Cell {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Cell {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<[u8]> for Cell {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_str_lossy())
    }
}

/// A row in the table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Get a cell by column index
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row::new(cells)
    }
}

/// Loaded rows plus the widest row seen so far.
///
/// Rows are only ever appended or dropped wholesale; nothing is edited in
/// place. Each `clear` moves the table to a new generation so that a
/// [`KeyIndex`](super::KeyIndex) built earlier can tell it is stale.
#[derive(Debug, Clone)]
pub struct Table {
    rows: Vec<Row>,
    max_cols: usize,
    generation: u64,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            max_cols: 0,
            generation: next_generation(),
        }
    }

    /// Drop every row and reset the column count
    pub fn clear(&mut self) {
        self.rows = Vec::new();
        self.max_cols = 0;
        self.generation = next_generation();
    }

    /// Append a finished row, taking ownership of its cells.
    ///
    /// If the row array cannot grow, the row is dropped and the rows already
    /// stored are left as they were.
    pub fn append_row(&mut self, row: Row) -> Result<()> {
        self.ensure_row_capacity(self.rows.len() + 1)?;
        self.max_cols = self.max_cols.max(row.len());
        self.rows.push(row);
        Ok(())
    }

    /// Grow the row array by doubling, starting at 64
    pub(crate) fn ensure_row_capacity(&mut self, need: usize) -> Result<()> {
        let cap = self.rows.capacity();
        if need <= cap {
            return Ok(());
        }

        let mut new_cap = cap.max(INITIAL_ROW_CAPACITY);
        while new_cap < need {
            new_cap = new_cap
                .checked_mul(2)
                .ok_or_else(|| RescueError::alloc("row array", need))?;
        }

        let additional = new_cap - self.rows.len();
        self.rows
            .try_reserve_exact(additional)
            .map_err(|_| RescueError::alloc("row array", additional))
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row observed
    pub fn column_count(&self) -> usize {
        self.max_cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `col`), or the empty cell when either index is out of
    /// range. Short rows read as empty for their missing trailing columns.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(Cell::empty())
    }

    /// Get a row by index
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Identifier of the current contents; changes on every clear or reload
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
