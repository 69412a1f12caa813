//! Sorted key index over table rows

use std::ops::Range;

use tracing::debug;

use super::table::Table;

/// One (key, row) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIndexEntry {
    /// Key bytes, compared byte-wise
    pub key: Vec<u8>,
    /// Row number in the table the index was built from
    pub row: usize,
}

/// Sorted array of (key, row) pairs with binary-search lookups.
///
/// Keys are added in any order and become searchable once [`sort`] has run.
/// Lookups on an unsorted index are not detected and give meaningless results.
/// The index only stores row numbers, so it is tied to the table it was built
/// from; [`is_current_for`] tells whether that table has since been reloaded.
///
/// [`sort`]: KeyIndex::sort
/// [`is_current_for`]: KeyIndex::is_current_for
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    entries: Vec<KeyIndexEntry>,
    table_generation: Option<u64>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sorted index for every row from `first_row` on.
    ///
    /// `key_fn` returns `None` for rows that should not be indexed.
    pub fn build<F>(table: &Table, first_row: usize, mut key_fn: F) -> Self
    where
        F: FnMut(&Table, usize) -> Option<Vec<u8>>,
    {
        let mut index = Self::new();
        for row in first_row..table.row_count() {
            if let Some(key) = key_fn(table, row) {
                index.add_key(row, key);
            }
        }
        index.sort();
        index.table_generation = Some(table.generation());
        debug!(
            entries = index.len(),
            rows = table.row_count(),
            first_row,
            "built key index"
        );
        index
    }

    /// Remove all entries
    pub fn clear_index(&mut self) {
        self.entries.clear();
        self.table_generation = None;
    }

    /// Append a key for `row`. Order, duplicates and row validity are not checked.
    pub fn add_key(&mut self, row: usize, key: impl Into<Vec<u8>>) {
        self.entries.push(KeyIndexEntry {
            key: key.into(),
            row,
        });
    }

    /// Sort entries by key, byte-wise ascending. Equal keys keep their
    /// insertion order.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.key.cmp(&b.key));
        debug!(entries = self.entries.len(), "sorted key index");
    }

    /// First index whose key is `>= key`
    fn lower_bound(&self, key: &[u8]) -> usize {
        self.entries.partition_point(|e| e.key.as_slice() < key)
    }

    /// First index whose key is `> key`
    fn upper_bound(&self, key: &[u8]) -> usize {
        self.entries.partition_point(|e| e.key.as_slice() <= key)
    }

    /// Row of the first entry equal to `key`
    pub fn find(&self, key: impl AsRef<[u8]>) -> Option<usize> {
        let key = key.as_ref();
        let lb = self.lower_bound(key);
        self.entries
            .get(lb)
            .filter(|e| e.key == key)
            .map(|e| e.row)
    }

    /// Half-open range of entry positions whose key equals `key`.
    /// Empty (`start == end`) when there is no match.
    pub fn find_range(&self, key: impl AsRef<[u8]>) -> Range<usize> {
        let key = key.as_ref();
        let lb = self.lower_bound(key);
        if self.entries.get(lb).map_or(true, |e| e.key != key) {
            return lb..lb;
        }
        lb..self.upper_bound(key)
    }

    /// Rows for every entry equal to `key`, in sorted-entry order
    pub fn find_rows(&self, key: impl AsRef<[u8]>) -> Vec<usize> {
        self.entries[self.find_range(key)]
            .iter()
            .map(|e| e.row)
            .collect()
    }

    /// False unless this index was built by [`KeyIndex::build`] from `table`
    /// and the table has not been cleared or reloaded since
    pub fn is_current_for(&self, table: &Table) -> bool {
        self.table_generation == Some(table.generation())
    }

    pub fn entries(&self) -> &[KeyIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
