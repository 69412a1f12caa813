//! csv-rescue - Fault-tolerant CSV loading with a sorted key index
//!
//! Loads CSV that is a little broken (ragged rows, stray quotes, line breaks
//! inside cells) without rejecting it, then lets callers index rows by a
//! normalized key for exact and range lookups.

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;

pub use config::{Config, LoadOptions};
pub use error::{RescueError, Result};
pub use model::{Cell, KeyBuilder, KeyIndex, Row, Table};
pub use parser::{load_file, parse, parse_with};
