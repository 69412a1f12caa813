//! Configuration handling for csv-rescue

use std::path::PathBuf;

use crate::model::KeyBuilder;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Options controlling a single load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Upper bound on cell bytes held by one load (committed cells plus the
    /// cell being assembled). `None` leaves it to the allocator.
    pub memory_limit: Option<usize>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the cell bytes a load may hold
    pub fn with_memory_limit(mut self, limit: usize) -> Self {
        self.memory_limit = Some(limit);
        self
    }
}

/// Configuration for a CLI run
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// CSV file to load
    pub input: PathBuf,
    /// Output format
    pub output_format: OutputFormat,
    /// Leading rows excluded from the key index (headers)
    pub skip_rows: usize,
    /// How index keys are built from a row
    pub key: Option<KeyBuilder>,
    /// Options passed to the loader
    pub load: LoadOptions,
}

impl Config {
    /// Create a new Config for an input file
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            skip_rows: 1,
            ..Default::default()
        }
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the number of header rows to leave out of the index
    pub fn with_skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    /// Set the key layout
    pub fn with_key(mut self, key: KeyBuilder) -> Self {
        self.key = Some(key);
        self
    }

    /// Cap memory used by the load
    pub fn with_memory_limit(mut self, limit: usize) -> Self {
        self.load = self.load.with_memory_limit(limit);
        self
    }
}
