//! csv-rescue - Load broken-ish CSV and look rows up by key

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use csv_rescue::config::{Config, OutputFormat};
use csv_rescue::model::{KeyBuilder, KeyIndex, Table};
use csv_rescue::output::{Lookup, OutputFactory};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Load CSV that may be malformed, without giving up on it
#[derive(Parser, Debug)]
#[command(name = "csv-rescue")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every cell of the file
    Dump {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Index rows by key and look one key up
    Lookup {
        #[command(flatten)]
        common: CommonArgs,

        /// Key layout: COL[:KIND[:WIDTH[:PAD]]],... (kinds: raw, digits, left, right)
        #[arg(short, long)]
        key: KeyBuilder,

        /// Values to look up, one per key part (comma-separated)
        #[arg(long, value_delimiter = ',')]
        find: Vec<String>,

        /// Leading rows left out of the index
        #[arg(long, default_value_t = 1)]
        skip_rows: usize,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// CSV file to load
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Stop loading once cells hold this many bytes
    #[arg(long)]
    memory_limit: Option<usize>,
}

impl CommonArgs {
    fn config(&self) -> Config {
        let config = Config::new(self.file.clone()).with_output_format(self.format.into());
        match self.memory_limit {
            Some(limit) => config.with_memory_limit(limit),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1), // key not found
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "csv_rescue=debug" } else { "csv_rescue=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(config: &Config) -> Result<Table> {
    let mut table = Table::new();
    table
        .load_from_file(&config.input, &config.load)
        .with_context(|| format!("Failed to load {}", config.input.display()))?;
    Ok(table)
}

fn run(command: Command) -> Result<bool> {
    let mut stdout = std::io::stdout().lock();

    match command {
        Command::Dump { common } => {
            let config = common.config();
            let table = load(&config)?;
            OutputFactory::create(config.output_format).render_dump(
                &table,
                &config.input,
                &mut stdout,
            )?;
            Ok(true)
        }
        Command::Lookup {
            common,
            key,
            find,
            skip_rows,
        } => {
            let config = common.config().with_skip_rows(skip_rows).with_key(key);
            let table = load(&config)?;
            let key = config.key.as_ref().context("key layout is required")?;

            let index = KeyIndex::build(&table, config.skip_rows, |t, row| {
                Some(key.build_key(t, row))
            });
            let lookup = Lookup::from_index(&index, key.build_lookup_key(&find));
            info!(key = %String::from_utf8_lossy(&lookup.key), hits = lookup.rows.len(), "lookup done");

            OutputFactory::create(config.output_format).render_lookup(
                &lookup,
                &table,
                &config.input,
                &mut stdout,
            )?;
            Ok(lookup.first.is_some())
        }
    }
}
