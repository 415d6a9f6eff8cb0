// ReceiptDeck CLI - review queues for bulk-imported receipt tables

mod classify;
mod config;
mod exit_codes;
mod inspect;
mod review;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use receiptdeck_engine::{ClassifyPolicy, EngineError, RowSet};

use exit_codes::{
    engine_exit_code, EXIT_EXPORT_WRITE, EXIT_IMPORT_UNREADABLE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "rdeck")]
#[command(about = "Review queue for bulk-imported expense receipts")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review classified receipts card by card
    #[command(after_help = "\
Cards and prompts go to stderr; the reviewed table goes to stdout (or
--output). Keys are read from stdin one line at a time, so a session can be
typed by hand or piped from a script.

Keys:
  a  approve the current card
  r  reject the current card (prompts for a reason; ':cancel' aborts)
  u  undo the last decision (--backward only)
  o  request receipt analysis for the current card
  s  show progress counts
  q  stop early and export

Examples:
  rdeck review receipts.csv > reviewed.csv
  rdeck review receipts.csv --backward -o reviewed.csv
  printf 'a\\nr\\nduplicate claim\\na\\n' | rdeck review receipts.csv
  cat receipts.csv | rdeck review - --out json")]
    Review {
        /// Input table (file path, or - for stdin)
        input: String,

        /// Walk the queue from the end with undo enabled
        #[arg(long)]
        backward: bool,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "csv")]
        out: OutFormat,

        /// Config file (default: ~/.config/receiptdeck/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Unsubmitted-project policy override
        #[arg(long)]
        policy: Option<PolicyArg>,

        /// Field delimiter (default: auto-detect)
        #[arg(long)]
        delimiter: Option<char>,

        /// Suppress the banner and per-decision notes
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Classify a table and export it without interactive review
    #[command(after_help = "\
Examples:
  rdeck classify receipts.csv > classified.csv
  rdeck classify receipts.csv --policy discard -o kept.csv
  rdeck classify receipts.csv --out json | jq '.[].verification_status'")]
    Classify {
        /// Input table (file path, or - for stdin)
        input: String,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "csv")]
        out: OutFormat,

        /// Config file (default: ~/.config/receiptdeck/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Unsubmitted-project policy override
        #[arg(long)]
        policy: Option<PolicyArg>,

        /// Field delimiter (default: auto-detect)
        #[arg(long)]
        delimiter: Option<char>,

        /// Suppress the stderr summary
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Summarize what the review queue would look like
    #[command(after_help = "\
Examples:
  rdeck inspect receipts.csv
  rdeck inspect receipts.csv --json | jq .summary")]
    Inspect {
        /// Input table (file path, or - for stdin)
        input: String,

        /// Config file (default: ~/.config/receiptdeck/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Unsubmitted-project policy override
        #[arg(long)]
        policy: Option<PolicyArg>,

        /// Field delimiter (default: auto-detect)
        #[arg(long)]
        delimiter: Option<char>,

        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    AutoResolve,
    Discard,
}

impl PolicyArg {
    fn into_policy(self) -> ClassifyPolicy {
        match self {
            PolicyArg::AutoResolve => ClassifyPolicy::AutoResolve,
            PolicyArg::Discard => ClassifyPolicy::Discard,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Review {
            input,
            backward,
            output,
            out,
            config,
            policy,
            delimiter,
            quiet,
        } => review::cmd_review(review::ReviewOptions {
            input,
            backward,
            output,
            out,
            config,
            policy: policy.map(PolicyArg::into_policy),
            delimiter,
            quiet,
        }),
        Commands::Classify {
            input,
            output,
            out,
            config,
            policy,
            delimiter,
            quiet,
        } => classify::cmd_classify(
            input,
            output,
            out,
            config,
            policy.map(PolicyArg::into_policy),
            delimiter,
            quiet,
        ),
        Commands::Inspect {
            input,
            config,
            policy,
            delimiter,
            json,
        } => inspect::cmd_inspect(input, config, policy.map(PolicyArg::into_policy), delimiter, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self { code: EXIT_EXPORT_WRITE, message: msg.into(), hint: None }
    }

    /// Wrap an engine error with its registered exit code.
    pub fn engine(err: EngineError) -> Self {
        let hint = match &err {
            EngineError::MissingColumn { .. } => Some(
                "column names are configurable under [columns] in the config file".to_string(),
            ),
            EngineError::DuplicateId { .. } => Some(
                "record ids must be unique; clear the id cell to have one synthesized".to_string(),
            ),
            _ => None,
        };
        Self { code: engine_exit_code(&err), message: err.to_string(), hint }
    }
}

// ── Shared table plumbing ───────────────────────────────────────────

/// Read the input table from a file or stdin (`-`).
pub(crate) fn load_rows(input: &str, delimiter: Option<char>) -> Result<RowSet, CliError> {
    let delimiter = match delimiter {
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => return Err(CliError::args(format!("delimiter must be ASCII, got {c:?}"))),
        None => None,
    };

    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut content)
            .map_err(|e| CliError {
                code: EXIT_IMPORT_UNREADABLE,
                message: format!("cannot read stdin: {e}"),
                hint: None,
            })?;
        let parsed = match delimiter {
            Some(d) => receiptdeck_io::csv::import_from_string(&content, d),
            None => receiptdeck_io::csv::import_str(&content),
        };
        return parsed.map_err(|msg| CliError::engine(EngineError::Ingestion(msg)));
    }

    let path = Path::new(input);
    let result = match delimiter {
        Some(d) => receiptdeck_io::csv::import_with_delimiter(path, d),
        None => receiptdeck_io::csv::import(path),
    };
    result.map_err(|msg| {
        if path.exists() {
            CliError::engine(EngineError::Ingestion(msg))
        } else {
            CliError {
                code: EXIT_IMPORT_UNREADABLE,
                message: msg,
                hint: Some("pass - to read from stdin".to_string()),
            }
        }
    })
}

/// Write the export table to a file or stdout in the requested format.
pub(crate) fn write_table(
    table: &RowSet,
    output: Option<&Path>,
    format: OutFormat,
) -> Result<(), CliError> {
    match (output, format) {
        (Some(path), OutFormat::Csv) => {
            receiptdeck_io::csv::export(table, path).map_err(CliError::export)
        }
        (Some(path), OutFormat::Json) => {
            receiptdeck_io::json::export(table, path).map_err(CliError::export)
        }
        (None, OutFormat::Csv) => {
            let out = receiptdeck_io::csv::to_string(table).map_err(CliError::export)?;
            print!("{out}");
            Ok(())
        }
        (None, OutFormat::Json) => {
            let out = receiptdeck_io::json::to_string(table).map_err(CliError::export)?;
            println!("{out}");
            Ok(())
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  receiptdeck-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
            "\ncontract_version(review): 1",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  receiptdeck-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
            "\ncontract_version(review): 1",
        )
    }
}
