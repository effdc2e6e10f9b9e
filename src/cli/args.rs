//! Command-line arguments and subcommands for the `ddl` tool.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::document::DuplicateKeyPolicy;

#[derive(Debug, Parser)]
#[command(
    name = "ddl",
    version,
    about = "Parse, format and validate DDL documents against DDLS schemas."
)]
pub struct DdlArgs {
    /// Increase log output (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// How maps with repeated keys are read.
    #[arg(long, value_enum, default_value_t = DuplicateKeys::LastWins, global = true)]
    pub duplicate_keys: DuplicateKeys,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate documents against one or more schemas.
    Check {
        /// Schema files. The first one supplies the root type; the others
        /// can be referenced by file name.
        #[arg(short, long = "schema", required = true)]
        schemas: Vec<PathBuf>,
        /// Documents or directories to validate. Directories are searched
        /// for `.ddl` files.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        /// Treat warnings as failures.
        #[arg(long)]
        deny_warnings: bool,
    },
    /// Print a document as plain data.
    Parse {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = DataFormat::Json)]
        format: DataFormat,
    },
    /// Read a schema and report problems with its declarations.
    Schema {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Print the canonical rendering of a document.
    Fmt {
        #[arg(required = true)]
        file: PathBuf,
        /// Show a diff and fail instead of printing when the file is not canonical.
        #[arg(long)]
        check: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplicateKeys {
    LastWins,
    FirstWins,
    Reject,
}

impl From<DuplicateKeys> for DuplicateKeyPolicy {
    fn from(value: DuplicateKeys) -> Self {
        match value {
            DuplicateKeys::LastWins => DuplicateKeyPolicy::LastWins,
            DuplicateKeys::FirstWins => DuplicateKeyPolicy::FirstWins,
            DuplicateKeys::Reject => DuplicateKeyPolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataFormat {
    Json,
    Yaml,
}
