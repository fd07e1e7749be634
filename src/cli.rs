//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Study audio player for revision libraries kept in object storage.
#[derive(Debug, Parser)]
#[command(name = "prepcast", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the player (default).
    Play {
        /// Ignore the cached catalog and list the bucket again.
        #[arg(long)]
        refresh: bool,
    },

    /// Print the catalog grouped by disk, with saved progress.
    Catalog {
        /// Ignore the cached catalog and list the bucket again.
        #[arg(long)]
        refresh: bool,
    },

    /// Upload every audio file under a directory to the bucket.
    Upload {
        /// Local directory to upload; paths inside the bucket mirror it.
        dir: PathBuf,

        /// Files uploaded concurrently per batch.
        #[arg(long, default_value_t = 5)]
        batch_size: usize,

        /// Where to write the JSON report.
        #[arg(long, default_value = "upload-results.json")]
        report: PathBuf,
    },

    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// The subcommand to run; no subcommand means `play`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Play { refresh: false })
    }
}
