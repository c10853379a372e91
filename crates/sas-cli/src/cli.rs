//! CLI argument definitions for the smart autosave host.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "smart-autosave",
    version,
    about = "Autosave scratch buffers to a temp folder and bring them back later",
    long_about = "Autosave scratch buffers to a temp folder and bring them back later.\n\n\
                  Untitled buffers are saved as timestamp-named records (e.g.\n\
                  20240101120000.txt) shortly after each burst of edits. Leftover\n\
                  records are listed, restored, reviewed or discarded from here."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file to use instead of the platform config location.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Temp folder for this run only (overrides the settings file).
    #[arg(long = "temp-folder", value_name = "DIR", global = true)]
    pub temp_folder: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List autosave records in the temp folder.
    List,

    /// Print the records a new editor session would reopen, oldest first.
    Restore(RestoreArgs),

    /// Save standard input as a new autosave record.
    Capture,

    /// Type into a scratch buffer; it is autosaved after each pause.
    ///
    /// Reads lines from standard input until end of input. The buffer is
    /// saved once edits have been quiet for the debounce delay, and again
    /// when input ends.
    Scratch(ScratchArgs),

    /// Go through the records one by one and keep or trash each.
    Review,

    /// Move a record to the trash.
    Discard(DiscardArgs),

    /// Show or change settings.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Parser)]
pub struct RestoreArgs {
    /// Print each record's contents after its path.
    #[arg(long = "contents")]
    pub contents: bool,
}

#[derive(Parser)]
pub struct ScratchArgs {
    /// Debounce delay in milliseconds (default: from settings).
    #[arg(long = "debounce-ms", value_name = "MS")]
    pub debounce_ms: Option<u64>,
}

#[derive(Parser)]
pub struct DiscardArgs {
    /// Record file name inside the temp folder, or a path.
    #[arg(value_name = "RECORD")]
    pub record: String,

    /// Delete the file instead of moving it to the trash.
    #[arg(long = "delete")]
    pub delete: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings and where they come from.
    Show,

    /// Change the temp folder records are written to.
    SetTempFolder {
        #[arg(value_name = "DIR")]
        folder: String,
    },

    /// Change the debounce delay.
    SetDebounce {
        #[arg(value_name = "MS")]
        millis: u64,
    },

    /// Turn autosave on.
    Enable,

    /// Turn autosave off.
    Disable,

    /// Restore all settings to their defaults.
    Reset,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
