//! Smart autosave CLI.

use clap::{ColorChoice, Parser};
use sas_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod prompt;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    Options, run_capture, run_config, run_discard, run_list, run_restore, run_review,
    run_scratch_command,
};
use crate::summary::{print_records, print_review};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let options = Options {
        config: cli.config.clone(),
        temp_folder: cli.temp_folder.clone(),
    };
    let result = match &cli.command {
        Command::List => run_list(&options).map(|(root, entries)| print_records(&root, &entries)),
        Command::Restore(args) => run_restore(&options, args),
        Command::Capture => run_capture(&options).map(|path| println!("{}", path.display())),
        Command::Scratch(args) => run_scratch_command(&options, args).map(|outcome| {
            match &outcome.location {
                Some(path) => println!("{}", path.display()),
                None => eprintln!("Nothing was typed; no record written."),
            }
        }),
        Command::Review => run_review(&options).map(|decisions| print_review(&decisions)),
        Command::Discard(args) => run_discard(&options, args).map(|_| ()),
        Command::Config(command) => run_config(&options, command),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
