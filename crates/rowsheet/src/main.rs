use std::io;

use clap::{Parser, ValueEnum};
use rowsheet::commands::Commands;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LogMode {
    #[default]
    Pretty,
    Json,
}

impl From<LogMode> for logutil::LogFormat {
    fn from(mode: LogMode) -> Self {
        match mode {
            LogMode::Pretty => logutil::LogFormat::HumanReadable,
            LogMode::Json => logutil::LogFormat::Json,
        }
    }
}

#[derive(Parser)]
#[clap(name = "rowsheet")]
#[clap(version)]
#[clap(about = "Row oriented access to a Google sheet", long_about = None)]
struct Cli {
    /// Log verbosity.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format.
    #[clap(long, value_enum, global = true)]
    log_mode: Option<LogMode>,

    #[clap(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    logutil::configure_global_logger(
        logutil::level_from_verbosity(cli.verbose),
        cli.log_mode.unwrap_or_default().into(),
        io::stderr,
    );

    match cli.command.run() {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                eprintln!("ERROR: {err}");
                std::process::exit(1);
            }
        },
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    }
}
