//! Recite — turn spreadsheet rows into speech audio, incrementally.
//!
//! # Usage
//!
//! ```text
//! recite run [--config <path>] [--sheet-id <id>] [--tab <tab>] [--range <cell>]
//!            [--history-sheet-id <id>] [--history-tab <tab>] [--history-range <cell>]
//!            [--dry-run <true|false>] [--force] [--json]
//! recite fingerprint <text>...
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{fingerprint::FingerprintArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "recite",
    version,
    about = "Synthesize speech for changed spreadsheet rows and upload the audio",
    long_about = None,
)]
struct Cli {
    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fingerprint, synthesize, and upload changed rows; persist fingerprints.
    Run(RunArgs),

    /// Print the fingerprint of each argument.
    Fingerprint(FingerprintArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Fingerprint(args) => args.run(),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().default_filter_or(default);
    let _ = env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init();
}
