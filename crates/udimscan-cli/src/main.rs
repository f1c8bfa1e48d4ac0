//! udimscan - UDIM tile and UV overlap checker
//!
//! Reports which UDIM tiles each material uses, which tiles are shared
//! between materials and which faces overlap in UV space.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use udimscan_cli::commands;
use udimscan_cli::commands::analyze::AnalyzeArgs;
use udimscan_cli::logging;
use udimscan_core::TileAssignment;

/// udimscan - UDIM tile usage and UV overlap analysis
#[derive(Parser)]
#[command(name = "udimscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a scene's UDIM tile usage and UV overlaps
    Analyze {
        /// Path to the scene (.glb, .gltf or .json scene document)
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,

        /// Path to an analysis config file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Overlap tolerance in UV units (default: 0.0001)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Which tiles a face is compared in
        #[arg(long, value_parser = ["min_corner", "spanned"])]
        tile_assignment: Option<String>,

        /// Exit with status 1 when shared tiles or overlaps are found
        #[arg(long)]
        strict: bool,

        /// Hide progress messages
        #[arg(short, long)]
        quiet: bool,
    },

    /// Write the default analysis config
    InitConfig {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            input,
            json,
            config,
            tolerance,
            tile_assignment,
            strict,
            quiet,
        } => {
            tile_assignment
                .map(|value| value.parse::<TileAssignment>())
                .transpose()
                .map_err(anyhow::Error::msg)
                .and_then(|tile_assignment| {
                    commands::analyze::run(&AnalyzeArgs {
                        input: PathBuf::from(input),
                        json,
                        config: config.map(PathBuf::from),
                        tolerance,
                        tile_assignment,
                        strict,
                        progress: !quiet && !json,
                    })
                })
        }
        Commands::InitConfig { output, force } => {
            commands::init_config::run(output.as_deref(), force)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
