//! Command line front end for sfd-codegen
//!
//! ```text
//! sfd-codegen check display.toml
//! sfd-codegen plan display.toml
//! sfd-codegen generate display.toml -o components.rs
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{info, LevelFilter};

use sfd_codegen::{emit, load_file, render_rust, ConfigError};

#[derive(Parser, Debug)]
#[command(
    name = "sfd-codegen",
    version,
    about = "Validate a split-flap display configuration and generate its wiring code"
)]
struct Cli {
    /// More output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a configuration file
    Check {
        /// Configuration file
        config: PathBuf,
    },

    /// Print the statements the configuration produces
    Plan {
        /// Configuration file
        config: PathBuf,
    },

    /// Write the generated Rust module
    Generate {
        /// Configuration file
        config: PathBuf,

        /// Output file, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), ConfigError> {
    match command {
        Commands::Check { config } => {
            let loaded = load_file(&config)?;
            println!(
                "{}: ok ({} uart bus(es), {} display(s))",
                config.display(),
                loaded.uarts().len(),
                loaded.displays().len()
            );
        }
        Commands::Plan { config } => {
            for statement in emit(&load_file(&config)?) {
                println!("{}", statement);
            }
        }
        Commands::Generate { config, output } => {
            let source = render_rust(&emit(&load_file(&config)?));
            match output {
                Some(path) => {
                    fs::write(&path, source).map_err(|source| ConfigError::Write {
                        path: path.clone(),
                        source,
                    })?;
                    info!("Wrote {}", path.display());
                }
                None => print!("{}", source),
            }
        }
    }
    Ok(())
}
