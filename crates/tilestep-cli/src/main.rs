//! Tilestep CLI - step-by-step tile generation sessions.
//!
//! Serves sessions over WebSocket, drives a single session over stdio, and
//! extracts custom rules from sample images.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tilestep_ops::Config;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;

use commands::config as config_cmd;

/// Tilestep CLI - interactive constraint-propagation tile generation.
#[derive(Parser, Debug)]
#[command(
    name = "ts",
    author,
    version,
    about = "Tilestep: step through wave function collapse tile generation",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve WebSocket sessions at /api/ws.
    Serve {
        /// Port to listen on (defaults to the configured port).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one session over stdin/stdout, one JSON request per line.
    Stdio,

    /// Extract custom rules from a sample image.
    Extract {
        /// Sample image (PNG, JPEG, GIF, BMP).
        image: PathBuf,

        /// Write the rule bundle here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bundle name (defaults to the image file name).
        #[arg(long)]
        name: Option<String>,

        /// Pattern size.
        #[arg(short, long, default_value_t = 3)]
        n: usize,

        /// Number of symmetry variants per pattern (1-8).
        #[arg(short, long, default_value_t = 2)]
        symmetry: usize,

        /// Treat the sample as non-wrapping.
        #[arg(long)]
        no_periodic: bool,
    },

    /// List the built-in presets.
    Presets,

    /// Manage configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN // Default to less noise
    };

    // stdout carries protocol output in stdio mode
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config::load()?;
            let port = port.unwrap_or(config.default_port);
            commands::serve::execute(config, port).await?;
        }

        Commands::Stdio => {
            let config = Config::load()?;
            commands::stdio::execute(config).await?;
        }

        Commands::Extract {
            image,
            output,
            name,
            n,
            symmetry,
            no_periodic,
        } => {
            let options = tilestep_core::ExtractionOptions {
                n,
                periodic_input: !no_periodic,
                symmetry,
            };
            commands::extract::execute(&image, output.as_deref(), name, options)?;
        }

        Commands::Presets => {
            commands::presets::execute();
        }

        Commands::Config(config_cmd_inner) => {
            // stored values only, without environment overrides
            let mut config = Config::load_file()?;
            match config_cmd_inner {
                ConfigCommands::Show => {
                    config_cmd::show(&config)?;
                }
                ConfigCommands::Set { key, value } => {
                    config_cmd::set(&mut config, &key, &value)?;
                }
                ConfigCommands::Get { key } => {
                    config_cmd::get(&config, &key)?;
                }
                ConfigCommands::Reset => {
                    config_cmd::reset()?;
                }
                ConfigCommands::Path => {
                    if let Some(path) = Config::config_file_path() {
                        println!("{}", path.display());
                    } else {
                        println!("(no config file path available)");
                    }
                }
            }
        }
    }

    Ok(())
}
