use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod control;
mod input;

#[derive(Parser)]
#[command(name = "crossworlds")]
#[command(about = "Sonic Racing CrossWorlds memory editor")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "crossworlds.toml", global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Attach to the game and keep values up to date (default)
    Watch,
    /// Show whether the game is running and attachable
    Status,
    /// Read the tracked values once
    Read {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a tracked value
    Set {
        /// New value
        #[arg(allow_negative_numbers = true)]
        value: i32,
        /// Name of the tracked value
        #[arg(short, long, default_value = "Tickets")]
        name: String,
    },
    /// Resolve an arbitrary pointer chain and read the value at its end
    Peek {
        /// Module-relative base offset (hex)
        #[arg(short, long)]
        base: String,
        /// Comma-separated offsets (hex, may be negative)
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        offsets: Vec<String>,
        /// Read as f32 instead of i32
        #[arg(long)]
        float: bool,
    },
    /// Dump raw bytes at a module-relative offset (defaults to the freeze patch site)
    Hexdump {
        /// Module-relative offset (hex)
        #[arg(long)]
        offset: Option<String>,
        /// Number of bytes to read
        #[arg(short, long, default_value_t = 3)]
        size: usize,
        /// Show ASCII column
        #[arg(long)]
        ascii: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let directive = if args.verbose {
        "crossworlds=debug"
    } else {
        "crossworlds=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    info!("CrossWorlds editor {}", env!("CARGO_PKG_VERSION"));
    let config = config::load_or_default(&args.config)?;

    match args.command.unwrap_or(Command::Watch) {
        Command::Watch => commands::watch::run(config),
        Command::Status => commands::status::run(&config),
        Command::Read { json } => commands::read::run(config, json),
        Command::Set { value, name } => commands::set::run(config, &name, value),
        Command::Peek {
            base,
            offsets,
            float,
        } => commands::peek::run(&config, &base, &offsets, float),
        Command::Hexdump {
            offset,
            size,
            ascii,
        } => commands::hexdump::run(&config, offset.as_deref(), size, ascii),
    }
}
