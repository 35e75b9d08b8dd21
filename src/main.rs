//! meetbot - command line utilities for the meeting-minutes engine.
//!
//! The bot itself runs embedded in an IRC adapter; this binary covers the
//! offline jobs, chiefly regenerating formatted output from a raw JSON log.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use slirc_meetbot::config::Config;
use slirc_meetbot::{list_commands, location, writer};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meetbot", version, about = "Meetbot command line utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate formatted output from a raw JSON log.
    ///
    /// The file prefix is taken from the raw log filename rather than the
    /// configured pattern, so regenerated files line up with the originals.
    Regenerate {
        /// Path to the config file.
        #[arg(short, long)]
        config: PathBuf,

        /// Path to the raw JSON log.
        #[arg(short, long)]
        raw_log: PathBuf,

        /// Where to write output.
        #[arg(short = 'd', long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Print the commands the dispatcher understands.
    Commands,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    match Cli::parse().command {
        Command::Regenerate {
            config,
            raw_log,
            output_dir,
        } => regenerate(&config, &raw_log, &output_dir),
        Command::Commands => {
            for command in list_commands() {
                println!("{command}");
            }
            Ok(())
        }
    }
}

fn regenerate(config_path: &Path, raw_log: &Path, output_dir: &Path) -> anyhow::Result<()> {
    let mut config = Config::load(config_path)
        .with_context(|| format!("could not load config {}", config_path.display()))?;
    config.log_dir = output_dir.to_path_buf();

    let prefix = location::derive_prefix(raw_log)
        .with_context(|| format!("no filename in raw log path {}", raw_log.display()))?;
    let meeting = writer::load_meeting(raw_log)?;
    let locations = location::locations_for_prefix(&config, &prefix)?;
    writer::write_formatted(&config, &meeting, &locations)?;

    info!(
        log = %locations.formatted_log.path.display(),
        minutes = %locations.formatted_minutes.path.display(),
        "Formatted output regenerated"
    );
    Ok(())
}
