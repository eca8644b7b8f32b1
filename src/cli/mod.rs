//! CLI module for Team Sync
//!
//! Subcommands drive the sync layer against the configured stores:
//! - `save`: create or update a team, optionally with a photo
//! - `show`: print a stored team
//! - `photo`: download a team's photo
//! - `watch`: follow the teams collection live

pub mod photo;
pub mod save;
pub mod show;
pub mod watch;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Team Sync - team records with photos, kept in sync with a remote store
#[derive(Parser)]
#[command(name = "team-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Save a team record and optional photo
    Save(save::SaveArgs),

    /// Print a stored team
    Show(show::ShowArgs),

    /// Download a team's photo
    Photo(photo::PhotoArgs),

    /// Follow the teams collection until interrupted
    Watch,
}

/// Load configuration and install logging, shared by every subcommand
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    config
}
