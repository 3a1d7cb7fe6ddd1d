use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stratum")]
#[command(about = "Hotstrings, hotkeys and a snippet vault for the desktop", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to settings.json (default: ~/.stratum/settings.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Arm hotstrings and hotkeys and run until terminated (default)
    Run,

    /// List commands
    #[command(alias = "ls")]
    Commands,

    /// Run one command by id
    Exec {
        /// Command id from commands.json
        id: String,
    },

    /// List vault items, optionally for one lane (prompts, api_keys, notes, ...)
    Vault {
        lane: Option<String>,
    },

    /// Print the settings.json path in use
    ConfigPath,
}
