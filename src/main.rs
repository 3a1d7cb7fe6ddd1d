use anyhow::{bail, Context, Result};
use clap::Parser;

use stratum::app::App;
use stratum::config;
use stratum::logging;
use stratum::shortcuts::Shortcut;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);

    let command = cli.command.unwrap_or(Commands::Run);

    if let Commands::ConfigPath = command {
        println!("{}", config_path.display());
        return Ok(());
    }

    let guard = logging::init();
    let config = config::load_config(&config_path);
    if let Some(level) = config.log_level.as_deref() {
        guard.set_level(level);
    }
    tracing::debug!(path = %config_path.display(), "Settings loaded");

    let app = App::with_system_input(config);
    app.load().context("loading commands and vault")?;

    match command {
        Commands::Run => {
            app.run().context("running")?;
        }
        Commands::Commands => print_commands(&app),
        Commands::Exec { id } => {
            if app.registry().get(&id).is_none() {
                bail!("no command with id '{}'", id);
            }
            app.registry().execute(&id);
        }
        Commands::Vault { lane } => print_vault(&app, lane.as_deref()),
        Commands::ConfigPath => {}
    }

    Ok(())
}

fn print_commands(app: &App) {
    for command in app.registry().all() {
        let mut extras = Vec::new();
        if !command.hotkey.is_empty() {
            match Shortcut::parse(&command.hotkey) {
                Ok(shortcut) => extras.push(format!("hotkey {}", shortcut)),
                Err(e) => extras.push(format!("hotkey '{}' ({})", command.hotkey, e)),
            }
        }
        if !command.hotstring.is_empty() {
            extras.push(format!("hotstring {}", command.hotstring));
        }
        println!(
            "{:<24} {:<32} {}",
            command.id,
            command.action,
            extras.join(", ")
        );
    }
}

fn print_vault(app: &App, lane: Option<&str>) {
    let zones = app.vault().zones();
    for zone in zones {
        let items = match lane {
            Some(lane) if stratum::vault::zone_id_for_lane(lane) != zone.id => continue,
            _ => app.vault().get_lane_items(&zone.id, true),
        };
        println!("{} ({})", zone.name, zone.id);
        for item in items {
            let pin = if item.pinned { "*" } else { " " };
            println!("  {} {:<34} {:<24} {}", pin, item.id, item.label, item.item_type);
        }
    }
}
