use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};

use ipl_insights::config::AppConfig;
use ipl_insights::dataset;
use ipl_insights::player_career::{self, CareerError};

fn main() -> Result<ExitCode> {
    env_logger::init();
    let config = AppConfig::load();

    let player = arg_value("--player").unwrap_or(config.player);
    let data_dir = arg_value("--data")
        .map(PathBuf::from)
        .unwrap_or(config.data_dir);

    let data = dataset::load_dataset(&data_dir)?;
    match player_career::analyze_player(&data.matches, &data.deliveries, &player) {
        Ok(profile) => {
            let json =
                serde_json::to_string_pretty(&profile).context("serialize career profile")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ CareerError::EmptyPlayerData { .. }) => {
            eprintln!("error: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Accepts both `--flag value` and `--flag=value`.
fn arg_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
