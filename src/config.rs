use std::env;
use std::path::PathBuf;

use crate::analysis::DEFAULT_TOP_N;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_PLAYER: &str = "RG Sharma";
pub const DEFAULT_CITY_CHART_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub player: String,
    pub top_n: usize,
    pub city_chart_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            player: DEFAULT_PLAYER.to_string(),
            top_n: DEFAULT_TOP_N,
            city_chart_limit: DEFAULT_CITY_CHART_LIMIT,
        }
    }
}

impl AppConfig {
    /// Reads `.env.local` then `.env` (first value wins), then the process
    /// environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: opt_env("IPL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            output_dir: opt_env("IPL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            player: opt_env("IPL_PLAYER")
                .map(|val| val.trim().to_string())
                .unwrap_or(defaults.player),
            top_n: env::var("IPL_TOP_N")
                .ok()
                .and_then(|val| val.trim().parse::<usize>().ok())
                .unwrap_or(defaults.top_n)
                .max(1),
            city_chart_limit: env::var("IPL_CITY_CHART_LIMIT")
                .ok()
                .and_then(|val| val.trim().parse::<usize>().ok())
                .unwrap_or(defaults.city_chart_limit)
                .max(1),
        }
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}
