use crate::app::DefaultSelection;
use crate::loader::LoaderConfig;
use crate::views::Viewport;
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Assets
    pub languages_source: String,
    pub world_source: String,
    pub asset_version: String,
    pub fetch_timeout_secs: u64,

    // Initial state
    pub default_selection: DefaultSelection,

    // Map layout
    pub map_width: f64,
    pub map_height: f64,

    // Output
    pub output_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Assets - URLs or local paths
            languages_source: std::env::var("LANGUAGES_SOURCE")
                .unwrap_or_else(|_| "data/languages.json".to_string()),
            world_source: std::env::var("WORLD_SOURCE")
                .unwrap_or_else(|_| "data/world.geojson".to_string()),
            asset_version: std::env::var("ASSET_VERSION")
                .unwrap_or_else(|_| chrono::Utc::now().timestamp().to_string()),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            // Initial state
            default_selection: match std::env::var("DEFAULT_SELECTION") {
                Ok(value) => value
                    .parse::<DefaultSelection>()
                    .context("DEFAULT_SELECTION must be one of top, none, all")?,
                Err(_) => DefaultSelection::Top,
            },

            // Map layout
            map_width: parse_dimension("MAP_WIDTH", 900.0),
            map_height: parse_dimension("MAP_HEIGHT", 480.0),

            // Output
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "out".to_string()),
        })
    }

    pub fn loader(&self) -> LoaderConfig {
        LoaderConfig {
            languages_source: self.languages_source.clone(),
            world_source: self.world_source.clone(),
            asset_version: Some(self.asset_version.clone()),
            timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.map_width, self.map_height)
    }
}

/// Positive finite dimension from the environment, else `default`.
fn parse_dimension(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}
