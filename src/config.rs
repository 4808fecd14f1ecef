// Optional JSON configuration file

use crate::selection::FilterSelection;
use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Dataset path used when neither the config file nor the CLI names one.
pub const DEFAULT_DATA_PATH: &str = "tips.csv";

/// Directory charts are written to by default.
pub const DEFAULT_OUTPUT_DIR: &str = "dashboard";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_data")]
    pub data: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub render: RenderOptions,
    /// Initial selection; CLI choices are layered on top.
    #[serde(default)]
    pub selection: FilterSelection,
}

fn default_data() -> PathBuf { PathBuf::from(DEFAULT_DATA_PATH) }
fn default_output_dir() -> PathBuf { PathBuf::from(DEFAULT_OUTPUT_DIR) }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data: default_data(),
            output_dir: default_output_dir(),
            render: RenderOptions::default(),
            selection: FilterSelection::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("Failed to parse dashboard config")?;
        config.selection.validate().context("Invalid selection in dashboard config")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }
}
