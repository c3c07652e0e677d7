//! `classmap.toml` configuration

use std::path::{Path, PathBuf};

use classmap_core::ViewOptions;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "classmap.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub views: ViewsConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Extension of export files, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_global_name")]
    pub global_name: String,
    #[serde(default)]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            global_name: default_global_name(),
            pretty: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewsConfig {
    #[serde(default = "default_true")]
    pub classes: bool,
    #[serde(default = "default_true")]
    pub namespaces: bool,
    #[serde(default)]
    pub hide_utility: bool,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            classes: true,
            namespaces: true,
            hide_utility: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_true")]
    pub usages: bool,
    /// Worker threads for usage detection; 0 leaves the choice to rayon.
    #[serde(default)]
    pub threads: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            usages: true,
            threads: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_global_name() -> String {
    "classes".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `classmap.toml` inside `input_dir`, or defaults when there is none.
    pub fn discover(input_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::default_path(input_dir);
        if !path.is_file() {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, input_dir.display());
            return Ok(Config::default());
        }
        tracing::debug!("Loading config from {}", path.display());
        Self::load(&path)
    }

    pub fn default_path(input_dir: &Path) -> PathBuf {
        input_dir.join(CONFIG_FILE)
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            global_name: self.output.global_name.clone(),
            classes: self.views.classes,
            namespaces: self.views.namespaces,
            hide_utility: self.views.hide_utility,
        }
    }
}
