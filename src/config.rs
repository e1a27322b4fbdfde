use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::stats::{MAX_DEPTH, PLIES_PER_TRICK};

const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置失败: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("配置无效: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsConfig {
    #[serde(default)]
    pub report_file: Option<PathBuf>,
    #[serde(default)]
    pub details: bool,
    /// Labels for position indices 0, 1, ...
    #[serde(default)]
    pub position_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub tricks: usize,
    pub max_branching: usize,
    pub searches: usize,
    pub rounds: usize,
    pub seed: u64,
    pub num_threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tricks: 3,
            max_branching: 4,
            searches: 200,
            rounds: 2,
            seed: 2024,
            num_threads: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_path(CONFIG_FILE_NAME)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(config_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let root_depth = self.search.tricks.saturating_mul(PLIES_PER_TRICK);
        if self.search.tricks == 0 || root_depth >= MAX_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "tricks = {tricks}，需满足 1 <= tricks 且 tricks * {PLIES_PER_TRICK} < {MAX_DEPTH}",
                tricks = self.search.tricks
            )));
        }
        if self.search.max_branching == 0 {
            return Err(ConfigError::Invalid("max_branching 必须大于 0".to_string()));
        }
        if self.search.num_threads == Some(0) {
            return Err(ConfigError::Invalid("num_threads 必须大于 0".to_string()));
        }
        Ok(())
    }
}
