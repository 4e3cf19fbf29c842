use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::stats::StatsConfig;

/// Environment variable naming the directory that holds the database file.
pub const DATA_DIR_ENV: &str = "ENCOUNTERS_DATA_DIR";

pub const DB_FILE_NAME: &str = "encounters.sqlite3";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub stats: StatsConfig,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            stats: StatsConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .with_context(|| format!("{DATA_DIR_ENV} is not set"))?;
        Ok(Self::new(data_dir))
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}
