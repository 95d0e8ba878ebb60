use std::path::PathBuf;

use crate::{
    error::{DatabaseError, DatabaseResult},
    storage::FileManagerConfig,
};

pub const DIRECTORY_ENV: &str = "BLOCKDB_DIRECTORY";
pub const BLOCK_SIZE_ENV: &str = "BLOCKDB_BLOCK_SIZE";

pub const DEFAULT_DIRECTORY: &str = "./data";
pub const DEFAULT_BLOCK_SIZE: usize = 4096;
pub const MAX_BLOCK_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub directory: PathBuf,
    pub block_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl DatabaseConfig {
    /// Loads `.env` (if present) and reads configuration from environment.
    pub fn from_env() -> DatabaseResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {:?}", path),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds configuration from `lookup`, falling back to defaults for
    /// missing keys.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> DatabaseResult<Self> {
        let mut config = Self::default();

        if let Some(directory) = lookup(DIRECTORY_ENV) {
            config.directory = PathBuf::from(directory);
        }

        if let Some(block_size) = lookup(BLOCK_SIZE_ENV) {
            config.block_size = parse_block_size(&block_size)?;
        }

        Ok(config)
    }

    pub fn file_manager_config(&self) -> FileManagerConfig {
        FileManagerConfig::new(&self.directory, self.block_size)
    }
}

/// Parses block size, accepting values in `1..=MAX_BLOCK_SIZE`.
pub fn parse_block_size(input: &str) -> DatabaseResult<usize> {
    let value = input
        .trim()
        .parse::<usize>()
        .map_err(|e| DatabaseError::InvalidBlockSize {
            msg: e.to_string(),
            value: input.to_string(),
        })?;

    if value == 0 || value > MAX_BLOCK_SIZE {
        return Err(DatabaseError::InvalidBlockSize {
            msg: format!("block size must be between 1 and {MAX_BLOCK_SIZE}"),
            value: input.to_string(),
        });
    }

    Ok(value)
}
