use std::sync::Arc;

use crate::{error::DatabaseResult, storage::FileManager};

pub mod config;

pub use config::DatabaseConfig;

/// Entry point for embedding applications. Owns the configuration and the
/// file manager that every storage consumer shares.
pub struct Database {
    config: DatabaseConfig,
    file_manager: Arc<FileManager>,
}

impl Database {
    pub fn open(config: DatabaseConfig) -> DatabaseResult<Self> {
        log::info!("Opening database at {:?}", config.directory);

        let file_manager = Arc::new(FileManager::new(config.file_manager_config())?);

        if file_manager.is_new() {
            log::info!("Created new database directory");
        }

        Ok(Self {
            config,
            file_manager,
        })
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Shared handle to the file manager.
    pub fn file_manager(&self) -> Arc<FileManager> {
        Arc::clone(&self.file_manager)
    }
}
