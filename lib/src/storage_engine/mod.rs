// lib/src/storage_engine/mod.rs

// Module declarations
pub mod storage_engine;
pub mod sled_storage;
pub mod inmemory_storage;

// Re-export key types and traits for external use
pub use storage_engine::HospitalStore;
pub use sled_storage::{SledStorage, open_sled_db};
pub use inmemory_storage::InMemoryStorage;

#[cfg(test)]
pub use storage_engine::MockHospitalStore;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::{StorageConfig, StorageEngineType};

/// Creates a storage engine instance based on the provided configuration.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn HospitalStore>> {
    match config.engine {
        StorageEngineType::Sled => {
            let path = config.sled_path();
            info!(path = %path.display(), "opening sled storage");
            let db = open_sled_db(&path)?;
            let storage = SledStorage::new(&db)
                .with_context(|| format!("Failed to open sled trees at {}", path.display()))?;
            Ok(Arc::new(storage) as Arc<dyn HospitalStore>)
        }
        StorageEngineType::InMemory => {
            info!("using in-memory storage; records are lost on shutdown");
            Ok(Arc::new(InMemoryStorage::new()) as Arc<dyn HospitalStore>)
        }
    }
}
