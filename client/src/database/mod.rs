pub mod abstraction;

use std::sync::Arc;

use tracing::info;

pub use abstraction::{file::FileStore, memory::MemoryStore, KeyValueStore};

use crate::{Config, Result};

/// Opens the file-backed store configured by `database_path`.
pub fn open(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    let path = config.database_path()?;
    info!("Opening ledger storage at {}", path.display());
    Ok(Arc::new(FileStore::open(path)?))
}
