// 🗄️ Storage Engines
//
// One contract, two backends:
//
//   Storage (trait)
//     ├── FileStorage  - whole-document JSON file, rewritten on every save
//     └── DbStorage    - SQLite tables, staged session committed on save
//
// The backend is picked once by `open_storage` and handed to callers as an
// explicit `Box<dyn Storage>`; there is no process-wide singleton.

pub mod db_storage;
pub mod error;
pub mod file_storage;

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::config::{StorageConfig, StorageKind};
use crate::models::{Entity, ModelRegistry};

pub use db_storage::DbStorage;
pub use error::{StorageError, StorageResult};
pub use file_storage::FileStorage;

/// Snapshot of stored objects keyed by `"<Type>.<id>"`.
pub type Objects = BTreeMap<String, Box<dyn Entity>>;

// ============================================================================
// STORAGE CONTRACT
// ============================================================================

pub trait Storage {
    /// Copy of every stored object, or only those of type `class`.
    /// Unknown type names yield an empty map.
    fn all(&self, class: Option<&str>) -> StorageResult<Objects>;

    /// Register a new or changed object. Persisted on the next `save`.
    fn new(&mut self, obj: &dyn Entity) -> StorageResult<()>;

    /// Remove an object. `None` and absent objects are no-ops.
    fn delete(&mut self, obj: Option<&dyn Entity>) -> StorageResult<()>;

    /// Persist every pending change. Blocks until durable.
    fn save(&mut self) -> StorageResult<()>;

    /// Re-synchronize with the durable store (startup / session refresh).
    fn reload(&mut self) -> StorageResult<()>;

    /// Short backend label for logs and the console.
    fn backend_name(&self) -> &'static str;

    /// Single object lookup.
    fn get(&self, class: &str, id: &str) -> StorageResult<Option<Box<dyn Entity>>> {
        let key = format!("{class}.{id}");
        Ok(self.all(Some(class))?.remove(&key))
    }

    fn count(&self, class: Option<&str>) -> StorageResult<usize> {
        Ok(self.all(class)?.len())
    }
}

// ============================================================================
// SELECTOR
// ============================================================================

/// Build the configured backend and reload it before first use.
pub fn open_storage(
    config: &StorageConfig,
    registry: Arc<ModelRegistry>,
) -> StorageResult<Box<dyn Storage>> {
    let mut storage: Box<dyn Storage> = match config.kind {
        StorageKind::File => Box::new(FileStorage::open(&config.file_path, registry)),
        StorageKind::Db => Box::new(DbStorage::connect(&config.db, registry)?),
    };

    storage.reload()?;
    info!(backend = storage.backend_name(), "storage ready");

    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::models::User;

    #[test]
    fn test_open_storage_defaults_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            file_path: dir.path().join("file.json"),
            ..StorageConfig::default()
        };

        let storage = open_storage(&config, Arc::new(ModelRegistry::with_defaults())).unwrap();

        assert_eq!(storage.backend_name(), "file");
        assert!(storage.all(None).unwrap().is_empty());
    }

    #[test]
    fn test_open_storage_db() {
        let config = StorageConfig {
            kind: StorageKind::Db,
            db: DbConfig::in_memory(),
            ..StorageConfig::default()
        };

        let mut storage =
            open_storage(&config, Arc::new(ModelRegistry::with_defaults())).unwrap();
        assert_eq!(storage.backend_name(), "db");

        let mut user = User::new();
        user.save(storage.as_mut()).unwrap();

        let found = storage.get("User", user.id()).unwrap();
        assert!(found.is_some());
        assert_eq!(storage.count(Some("User")).unwrap(), 1);
        assert_eq!(storage.count(Some("State")).unwrap(), 0);
    }

    #[test]
    fn test_open_storage_db_from_mysql_environment() {
        let vars = [
            ("HBNB_TYPE_STORAGE", "db"),
            ("HBNB_MYSQL_USER", "hbnb_dev"),
            ("HBNB_MYSQL_DB", ":memory:"),
        ];
        let config = StorageConfig::from_lookup(|key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        });

        let storage = open_storage(&config, Arc::new(ModelRegistry::with_defaults())).unwrap();
        assert_eq!(storage.backend_name(), "db");
    }

    #[test]
    fn test_open_storage_db_requires_database_name() {
        let config = StorageConfig {
            kind: StorageKind::Db,
            ..StorageConfig::default()
        };

        let result = open_storage(&config, Arc::new(ModelRegistry::with_defaults()));
        assert!(matches!(result, Err(StorageError::Connection(_))));
    }
}
