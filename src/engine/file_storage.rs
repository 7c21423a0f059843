// 📄 File Storage - every object in one JSON document
//
// Document layout:
//   { "<Type>.<id>": { "__class__": "<Type>", "id": ..., "created_at": ..., ... }, ... }
//
// `save` rewrites the whole document (temp file + rename); there is no
// incremental diff and no locking between processes.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::{Objects, Storage, StorageError, StorageResult};
use crate::models::{Entity, ModelRegistry};

pub struct FileStorage {
    path: PathBuf,
    registry: Arc<ModelRegistry>,
    objects: HashMap<String, Box<dyn Entity>>,
}

impl FileStorage {
    /// Storage bound to `path`. Nothing is read until `reload`.
    pub fn open(path: impl AsRef<Path>, registry: Arc<ModelRegistry>) -> Self {
        FileStorage {
            path: path.as_ref().to_path_buf(),
            registry,
            objects: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn document(&self) -> Map<String, Value> {
        self.objects
            .iter()
            .map(|(key, obj)| (key.clone(), Value::Object(obj.to_dict())))
            .collect()
    }
}

impl Storage for FileStorage {
    fn all(&self, class: Option<&str>) -> StorageResult<Objects> {
        Ok(self
            .objects
            .iter()
            .filter(|(_, obj)| class.map_or(true, |name| obj.type_name() == name))
            .map(|(key, obj)| (key.clone(), obj.clone_entity()))
            .collect())
    }

    fn new(&mut self, obj: &dyn Entity) -> StorageResult<()> {
        let key = obj.key();
        debug!(%key, "registering object");
        self.objects.insert(key, obj.clone_entity());
        Ok(())
    }

    fn delete(&mut self, obj: Option<&dyn Entity>) -> StorageResult<()> {
        if let Some(obj) = obj {
            let key = obj.key();
            if self.objects.remove(&key).is_some() {
                debug!(%key, "removed object");
            }
        }
        Ok(())
    }

    fn save(&mut self) -> StorageResult<()> {
        let text = serde_json::to_string(&self.document())?;
        let temp = self.temp_path();

        fs::write(&temp, text).map_err(|e| StorageError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| StorageError::io(&self.path, e))?;

        debug!(path = %self.path.display(), objects = self.objects.len(), "document written");
        Ok(())
    }

    fn reload(&mut self) -> StorageResult<()> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no document yet, starting empty");
                self.objects.clear();
                return Ok(());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let document: Map<String, Value> = serde_json::from_str(&text)?;

        let mut objects = HashMap::with_capacity(document.len());
        for (key, entry) in document {
            let Value::Object(attributes) = entry else {
                return Err(StorageError::Malformed(format!(
                    "entry `{key}` is not an object"
                )));
            };
            let obj = self.registry.from_dict(attributes)?;
            objects.insert(obj.key(), obj);
        }

        info!(path = %self.path.display(), objects = objects.len(), "file storage reloaded");
        self.objects = objects;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BaseModel, ModelError, Place, State, User};
    use tempfile::TempDir;

    fn storage_in(dir: &TempDir) -> FileStorage {
        FileStorage::open(
            dir.path().join("file.json"),
            Arc::new(ModelRegistry::with_defaults()),
        )
    }

    #[test]
    fn test_reload_missing_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);

        storage.reload().unwrap();

        assert!(storage.all(None).unwrap().is_empty());
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_new_save_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);

        let mut user = User::new();
        user.set_email("betty@holberton.io");
        storage.new(&user).unwrap();
        storage.save().unwrap();

        let mut fresh = storage_in(&dir);
        fresh.reload().unwrap();
        let all = fresh.all(None).unwrap();

        assert_eq!(all.len(), 1);
        let stored = &all[&format!("User.{}", user.id())];
        assert_eq!(stored.to_dict(), user.to_dict());
    }

    #[test]
    fn test_new_overwrites_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);

        let mut state = State::named("Texas");
        storage.new(&state).unwrap();
        state.set_name("Utah");
        storage.new(&state).unwrap();

        let all = storage.all(Some("State")).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[&state.key()].base().str_attr("name"), "Utah");
    }

    #[test]
    fn test_delete_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);

        let keep = State::named("Oregon");
        let gone = State::named("Ohio");
        storage.new(&keep).unwrap();
        storage.new(&gone).unwrap();
        storage.save().unwrap();

        storage.delete(Some(&gone)).unwrap();
        storage.save().unwrap();

        let mut fresh = storage_in(&dir);
        fresh.reload().unwrap();
        let all = fresh.all(None).unwrap();

        assert!(all.contains_key(&keep.key()));
        assert!(!all.contains_key(&gone.key()));
    }

    #[test]
    fn test_delete_absent_or_none_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);
        storage.new(&User::new()).unwrap();

        storage.delete(None).unwrap();
        storage.delete(Some(&User::new())).unwrap();

        assert_eq!(storage.all(None).unwrap().len(), 1);
    }

    #[test]
    fn test_all_filters_by_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);
        storage.new(&User::new()).unwrap();
        storage.new(&User::new()).unwrap();
        storage.new(&Place::new()).unwrap();
        storage.new(&BaseModel::new()).unwrap();

        assert_eq!(storage.all(None).unwrap().len(), 4);
        assert_eq!(storage.all(Some("User")).unwrap().len(), 2);
        assert_eq!(storage.all(Some("Place")).unwrap().len(), 1);
        assert!(storage.all(Some("Spaceship")).unwrap().is_empty());
    }

    #[test]
    fn test_all_returns_copies() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);
        let user = User::new();
        storage.new(&user).unwrap();

        let mut snapshot = storage.all(None).unwrap();
        snapshot.clear();

        assert_eq!(storage.all(None).unwrap().len(), 1);
    }

    #[test]
    fn test_document_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);
        let user = User::new();
        storage.new(&user).unwrap();
        storage.save().unwrap();

        let text = fs::read_to_string(storage.path()).unwrap();
        let document: Value = serde_json::from_str(&text).unwrap();
        let entry = &document[user.key()];

        assert_eq!(entry["__class__"], "User");
        assert_eq!(entry["id"], user.id());
        assert_eq!(entry["created_at"].as_str().unwrap().len(), 26);
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn test_reload_replaces_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);
        storage.new(&User::new()).unwrap();

        // nothing saved yet: the document is missing
        storage.reload().unwrap();

        assert!(storage.all(None).unwrap().is_empty());
    }

    #[test]
    fn test_reload_malformed_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);
        fs::write(storage.path(), "{ not json").unwrap();

        assert!(matches!(
            storage.reload(),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_reload_non_object_entry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);
        fs::write(storage.path(), r#"{"User.1": 42}"#).unwrap();

        assert!(matches!(storage.reload(), Err(StorageError::Malformed(_))));
    }

    #[test]
    fn test_reload_bad_timestamp_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);
        fs::write(
            storage.path(),
            r#"{"User.1": {"__class__": "User", "id": "1", "created_at": "yesterday"}}"#,
        )
        .unwrap();

        assert!(matches!(
            storage.reload(),
            Err(StorageError::Model(ModelError::TimestampParse { .. }))
        ));
    }

    #[test]
    fn test_reload_unknown_type_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage_in(&dir);
        fs::write(
            storage.path(),
            r#"{"Ship.1": {"__class__": "Ship", "id": "1"}}"#,
        )
        .unwrap();

        assert!(matches!(
            storage.reload(),
            Err(StorageError::Model(ModelError::UnknownType(_)))
        ));
    }
}
