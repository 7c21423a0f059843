// 🛢️ Database Storage - SQLite tables behind a staged session
//
// One table per mapped entity type:
//
//   CREATE TABLE IF NOT EXISTS "<table>" (
//       id          VARCHAR(60) PRIMARY KEY NOT NULL,
//       created_at  TEXT NOT NULL,
//       updated_at  TEXT NOT NULL,
//       attributes  TEXT NOT NULL DEFAULT '{}'
//   )
//
// Type-specific fields live in the `attributes` JSON column, so the schema
// never changes when an entity grows a field.
//
// Session model:
// - `new` / `delete` only stage changes
// - `save` commits everything staged as ONE transaction
// - `all` sees committed rows with staged changes applied on top
// - a failed commit keeps the staged changes; the caller decides what next

use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Objects, Storage, StorageError, StorageResult};
use crate::config::{DbConfig, Environment};
use crate::models::{format_timestamp, Entity, ModelRegistry};

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone)]
enum Staged {
    Upsert(Box<dyn Entity>),
    Delete { type_name: String, id: String },
}

/// Pending changes keyed by `"<Type>.<id>"`; the last change to a key wins.
#[derive(Debug, Default)]
struct Session {
    staged: BTreeMap<String, Staged>,
}

impl Session {
    fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    fn len(&self) -> usize {
        self.staged.len()
    }
}

// ============================================================================
// DB STORAGE
// ============================================================================

pub struct DbStorage {
    conn: Connection,
    registry: Arc<ModelRegistry>,
    session: Session,
    environment: Environment,
}

impl DbStorage {
    /// Open the configured database and prepare the schema.
    ///
    /// In the test environment existing tables are dropped first.
    pub fn connect(config: &DbConfig, registry: Arc<ModelRegistry>) -> StorageResult<Self> {
        if config.user.is_none() {
            return Err(StorageError::connection("no database user configured"));
        }
        if config.database.is_none() {
            return Err(StorageError::connection("no database name configured"));
        }
        if !config.is_local_host() {
            return Err(StorageError::connection(format!(
                "host `{}` is not reachable by the embedded engine",
                config.host
            )));
        }

        let conn = match config.database_path() {
            Some(path) => Connection::open(&path).map_err(|e| {
                StorageError::connection(format!("failed to open {}: {e}", path.display()))
            })?,
            None => Connection::open_in_memory()
                .map_err(|e| StorageError::connection(format!("failed to open in-memory db: {e}")))?,
        };

        Self::from_connection(conn, registry, config.environment)
    }

    /// Wrap an already-open connection.
    pub fn from_connection(
        conn: Connection,
        registry: Arc<ModelRegistry>,
        environment: Environment,
    ) -> StorageResult<Self> {
        let storage = DbStorage {
            conn,
            registry,
            session: Session::default(),
            environment,
        };

        if storage.environment == Environment::Test {
            storage.drop_tables()?;
        }
        storage.create_schema()?;

        Ok(storage)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of staged, uncommitted changes.
    pub fn pending(&self) -> usize {
        self.session.len()
    }

    /// Discard every staged change of the current session.
    pub fn rollback(&mut self) {
        if !self.session.is_empty() {
            debug!(discarded = self.session.len(), "session rolled back");
        }
        self.session = Session::default();
    }

    // ========================================================================
    // SCHEMA
    // ========================================================================

    fn create_schema(&self) -> StorageResult<()> {
        for spec in self.registry.mapped() {
            let Some(table) = spec.table else { continue };
            self.conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS \"{table}\" (
                        id VARCHAR(60) PRIMARY KEY NOT NULL,
                        created_at TEXT NOT NULL,
                        updated_at TEXT NOT NULL,
                        attributes TEXT NOT NULL DEFAULT '{{}}'
                    )"
                ),
                [],
            )?;
        }
        Ok(())
    }

    fn drop_tables(&self) -> StorageResult<()> {
        for spec in self.registry.mapped() {
            let Some(table) = spec.table else { continue };
            self.conn
                .execute(&format!("DROP TABLE IF EXISTS \"{table}\""), [])?;
        }
        warn!("test environment: existing tables dropped");
        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    fn load_table(
        &self,
        type_name: &str,
        table: &str,
        objects: &mut Objects,
    ) -> StorageResult<()> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, created_at, updated_at, attributes FROM \"{table}\""
        ))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (id, created_at, updated_at, attributes_json) in rows {
            let mut map: Map<String, Value> = serde_json::from_str(&attributes_json)?;
            map.insert("id".to_string(), Value::String(id));
            map.insert("created_at".to_string(), Value::String(created_at));
            map.insert("updated_at".to_string(), Value::String(updated_at));

            let obj = self.registry.construct(type_name, map)?;
            objects.insert(obj.key(), obj);
        }

        Ok(())
    }
}

impl Storage for DbStorage {
    fn all(&self, class: Option<&str>) -> StorageResult<Objects> {
        let mut objects = Objects::new();

        for spec in self.registry.mapped() {
            if class.is_some_and(|name| name != spec.name) {
                continue;
            }
            if let Some(table) = spec.table {
                self.load_table(spec.name, table, &mut objects)?;
            }
        }

        // staged changes are visible to queries in the same session
        for (key, staged) in &self.session.staged {
            match staged {
                Staged::Upsert(obj) => {
                    if class.map_or(true, |name| name == obj.type_name()) {
                        objects.insert(key.clone(), obj.clone_entity());
                    }
                }
                Staged::Delete { .. } => {
                    objects.remove(key);
                }
            }
        }

        Ok(objects)
    }

    fn new(&mut self, obj: &dyn Entity) -> StorageResult<()> {
        if self.registry.table_for(obj.type_name()).is_none() {
            return Err(StorageError::Unmapped(obj.type_name().to_string()));
        }

        let key = obj.key();
        debug!(%key, "staged upsert");
        self.session
            .staged
            .insert(key, Staged::Upsert(obj.clone_entity()));
        Ok(())
    }

    fn delete(&mut self, obj: Option<&dyn Entity>) -> StorageResult<()> {
        let Some(obj) = obj else {
            return Ok(());
        };
        // unmapped types never reach a table
        if self.registry.table_for(obj.type_name()).is_none() {
            return Ok(());
        }

        let key = obj.key();
        debug!(%key, "staged delete");
        self.session.staged.insert(
            key,
            Staged::Delete {
                type_name: obj.type_name().to_string(),
                id: obj.id().to_string(),
            },
        );
        Ok(())
    }

    fn save(&mut self) -> StorageResult<()> {
        if self.session.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;

        for staged in self.session.staged.values() {
            match staged {
                Staged::Upsert(obj) => {
                    let table = self
                        .registry
                        .table_for(obj.type_name())
                        .ok_or_else(|| StorageError::Unmapped(obj.type_name().to_string()))?;
                    let base = obj.base();
                    let attributes = serde_json::to_string(base.attributes())?;

                    tx.execute(
                        &format!(
                            "INSERT INTO \"{table}\" (id, created_at, updated_at, attributes)
                             VALUES (?1, ?2, ?3, ?4)
                             ON CONFLICT(id) DO UPDATE SET
                                 created_at = excluded.created_at,
                                 updated_at = excluded.updated_at,
                                 attributes = excluded.attributes"
                        ),
                        params![
                            base.id,
                            format_timestamp(&base.created_at),
                            format_timestamp(&base.updated_at),
                            attributes,
                        ],
                    )?;
                }
                Staged::Delete { type_name, id } => {
                    if let Some(table) = self.registry.table_for(type_name) {
                        tx.execute(&format!("DELETE FROM \"{table}\" WHERE id = ?1"), params![id])?;
                    }
                }
            }
        }

        tx.commit()?;

        info!(changes = self.session.len(), "session committed");
        self.session = Session::default();
        Ok(())
    }

    fn reload(&mut self) -> StorageResult<()> {
        self.create_schema()?;
        self.session = Session::default();
        info!("database session reopened");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "db"
    }
}

// ============================================================================
// TESTS
// ============================================================================
