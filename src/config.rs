// ⚙️ Configuration - read once at startup from the environment
//
// HBNB_TYPE_STORAGE   "db" → database backend, anything else → file
// HBNB_FILE_PATH      JSON document for the file backend (file.json)
// HBNB_MYSQL_HOST     database host (localhost)
// HBNB_MYSQL_USER     database user
// HBNB_MYSQL_PWD      database credential
// HBNB_MYSQL_DB       database name
// HBNB_DB_DIR         directory holding database files (.)
//
// HBNB_DB_HOST / HBNB_DB_USER / HBNB_DB_PWD / HBNB_DB_NAME are read as
// fallbacks when the matching HBNB_MYSQL_* variable is unset.
// HBNB_ENV            "test" drops existing tables on connect

use std::path::PathBuf;
use tracing::warn;

pub const ENV_STORAGE_TYPE: &str = "HBNB_TYPE_STORAGE";
pub const ENV_FILE_PATH: &str = "HBNB_FILE_PATH";
pub const ENV_MYSQL_HOST: &str = "HBNB_MYSQL_HOST";
pub const ENV_MYSQL_USER: &str = "HBNB_MYSQL_USER";
pub const ENV_MYSQL_PASSWORD: &str = "HBNB_MYSQL_PWD";
pub const ENV_MYSQL_DB: &str = "HBNB_MYSQL_DB";
pub const ENV_DB_HOST: &str = "HBNB_DB_HOST";
pub const ENV_DB_USER: &str = "HBNB_DB_USER";
pub const ENV_DB_PASSWORD: &str = "HBNB_DB_PWD";
pub const ENV_DB_NAME: &str = "HBNB_DB_NAME";
pub const ENV_DB_DIR: &str = "HBNB_DB_DIR";
pub const ENV_MODE: &str = "HBNB_ENV";

pub const DEFAULT_FILE_PATH: &str = "file.json";
pub const DEFAULT_DB_HOST: &str = "localhost";

/// Database name that opens a private in-memory database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    File,
    Db,
}

impl StorageKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "db" => StorageKind::Db,
            "file" | "" => StorageKind::File,
            other => {
                warn!(value = other, "unrecognized storage type, using file storage");
                StorageKind::File
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Test,
}

/// Connection parameters for the database backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub user: Option<String>,
    pub password: String,
    pub database: Option<String>,
    pub data_dir: PathBuf,
    pub environment: Environment,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            host: DEFAULT_DB_HOST.to_string(),
            user: None,
            password: String::new(),
            database: None,
            data_dir: PathBuf::from("."),
            environment: Environment::Production,
        }
    }
}

impl DbConfig {
    /// Private in-memory database, mostly for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            user: Some("hbnb".to_string()),
            database: Some(IN_MEMORY_DATABASE.to_string()),
            ..DbConfig::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database.as_deref() == Some(IN_MEMORY_DATABASE)
    }

    /// On-disk location of the database, `None` when no name is configured
    /// or the database lives in memory.
    pub fn database_path(&self) -> Option<PathBuf> {
        match self.database.as_deref() {
            None | Some(IN_MEMORY_DATABASE) => None,
            Some(name) => Some(self.data_dir.join(format!("{name}.db"))),
        }
    }

    pub fn is_local_host(&self) -> bool {
        matches!(self.host.as_str(), "" | "localhost" | "127.0.0.1" | "::1")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub file_path: PathBuf,
    pub db: DbConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            kind: StorageKind::File,
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
            db: DbConfig::default(),
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

impl StorageConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let get_either = |primary: &str, fallback: &str| get(primary).or_else(|| get(fallback));
        let defaults = DbConfig::default();

        let kind = get(ENV_STORAGE_TYPE)
            .map(|value| StorageKind::parse(&value))
            .unwrap_or_default();

        let environment = match get(ENV_MODE).as_deref() {
            Some("test") => Environment::Test,
            _ => Environment::Production,
        };

        StorageConfig {
            kind,
            file_path: get(ENV_FILE_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_PATH)),
            db: DbConfig {
                host: get_either(ENV_MYSQL_HOST, ENV_DB_HOST).unwrap_or(defaults.host),
                user: get_either(ENV_MYSQL_USER, ENV_DB_USER),
                password: get_either(ENV_MYSQL_PASSWORD, ENV_DB_PASSWORD).unwrap_or_default(),
                database: get_either(ENV_MYSQL_DB, ENV_DB_NAME),
                data_dir: get(ENV_DB_DIR).map(PathBuf::from).unwrap_or(defaults.data_dir),
                environment,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_file_storage() {
        let config = StorageConfig::from_lookup(lookup(&[]));

        assert_eq!(config, StorageConfig::default());
        assert_eq!(config.kind, StorageKind::File);
        assert_eq!(config.file_path, PathBuf::from("file.json"));
    }

    #[test]
    fn test_db_settings() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("HBNB_TYPE_STORAGE", "db"),
            ("HBNB_MYSQL_USER", "hbnb_dev"),
            ("HBNB_MYSQL_PWD", "hbnb_dev_pwd"),
            ("HBNB_MYSQL_HOST", "127.0.0.1"),
            ("HBNB_MYSQL_DB", "hbnb_dev_db"),
            ("HBNB_DB_DIR", "/var/lib/hbnb"),
            ("HBNB_ENV", "test"),
        ]));

        assert_eq!(config.kind, StorageKind::Db);
        assert_eq!(config.db.host, "127.0.0.1");
        assert_eq!(config.db.user.as_deref(), Some("hbnb_dev"));
        assert_eq!(config.db.password, "hbnb_dev_pwd");
        assert_eq!(config.db.environment, Environment::Test);
        assert_eq!(
            config.db.database_path(),
            Some(PathBuf::from("/var/lib/hbnb/hbnb_dev_db.db"))
        );
    }

    #[test]
    fn test_mysql_names_take_precedence() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("HBNB_MYSQL_USER", "hbnb_dev"),
            ("HBNB_DB_USER", "legacy_user"),
            ("HBNB_MYSQL_DB", ""),
            ("HBNB_DB_NAME", "legacy_db"),
            ("HBNB_DB_PWD", "legacy_pwd"),
        ]));

        assert_eq!(config.db.user.as_deref(), Some("hbnb_dev"));
        assert_eq!(config.db.database.as_deref(), Some("legacy_db"));
        assert_eq!(config.db.password, "legacy_pwd");
        assert_eq!(config.db.host, "localhost");
    }

    #[test]
    fn test_unknown_storage_type_falls_back_to_file() {
        let config = StorageConfig::from_lookup(lookup(&[("HBNB_TYPE_STORAGE", "mongo")]));
        assert_eq!(config.kind, StorageKind::File);
    }

    #[test]
    fn test_in_memory_database() {
        let db = DbConfig::in_memory();

        assert!(db.is_in_memory());
        assert!(db.is_local_host());
        assert_eq!(db.database_path(), None);
    }
}
