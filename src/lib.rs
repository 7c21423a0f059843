// hbnb Storage - Core Library
// Entity models + interchangeable storage engines, shared by the console and tests

pub mod config;
pub mod engine;
pub mod models;

// Re-export commonly used types
pub use config::{DbConfig, Environment, StorageConfig, StorageKind};
pub use engine::{
    open_storage, DbStorage, FileStorage, Objects, Storage, StorageError, StorageResult,
};
pub use models::{
    Amenity, BaseModel, City, Entity, ModelError, ModelRegistry, Place, Review, State, User,
    TIME_FORMAT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
