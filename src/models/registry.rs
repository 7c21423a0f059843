// 📚 Model Registry - type name → constructor
//
// Replaces looking classes up by name at runtime. Populated once, then shared
// (read-only) by the file engine for reconstruction and by the database engine
// for its table list.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{
    Amenity, BaseModel, City, Entity, ModelError, Place, Review, State, User, CLASS_KEY,
};

/// Builds one entity from its serialized attribute map.
pub type Factory = fn(Map<String, Value>) -> Result<Box<dyn Entity>, ModelError>;

// ============================================================================
// MODEL SPEC
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    /// Type name, as used in storage keys and the `__class__` tag
    pub name: &'static str,

    /// Relational table, `None` for types without a table mapping
    pub table: Option<&'static str>,

    factory: Factory,
}

impl ModelSpec {
    pub fn construct(&self, map: Map<String, Value>) -> Result<Box<dyn Entity>, ModelError> {
        (self.factory)(map)
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<&'static str, ModelSpec>,
}

impl ModelRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with BaseModel and the six application entities.
    ///
    /// BaseModel has no table: it is storable in the file engine only.
    pub fn with_defaults() -> Self {
        let mut registry = ModelRegistry::new();

        registry.register(BaseModel::TYPE_NAME, None, BaseModel::factory);
        registry.register(User::TYPE_NAME, Some("users"), User::factory);
        registry.register(State::TYPE_NAME, Some("states"), State::factory);
        registry.register(City::TYPE_NAME, Some("cities"), City::factory);
        registry.register(Amenity::TYPE_NAME, Some("amenities"), Amenity::factory);
        registry.register(Place::TYPE_NAME, Some("places"), Place::factory);
        registry.register(Review::TYPE_NAME, Some("reviews"), Review::factory);

        registry
    }

    /// Register (or replace) a type.
    pub fn register(&mut self, name: &'static str, table: Option<&'static str>, factory: Factory) {
        self.models.insert(
            name,
            ModelSpec {
                name,
                table,
                factory,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.spec(name).is_some()
    }

    pub fn spec(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        self.models.keys().copied().collect()
    }

    pub fn table_for(&self, name: &str) -> Option<&'static str> {
        self.spec(name).and_then(|spec| spec.table)
    }

    /// Types that have a relational table.
    pub fn mapped(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values().filter(|spec| spec.table.is_some())
    }

    /// Build an instance of `name` from `map`.
    pub fn construct(
        &self,
        name: &str,
        map: Map<String, Value>,
    ) -> Result<Box<dyn Entity>, ModelError> {
        self.spec(name)
            .ok_or_else(|| ModelError::UnknownType(name.to_string()))?
            .construct(map)
    }

    /// Build an instance from a serialized map, dispatching on `__class__`.
    pub fn from_dict(&self, map: Map<String, Value>) -> Result<Box<dyn Entity>, ModelError> {
        let name = match map.get(CLASS_KEY) {
            Some(Value::String(name)) => name.clone(),
            _ => return Err(ModelError::MissingTypeTag),
        };
        self.construct(&name, map)
    }
}

// ============================================================================
// TESTS
// ============================================================================
