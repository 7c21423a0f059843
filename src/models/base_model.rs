// 🧱 Base Model - identity + timestamps shared by every entity
//
// Every persisted object carries:
// - `id` (UUID v4, generated when absent)
// - `created_at` / `updated_at` (naive timestamps, microsecond precision)
// - a free-form attribute map for the type-specific fields
//
// Storage never sees concrete structs, only `dyn Entity`.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::engine::{Storage, StorageResult};

/// Timestamp layout used in `to_dict()` output and accepted on reconstruction
/// (`YYYY-MM-DDTHH:MM:SS.ffffff`).
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Key carrying the concrete type name in serialized form.
pub const CLASS_KEY: &str = "__class__";

const RESERVED_KEYS: [&str; 4] = ["id", "created_at", "updated_at", CLASS_KEY];

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid timestamp for `{field}`: {value:?}")]
    TimestampParse {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("attribute `{field}` must be {expected}")]
    InvalidAttribute {
        field: String,
        expected: &'static str,
    },

    #[error("serialized object has no `__class__` tag")]
    MissingTypeTag,

    #[error("unknown entity type `{0}`")]
    UnknownType(String),
}

// ============================================================================
// TIME HELPERS
// ============================================================================

/// Current time, truncated to the precision `TIME_FORMAT` can carry so that
/// a serialize/parse round trip is lossless.
pub fn current_time() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIME_FORMAT).to_string()
}

pub fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, ModelError> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT).map_err(|source| ModelError::TimestampParse {
        field,
        value: value.to_string(),
        source,
    })
}

fn take_timestamp(
    map: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Option<NaiveDateTime>, ModelError> {
    match map.remove(field) {
        None => Ok(None),
        Some(Value::String(s)) => parse_timestamp(field, &s).map(Some),
        Some(_) => Err(ModelError::InvalidAttribute {
            field: field.to_string(),
            expected: "a timestamp string",
        }),
    }
}

// ============================================================================
// BASE MODEL
// ============================================================================

/// Shared state of every entity.
///
/// Identity (`id`) never changes after construction; `updated_at` moves
/// forward on every `save`.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseModel {
    pub id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    attributes: Map<String, Value>,
}

impl BaseModel {
    pub const TYPE_NAME: &'static str = "BaseModel";

    /// Fresh instance with a new UUID and `created_at == updated_at == now`.
    pub fn new() -> Self {
        let now = current_time();

        BaseModel {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            attributes: Map::new(),
        }
    }

    /// Rebuild an instance from a serialized attribute map.
    ///
    /// `id`, `created_at` and `updated_at` are adopted when present, defaulted
    /// otherwise. When only one timestamp is given the other is derived from
    /// it. The `__class__` tag is dropped; every other key is kept
    /// verbatim as an attribute.
    pub fn from_dict(mut map: Map<String, Value>) -> Result<Self, ModelError> {
        map.remove(CLASS_KEY);
        let now = current_time();

        let id = match map.remove("id") {
            None => uuid::Uuid::new_v4().to_string(),
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(_) => {
                return Err(ModelError::InvalidAttribute {
                    field: "id".to_string(),
                    expected: "a non-empty string",
                })
            }
        };
        let created = take_timestamp(&mut map, "created_at")?;
        let updated = take_timestamp(&mut map, "updated_at")?;

        // A lone timestamp fills in for the missing one so that
        // created_at <= updated_at still holds.
        let (created_at, updated_at) = match (created, updated) {
            (Some(created), Some(updated)) => (created, updated),
            (Some(created), None) => (created, created.max(now)),
            (None, Some(updated)) => (updated, updated),
            (None, None) => (now, now),
        };

        Ok(BaseModel {
            id,
            created_at,
            updated_at,
            attributes: map,
        })
    }

    /// Serialized form: attributes + identity fields + `__class__` tag.
    pub fn to_dict(&self, type_name: &str) -> Map<String, Value> {
        let mut dict = self.identity_map();
        dict.insert(CLASS_KEY.to_string(), Value::String(type_name.to_string()));
        dict
    }

    /// Attributes plus identity fields, without the type tag.
    fn identity_map(&self) -> Map<String, Value> {
        let mut dict = self.attributes.clone();
        dict.insert("id".to_string(), Value::String(self.id.clone()));
        dict.insert(
            "created_at".to_string(),
            Value::String(format_timestamp(&self.created_at)),
        );
        dict.insert(
            "updated_at".to_string(),
            Value::String(format_timestamp(&self.updated_at)),
        );
        dict
    }

    /// Refresh `updated_at`; never moves it before `created_at`.
    pub fn touch(&mut self) {
        self.updated_at = current_time().max(self.created_at);
    }

    // ========================================================================
    // ATTRIBUTES
    // ========================================================================

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Set a type-specific attribute. Identity fields and the type tag are
    /// not settable through here.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        if RESERVED_KEYS.contains(&key) {
            return Err(ModelError::InvalidAttribute {
                field: key.to_string(),
                expected: "a non-reserved attribute name",
            });
        }
        self.attributes.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    /// Setter for attribute names known not to be reserved.
    pub(crate) fn put(&mut self, key: &str, value: Value) {
        self.attributes.insert(key.to_string(), value);
    }

    pub(crate) fn str_attr(&self, key: &str) -> &str {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub(crate) fn int_attr(&self, key: &str) -> i64 {
        self.attributes
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    pub(crate) fn float_attr(&self, key: &str) -> f64 {
        self.attributes
            .get(key)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    pub(crate) fn str_list_attr(&self, key: &str) -> Vec<String> {
        self.attributes
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn describe(&self, type_name: &str) -> String {
        format!(
            "[{}] ({}) {}",
            type_name,
            self.id,
            Value::Object(self.identity_map())
        )
    }

    pub(crate) fn factory(map: Map<String, Value>) -> Result<Box<dyn Entity>, ModelError> {
        Ok(Box::new(BaseModel::from_dict(map)?))
    }
}

impl Default for BaseModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BaseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(Self::TYPE_NAME))
    }
}

// ============================================================================
// ENTITY TRAIT
// ============================================================================

/// Contract every storable object satisfies.
///
/// Storage backends only deal in `&dyn Entity` / `Box<dyn Entity>`; the
/// concrete type is recovered through `ModelRegistry` by `type_name()`.
pub trait Entity: fmt::Debug {
    fn type_name(&self) -> &'static str;

    fn base(&self) -> &BaseModel;

    fn base_mut(&mut self) -> &mut BaseModel;

    fn clone_entity(&self) -> Box<dyn Entity>;

    fn id(&self) -> &str {
        &self.base().id
    }

    /// Storage key: `"<Type>.<id>"`.
    fn key(&self) -> String {
        format!("{}.{}", self.type_name(), self.id())
    }

    fn to_dict(&self) -> Map<String, Value> {
        self.base().to_dict(self.type_name())
    }

    /// Refresh `updated_at`, register with `storage`, then flush immediately.
    fn save(&mut self, storage: &mut dyn Storage) -> StorageResult<()>
    where
        Self: Sized,
    {
        self.base_mut().touch();
        storage.new(&*self)?;
        storage.save()
    }

    /// Remove from `storage` and flush immediately.
    fn delete(&self, storage: &mut dyn Storage) -> StorageResult<()>
    where
        Self: Sized,
    {
        storage.delete(Some(self))?;
        storage.save()
    }
}

impl Entity for BaseModel {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn base(&self) -> &BaseModel {
        self
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        self
    }

    fn clone_entity(&self) -> Box<dyn Entity> {
        Box::new(self.clone())
    }
}

// Lets registry-built objects call the provided `save`/`delete` directly.
impl Entity for Box<dyn Entity> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn base(&self) -> &BaseModel {
        (**self).base()
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        (**self).base_mut()
    }

    fn clone_entity(&self) -> Box<dyn Entity> {
        (**self).clone_entity()
    }
}

impl Clone for Box<dyn Entity> {
    fn clone(&self) -> Self {
        (**self).clone_entity()
    }
}

impl fmt::Display for dyn Entity + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base().describe(self.type_name()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
