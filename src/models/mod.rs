// Entity Models
//
// BaseModel holds identity + timestamps; every concrete type wraps one and
// adds typed accessors for its well-known attributes. The registry maps type
// names back to constructors for both storage backends.

/// Implements `Entity`, `Display`, `Default` and the shared constructors for a
/// struct with a single `base: BaseModel` field.
macro_rules! impl_entity {
    ($ty:ident, $name:literal) => {
        impl $ty {
            pub const TYPE_NAME: &'static str = $name;

            pub fn new() -> Self {
                $ty {
                    base: $crate::models::BaseModel::new(),
                }
            }

            pub fn from_dict(
                map: serde_json::Map<String, serde_json::Value>,
            ) -> Result<Self, $crate::models::ModelError> {
                Ok($ty {
                    base: $crate::models::BaseModel::from_dict(map)?,
                })
            }

            pub(crate) fn factory(
                map: serde_json::Map<String, serde_json::Value>,
            ) -> Result<Box<dyn $crate::models::Entity>, $crate::models::ModelError> {
                Ok(Box::new(Self::from_dict(map)?))
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::models::Entity for $ty {
            fn type_name(&self) -> &'static str {
                Self::TYPE_NAME
            }

            fn base(&self) -> &$crate::models::BaseModel {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::models::BaseModel {
                &mut self.base
            }

            fn clone_entity(&self) -> Box<dyn $crate::models::Entity> {
                Box::new(self.clone())
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.base.describe(Self::TYPE_NAME))
            }
        }
    };
}

pub mod base_model;
pub mod registry;

pub mod amenity;
pub mod city;
pub mod place;
pub mod review;
pub mod state;
pub mod user;

pub use amenity::Amenity;
pub use base_model::{
    current_time, format_timestamp, parse_timestamp, BaseModel, Entity, ModelError, CLASS_KEY,
    TIME_FORMAT,
};
pub use city::City;
pub use place::Place;
pub use registry::{Factory, ModelRegistry, ModelSpec};
pub use review::Review;
pub use state::State;
pub use user::User;
