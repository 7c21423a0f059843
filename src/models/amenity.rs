// Amenity - named feature a Place can offer

use serde_json::Value;

use super::BaseModel;

#[derive(Debug, Clone, PartialEq)]
pub struct Amenity {
    base: BaseModel,
}

impl_entity!(Amenity, "Amenity");

impl Amenity {
    pub fn named(name: impl Into<String>) -> Self {
        let mut amenity = Amenity::new();
        amenity.set_name(name);
        amenity
    }

    pub fn name(&self) -> &str {
        self.base.str_attr("name")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.base.put("name", Value::String(name.into()));
    }
}
