// City - belongs to a State through `state_id`

use serde_json::Value;

use super::{BaseModel, Entity, State};

#[derive(Debug, Clone, PartialEq)]
pub struct City {
    base: BaseModel,
}

impl_entity!(City, "City");

impl City {
    /// New city linked to `state`.
    pub fn in_state(state: &State, name: impl Into<String>) -> Self {
        let mut city = City::new();
        city.set_state_id(state.id());
        city.set_name(name);
        city
    }

    pub fn state_id(&self) -> &str {
        self.base.str_attr("state_id")
    }

    pub fn set_state_id(&mut self, state_id: impl Into<String>) {
        self.base.put("state_id", Value::String(state_id.into()));
    }

    pub fn name(&self) -> &str {
        self.base.str_attr("name")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.base.put("name", Value::String(name.into()));
    }
}
