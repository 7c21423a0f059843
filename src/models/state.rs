// State - top of the location hierarchy (State → City → Place)

use serde_json::Value;

use super::BaseModel;

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    base: BaseModel,
}

impl_entity!(State, "State");

impl State {
    pub fn named(name: impl Into<String>) -> Self {
        let mut state = State::new();
        state.set_name(name);
        state
    }

    pub fn name(&self) -> &str {
        self.base.str_attr("name")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.base.put("name", Value::String(name.into()));
    }
}
