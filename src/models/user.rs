// 👤 User - account owner of places and author of reviews

use serde_json::Value;

use super::BaseModel;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    base: BaseModel,
}

impl_entity!(User, "User");

impl User {
    pub fn email(&self) -> &str {
        self.base.str_attr("email")
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.base.put("email", Value::String(email.into()));
    }

    pub fn password(&self) -> &str {
        self.base.str_attr("password")
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.base.put("password", Value::String(password.into()));
    }

    pub fn first_name(&self) -> &str {
        self.base.str_attr("first_name")
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        self.base.put("first_name", Value::String(first_name.into()));
    }

    pub fn last_name(&self) -> &str {
        self.base.str_attr("last_name")
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) {
        self.base.put("last_name", Value::String(last_name.into()));
    }

    /// "First Last", skipping whichever part is empty.
    pub fn full_name(&self) -> String {
        [self.first_name(), self.last_name()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;

    #[test]
    fn test_user_defaults() {
        let user = User::new();

        assert_eq!(user.id().len(), 36);
        assert_eq!(user.email(), "");
        assert_eq!(user.full_name(), "");
        assert!(user.key().starts_with("User."));
    }

    #[test]
    fn test_user_accessors() {
        let mut user = User::new();
        user.set_email("airbnb@mail.com");
        user.set_password("root");
        user.set_first_name("Betty");
        user.set_last_name("Holberton");

        assert_eq!(user.email(), "airbnb@mail.com");
        assert_eq!(user.password(), "root");
        assert_eq!(user.full_name(), "Betty Holberton");

        let dict = user.to_dict();
        assert_eq!(dict["__class__"], "User");
        assert_eq!(dict["first_name"], "Betty");
    }

    #[test]
    fn test_user_display() {
        let user = User::new();
        assert!(user
            .to_string()
            .starts_with(&format!("[User] ({})", user.id())));
    }
}
