// Review - text left by a User on a Place

use serde_json::Value;

use super::{BaseModel, Entity, Place, User};

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    base: BaseModel,
}

impl_entity!(Review, "Review");

impl Review {
    pub fn by(user: &User, place: &Place, text: impl Into<String>) -> Self {
        let mut review = Review::new();
        review.set_user_id(user.id());
        review.set_place_id(place.id());
        review.set_text(text);
        review
    }

    pub fn place_id(&self) -> &str {
        self.base.str_attr("place_id")
    }

    pub fn set_place_id(&mut self, place_id: impl Into<String>) {
        self.base.put("place_id", Value::String(place_id.into()));
    }

    pub fn user_id(&self) -> &str {
        self.base.str_attr("user_id")
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.base.put("user_id", Value::String(user_id.into()));
    }

    pub fn text(&self) -> &str {
        self.base.str_attr("text")
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.base.put("text", Value::String(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_links_user_and_place() {
        let user = User::new();
        let place = Place::new();
        let review = Review::by(&user, &place, "Great stay");

        assert_eq!(review.user_id(), user.id());
        assert_eq!(review.place_id(), place.id());
        assert_eq!(review.text(), "Great stay");
    }
}
