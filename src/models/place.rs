// 🏠 Place - a listing owned by a User inside a City
//
// Numeric attributes default to 0 when absent, matching the listing
// defaults of the web application.

use serde_json::Value;

use super::{Amenity, BaseModel, City, Entity, User};

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    base: BaseModel,
}

impl_entity!(Place, "Place");

impl Place {
    /// New listing owned by `user` in `city`.
    pub fn listed_by(user: &User, city: &City, name: impl Into<String>) -> Self {
        let mut place = Place::new();
        place.set_user_id(user.id());
        place.set_city_id(city.id());
        place.set_name(name);
        place
    }

    pub fn city_id(&self) -> &str {
        self.base.str_attr("city_id")
    }

    pub fn set_city_id(&mut self, city_id: impl Into<String>) {
        self.base.put("city_id", Value::String(city_id.into()));
    }

    pub fn user_id(&self) -> &str {
        self.base.str_attr("user_id")
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.base.put("user_id", Value::String(user_id.into()));
    }

    pub fn name(&self) -> &str {
        self.base.str_attr("name")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.base.put("name", Value::String(name.into()));
    }

    pub fn description(&self) -> &str {
        self.base.str_attr("description")
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.base.put("description", Value::String(description.into()));
    }

    pub fn number_rooms(&self) -> i64 {
        self.base.int_attr("number_rooms")
    }

    pub fn set_number_rooms(&mut self, rooms: i64) {
        self.base.put("number_rooms", Value::from(rooms));
    }

    pub fn number_bathrooms(&self) -> i64 {
        self.base.int_attr("number_bathrooms")
    }

    pub fn set_number_bathrooms(&mut self, bathrooms: i64) {
        self.base.put("number_bathrooms", Value::from(bathrooms));
    }

    pub fn max_guest(&self) -> i64 {
        self.base.int_attr("max_guest")
    }

    pub fn set_max_guest(&mut self, guests: i64) {
        self.base.put("max_guest", Value::from(guests));
    }

    pub fn price_by_night(&self) -> i64 {
        self.base.int_attr("price_by_night")
    }

    pub fn set_price_by_night(&mut self, price: i64) {
        self.base.put("price_by_night", Value::from(price));
    }

    pub fn latitude(&self) -> f64 {
        self.base.float_attr("latitude")
    }

    pub fn longitude(&self) -> f64 {
        self.base.float_attr("longitude")
    }

    pub fn set_location(&mut self, latitude: f64, longitude: f64) {
        self.base.put("latitude", Value::from(latitude));
        self.base.put("longitude", Value::from(longitude));
    }

    pub fn amenity_ids(&self) -> Vec<String> {
        self.base.str_list_attr("amenity_ids")
    }

    /// Link an amenity; linking the same amenity twice is a no-op.
    pub fn add_amenity(&mut self, amenity: &Amenity) {
        let mut ids = self.amenity_ids();
        if ids.iter().any(|id| id == amenity.id()) {
            return;
        }
        ids.push(amenity.id().to_string());
        self.base.put("amenity_ids", Value::from(ids));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_numeric_defaults() {
        let place = Place::new();

        assert_eq!(place.number_rooms(), 0);
        assert_eq!(place.price_by_night(), 0);
        assert_eq!(place.latitude(), 0.0);
        assert!(place.amenity_ids().is_empty());
    }

    #[test]
    fn test_place_listing() {
        let user = User::new();
        let city = City::new();
        let mut place = Place::listed_by(&user, &city, "Loft");
        place.set_number_rooms(2);
        place.set_max_guest(4);
        place.set_location(37.77, -122.41);

        assert_eq!(place.user_id(), user.id());
        assert_eq!(place.city_id(), city.id());
        assert_eq!(place.number_rooms(), 2);
        assert_eq!(place.max_guest(), 4);
        assert_eq!(place.longitude(), -122.41);
    }

    #[test]
    fn test_add_amenity_deduplicates() {
        let wifi = Amenity::named("Wifi");
        let mut place = Place::new();

        place.add_amenity(&wifi);
        place.add_amenity(&wifi);

        assert_eq!(place.amenity_ids(), vec![wifi.id().to_string()]);
    }
}
