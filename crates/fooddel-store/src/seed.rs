//! Sample restaurants and menus for a fresh database.

use tracing::info;

use crate::sqlite::SqliteStore;
use crate::types::{NewMenuItem, NewRestaurant};
use fooddel_core::Result;

/// (name, location, cuisine, phone, rating, pricing)
const RESTAURANTS: &[(&str, &str, &str, &str, f64, &str)] = &[
    ("Spice Kitchen", "Bandra, Mumbai", "North Indian", "0221234567", 4.3, "Moderate"),
    ("Mumbai Tiffins", "Andheri, Mumbai", "South Indian", "0227654321", 4.6, "Low"),
    ("Pizza Hub", "Juhu, Mumbai", "Italian", "0229998888", 4.1, "High"),
    ("Seafood Paradise", "Colaba, Mumbai", "Seafood", "0221122334", 4.4, "High"),
    ("Chinese Wok", "Powai, Mumbai", "Chinese", "0224455667", 4.2, "Moderate"),
    ("Vrindavan", "Kandivali(W), Mumbai", "Indian", "0897776543", 4.3, "Moderate"),
    ("East Asia", "Mahavir Nagar, Kandivali, Mumbai", "Japanese", "9909090909", 4.4, "High"),
    ("Mexibay", "Andheri", "Mexican", "9999999999", 4.1, "High"),
];

/// (dish, price, type) per restaurant, in the same order as `RESTAURANTS`.
const MENUS: &[&[(&str, f64, &str)]] = &[
    &[("Paneer Butter Masala", 240.0, "Veg"), ("Butter Chicken", 320.0, "Non-Veg"), ("Garlic Naan", 60.0, "Veg")],
    &[("Masala Dosa", 90.0, "Veg"), ("Idli Sambar", 60.0, "Veg"), ("Filter Coffee", 40.0, "Veg")],
    &[("Margherita Pizza", 299.0, "Veg"), ("Pepperoni Pizza", 399.0, "Non-Veg")],
    &[("Surmai Fry", 450.0, "Non-Veg"), ("Prawn Curry", 420.0, "Non-Veg")],
    &[("Hakka Noodles", 180.0, "Veg"), ("Chilli Chicken", 260.0, "Non-Veg")],
    &[("Veg Thali", 220.0, "Veg"), ("Dal Khichdi", 150.0, "Veg")],
    &[("Sushi Platter", 650.0, "Non-Veg"), ("Veg Ramen", 380.0, "Veg")],
    &[("Chicken Burrito", 340.0, "Non-Veg"), ("Bean Quesadilla", 280.0, "Veg")],
];

/// Insert the sample catalog unless restaurants already exist.
///
/// Returns the number of restaurants inserted.
pub fn seed_sample_data(store: &SqliteStore) -> Result<usize> {
    let existing = store.count("Restaurant")?;
    if existing > 0 {
        info!("Skipping seed: {} restaurants already present", existing);
        return Ok(0);
    }

    for (&(name, location, cuisine, phone_no, rating, pricing), menu) in
        RESTAURANTS.iter().zip(MENUS)
    {
        let restaurant = store.create_restaurant(&NewRestaurant {
            name: name.to_string(),
            location: location.to_string(),
            cuisine: cuisine.to_string(),
            phone_no: phone_no.to_string(),
            rating,
            pricing: pricing.to_string(),
            user_id: None,
        })?;

        for &(dish, price, types) in menu.iter() {
            store.add_menu_item(&NewMenuItem {
                restaurant_id: restaurant.restaurant_id,
                items: dish.to_string(),
                price,
                types: types.to_string(),
                cuisine: cuisine.to_string(),
            })?;
        }
    }

    info!("Seeded {} sample restaurants", RESTAURANTS.len());
    Ok(RESTAURANTS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_seed_once() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();

        assert_eq!(seed_sample_data(&store).unwrap(), 8);
        assert_eq!(seed_sample_data(&store).unwrap(), 0);

        let restaurants = store.list_restaurants().unwrap();
        assert_eq!(restaurants.len(), 8);
        let tiffins = restaurants
            .iter()
            .find(|r| r.name.as_deref() == Some("Mumbai Tiffins"))
            .unwrap();
        assert_eq!(tiffins.rating, Some(4.6));

        let menu = store.menu_for_restaurant(tiffins.restaurant_id).unwrap();
        assert_eq!(menu.len(), 3);
        assert!(menu.iter().all(|m| m.cuisine.as_deref() == Some("South Indian")));
    }
}
