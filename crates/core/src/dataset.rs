//! Food catalog bundled with the application.

use crate::error::Error;
use crate::model::FoodRecord;

const DEFAULT_FOODS_JSON: &str = include_str!("../data/foods.json");

/// Parse the bundled default catalog.
///
/// # Errors
///
/// Returns `Error::Dataset` if the embedded JSON is malformed or a record fails
/// validation.
pub fn default_foods() -> Result<Vec<FoodRecord>, Error> {
    Ok(serde_json::from_str(DEFAULT_FOODS_JSON)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Nutrient;

    #[test]
    fn bundled_dataset_parses() {
        let foods = default_foods().unwrap();
        assert!(foods.len() >= 2);
        let banana = foods.iter().find(|f| f.name() == "Banana").unwrap();
        assert_eq!(banana.value(Nutrient::Calories), 105.0);
        assert_eq!(banana.category(), "fruit");
    }
}
