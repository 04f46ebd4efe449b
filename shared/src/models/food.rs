//! Food Model

use serde::{Deserialize, Serialize};

/// Catalog food item (菜品)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub category_id: i64,
}

impl Food {
    /// Copy the fields an order line keeps, frozen at add-time.
    pub fn snapshot(&self) -> FoodSnapshot {
        FoodSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            description: self.description.clone(),
            category_id: self.category_id,
        }
    }
}

/// Food snapshot embedded in an order line
///
/// Later catalog price changes never reach an existing snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSnapshot {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub category_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_detached_from_catalog() {
        let mut food = Food {
            id: 1,
            name: "Pho".to_string(),
            price: 9.5,
            description: "beef".to_string(),
            category_id: 10,
        };
        let snap = food.snapshot();
        food.price = 12.0;
        assert_eq!(snap.price, 9.5);
        assert_eq!(snap.category_id, 10);
    }
}
