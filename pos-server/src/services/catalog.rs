//! Catalog - foods, categories and discounts
//!
//! The POS core only reads from the catalog. `MemoryCatalog` keeps every
//! entity in `RwLock` caches and is also the place admin tooling updates
//! prices; existing order lines hold their own snapshot and never see it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Category, Discount, Food};

use crate::pricing::filter_active;

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Categories by `sort_order`, then name
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn list_foods_by_category(&self, category_id: i64) -> AppResult<Vec<Food>>;

    async fn get_food(&self, food_id: i64) -> AppResult<Food>;

    /// Discounts whose validity window contains `now`
    async fn list_active_discounts(&self, now: i64) -> AppResult<Vec<Discount>>;
}

/// In-memory catalog
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    categories: Arc<RwLock<HashMap<i64, Category>>>,
    foods: Arc<RwLock<HashMap<i64, Food>>>,
    discounts: Arc<RwLock<Vec<Discount>>>,
}

impl std::fmt::Debug for MemoryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCatalog")
            .field("categories", &self.categories.read().len())
            .field("foods", &self.foods.read().len())
            .field("discounts", &self.discounts.read().len())
            .finish()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_category(&self, category: Category) {
        self.categories.write().insert(category.id, category);
    }

    pub fn upsert_food(&self, food: Food) {
        self.foods.write().insert(food.id, food);
    }

    pub fn add_discount(&self, discount: Discount) {
        let mut discounts = self.discounts.write();
        discounts.retain(|d| d.id != discount.id);
        discounts.push(discount);
    }

    /// Change a food's catalog price
    pub fn update_price(&self, food_id: i64, price: f64) -> AppResult<Food> {
        let mut foods = self.foods.write();
        let food = foods
            .get_mut(&food_id)
            .ok_or_else(|| AppError::new(ErrorCode::FoodNotFound).with_detail("food_id", food_id))?;
        food.price = price;
        tracing::debug!(food_id, price, "Catalog price updated");
        Ok(food.clone())
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut categories: Vec<_> = self.categories.read().values().cloned().collect();
        categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn list_foods_by_category(&self, category_id: i64) -> AppResult<Vec<Food>> {
        if !self.categories.read().contains_key(&category_id) {
            return Err(
                AppError::new(ErrorCode::CategoryNotFound).with_detail("category_id", category_id)
            );
        }
        let mut foods: Vec<_> = self
            .foods
            .read()
            .values()
            .filter(|f| f.category_id == category_id)
            .cloned()
            .collect();
        foods.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(foods)
    }

    async fn get_food(&self, food_id: i64) -> AppResult<Food> {
        self.foods
            .read()
            .get(&food_id)
            .cloned()
            .ok_or_else(|| AppError::new(ErrorCode::FoodNotFound).with_detail("food_id", food_id))
    }

    async fn list_active_discounts(&self, now: i64) -> AppResult<Vec<Discount>> {
        let all = self.discounts.read().clone();
        Ok(filter_active(all, now))
    }
}
