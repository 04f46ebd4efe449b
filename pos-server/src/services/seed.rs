//! Seed files for the catalog and staff roster
//!
//! Both files live in the work directory and are optional:
//!
//! | File | Content |
//! |------|---------|
//! | `catalog.json` | `{ "categories": [...], "foods": [...], "discounts": [...] }` |
//! | `staff.json` | `[{ "id": 1, "name": "Alice", "pin": "1234" }]` |

use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::models::{Category, Discount, Food, StaffMember};
use shared::order::{MAX_PRICE, is_valid_price};

use super::{MemoryCatalog, MemoryStaffRoster};

pub const CATALOG_FILE: &str = "catalog.json";
pub const STAFF_FILE: &str = "staff.json";

/// Content of `catalog.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub foods: Vec<Food>,
    #[serde(default)]
    pub discounts: Vec<Discount>,
}

fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// `None` when the file does not exist
fn read_json<T: DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| invalid_data(format!("{}: {}", path.display(), e)))
        .map(Some)
}

impl CatalogSeed {
    pub fn load(dir: &Path) -> io::Result<Option<Self>> {
        read_json(&dir.join(CATALOG_FILE))
    }

    /// Foods must carry a price the order builder accepts
    pub fn apply(self, catalog: &MemoryCatalog) -> io::Result<()> {
        if let Some(food) = self.foods.iter().find(|f| !is_valid_price(f.price)) {
            return Err(invalid_data(format!(
                "{}: food {} price {} outside 0..={}",
                CATALOG_FILE, food.id, food.price, MAX_PRICE
            )));
        }
        for category in self.categories {
            catalog.upsert_category(category);
        }
        for food in self.foods {
            catalog.upsert_food(food);
        }
        for discount in self.discounts {
            catalog.add_discount(discount);
        }
        Ok(())
    }
}

pub fn load_staff(dir: &Path) -> io::Result<Option<Vec<StaffMember>>> {
    read_json(&dir.join(STAFF_FILE))
}

/// Fill the catalog and roster from the seed files in `dir`
pub fn load_into(dir: &Path, catalog: &MemoryCatalog, roster: &MemoryStaffRoster) -> io::Result<()> {
    match CatalogSeed::load(dir)? {
        Some(seed) => {
            let (categories, foods, discounts) =
                (seed.categories.len(), seed.foods.len(), seed.discounts.len());
            seed.apply(catalog)?;
            tracing::info!(categories, foods, discounts, "Catalog seeded");
        }
        None => tracing::warn!(dir = %dir.display(), "No {} found, catalog is empty", CATALOG_FILE),
    }

    match load_staff(dir)? {
        Some(staff) => {
            let count = staff.len();
            for member in staff {
                roster
                    .upsert(member)
                    .map_err(|e| invalid_data(format!("{}: {}", STAFF_FILE, e)))?;
            }
            tracing::info!(count, "Staff roster seeded");
        }
        None => tracing::warn!(dir = %dir.display(), "No {} found, roster is empty", STAFF_FILE),
    }
    Ok(())
}
