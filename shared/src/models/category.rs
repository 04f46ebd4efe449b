//! Category Model

use serde::{Deserialize, Serialize};

/// Menu category (菜品分类)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}
