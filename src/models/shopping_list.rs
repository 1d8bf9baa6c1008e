use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MealSlot;

/// Category used for ingredients that carry none
pub const DEFAULT_CATEGORY: &str = "Other";

/// How ingredient categories are compared when grouping a shopping list
///
/// Ingredient names are always compared case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMatch {
    /// "Dairy" and "dairy" are separate categories
    #[default]
    CaseSensitive,
    /// "Dairy" and "dairy" share one category, displayed with the first-seen casing
    CaseInsensitive,
}

impl CategoryMatch {
    /// Grouping key for a category under this policy
    pub fn key(&self, category: &str) -> String {
        match self {
            CategoryMatch::CaseSensitive => category.to_string(),
            CategoryMatch::CaseInsensitive => category.to_lowercase(),
        }
    }
}

/// One deduplicated ingredient and how many times it was planned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub name: String,
    /// Serialized as `quantity` on the wire
    #[serde(rename = "quantity")]
    pub occurrence_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListCategory {
    pub category: String,
    pub items: Vec<ShoppingListEntry>,
}

/// Categories in ascending order, items in first-seen order
pub type ShoppingList = Vec<ShoppingListCategory>;

/// An ingredient that could not be placed on the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedIngredient {
    pub recipe_id: Uuid,
    pub day: String,
    pub slot: MealSlot,
    /// Index within the recipe's ingredient list
    pub position: usize,
}

/// Result of aggregating a meal plan
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregation {
    pub shopping_list: ShoppingList,
    pub skipped: Vec<MalformedIngredient>,
}
