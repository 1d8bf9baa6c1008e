use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single ingredient line of a recipe
///
/// `quantity` is free text ("2 cups", "a pinch") and is never parsed.
/// A missing `name` deserializes to an empty string so that legacy rows still
/// load; such ingredients are skipped when building a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ingredient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Ingredient {
    pub fn new(name: &str, quantity: &str, category: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            quantity: quantity.to_string(),
            category: category.map(str::to_string),
        }
    }

    /// True when the ingredient carries a usable name
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NutritionalFacts {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub user_id: Uuid,
    pub rating: i16,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recipe together with its social data
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    pub cooking_time: Option<i32>,
    pub nutritional_facts: Option<NutritionalFacts>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Builds a fresh recipe with no likes, comments or reviews
    pub fn new(owner_id: Uuid, fields: NewRecipe) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: fields.title,
            description: fields.description,
            ingredients: fields.ingredients,
            steps: fields.steps,
            image: fields.image,
            cuisine: fields.cuisine,
            cooking_time: fields.cooking_time,
            nutritional_facts: fields.nutritional_facts,
            likes: Vec::new(),
            comments: Vec::new(),
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    pub fn has_review_from(&self, user_id: Uuid) -> bool {
        self.reviews.iter().any(|r| r.user_id == user_id)
    }

    /// Mean review rating, `None` when unreviewed
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: f64 = self.reviews.iter().map(|r| f64::from(r.rating)).sum();
        Some(total / self.reviews.len() as f64)
    }

    /// Applies the present fields of a partial update
    pub fn apply(&mut self, update: RecipeUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(ingredients) = update.ingredients {
            self.ingredients = ingredients;
        }
        if let Some(steps) = update.steps {
            self.steps = steps;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        if let Some(cuisine) = update.cuisine {
            self.cuisine = Some(cuisine);
        }
        if let Some(cooking_time) = update.cooking_time {
            self.cooking_time = Some(cooking_time);
        }
        if let Some(facts) = update.nutritional_facts {
            self.nutritional_facts = Some(facts);
        }
        self.updated_at = Utc::now();
    }
}

/// Validated fields of a recipe being created
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    pub cooking_time: Option<i32>,
    pub nutritional_facts: Option<NutritionalFacts>,
}

/// Partial update of a recipe; `None` leaves a field untouched
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub steps: Option<Vec<String>>,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    pub cooking_time: Option<i32>,
    pub nutritional_facts: Option<NutritionalFacts>,
}

/// Outcome of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes: usize,
}

/// Search and listing criteria for recipes
///
/// All text criteria are case-insensitive substring matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipeFilter {
    pub owner_id: Option<Uuid>,
    pub keyword: Option<String>,
    pub cuisine: Option<String>,
    /// Any term may match an ingredient name or category
    pub ingredients: Vec<String>,
    pub max_cooking_time: Option<i32>,
}

impl RecipeFilter {
    pub fn by_owner(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }

    /// Evaluates the filter against a recipe held in memory
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(owner_id) = self.owner_id {
            if recipe.owner_id != owner_id {
                return false;
            }
        }

        let cuisine = recipe.cuisine.as_deref().unwrap_or_default();

        if let Some(keyword) = &self.keyword {
            let hit = contains_ci(&recipe.title, keyword)
                || contains_ci(&recipe.description, keyword)
                || contains_ci(cuisine, keyword);
            if !hit {
                return false;
            }
        }

        if let Some(wanted) = &self.cuisine {
            if !contains_ci(cuisine, wanted) {
                return false;
            }
        }

        if !self.ingredients.is_empty() {
            let hit = recipe.ingredients.iter().any(|ingredient| {
                self.ingredients.iter().any(|term| {
                    contains_ci(&ingredient.name, term)
                        || ingredient
                            .category
                            .as_deref()
                            .is_some_and(|c| contains_ci(c, term))
                })
            });
            if !hit {
                return false;
            }
        }

        if let Some(max) = self.max_cooking_time {
            match recipe.cooking_time {
                Some(time) if time <= max => {}
                _ => return false,
            }
        }

        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
