//! Response shapes returned to API clients

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Ingredient, NutritionalFacts, User, UserSummary};

/// Recipe author as seen by the viewer
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Absent when the viewer is the author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_followed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub user: Option<UserSummary>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub user: Option<UserSummary>,
    pub rating: i16,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recipe shaped for one viewer
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub id: Uuid,
    /// `None` when the author account no longer exists
    pub user: Option<AuthorView>,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    pub cooking_time: Option<i32>,
    pub nutritional_facts: Option<NutritionalFacts>,
    pub likes: Vec<Uuid>,
    pub likes_count: usize,
    pub comments: Vec<CommentView>,
    pub reviews: Vec<ReviewView>,
    pub average_rating: Option<f64>,
    pub total_reviews: usize,
    pub is_saved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller's own account
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub saved_recipes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account fields safe to return after register or login
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for AccountView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            created_at: user.created_at,
        }
    }
}

/// Minimal recipe data placed in meal-plan slots
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    pub cooking_time: Option<i32>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct MealsView {
    pub breakfast: Option<RecipeSummary>,
    pub lunch: Option<RecipeSummary>,
    pub dinner: Option<RecipeSummary>,
    pub snacks: Option<RecipeSummary>,
}

/// A planned day with its slots resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayView {
    pub day: String,
    pub meals: MealsView,
}
