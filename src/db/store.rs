//! Repository traits shared by the Postgres and in-memory backends.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Comment, DayPlan, LikeToggle, MealPlan, NewUser, Recipe, RecipeFilter, Review, User,
        UserSummary,
    },
};

/// Accounts, the follow graph and saved recipes
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Creates an account; an already registered email is rejected as invalid input
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Looks up an account by its normalized email
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Public summaries of the given users; unknown ids are omitted
    async fn find_users(&self, ids: &[Uuid]) -> AppResult<Vec<UserSummary>>;

    /// Records that `follower_id` follows `followee_id`; false if it already did
    async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<bool>;

    /// Removes a follow edge; false if there was none
    async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<bool>;

    async fn followers(&self, user_id: Uuid) -> AppResult<Vec<UserSummary>>;

    async fn following(&self, user_id: Uuid) -> AppResult<Vec<UserSummary>>;

    /// Flips whether a recipe is saved; returns the new state
    async fn toggle_saved(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool>;

    /// Saved recipe ids in the order they were saved
    async fn saved_recipe_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;
}

/// Recipes with their likes, comments and reviews
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecipeStore: Send + Sync {
    async fn insert_recipe(&self, recipe: Recipe) -> AppResult<Recipe>;

    async fn find_recipe(&self, id: Uuid) -> AppResult<Option<Recipe>>;

    /// Batch lookup; ids with no recipe are omitted
    async fn find_recipes(&self, ids: &[Uuid]) -> AppResult<Vec<Recipe>>;

    /// Recipes matching the filter, newest first
    async fn list_recipes(&self, filter: &RecipeFilter) -> AppResult<Vec<Recipe>>;

    /// Persists the editable fields of an existing recipe
    async fn update_recipe(&self, recipe: &Recipe) -> AppResult<()>;

    /// Deletes a recipe and everything hanging off it; false if it did not exist
    async fn delete_recipe(&self, id: Uuid) -> AppResult<bool>;

    /// Flips the user's like; `None` if the recipe does not exist
    async fn toggle_like(&self, recipe_id: Uuid, user_id: Uuid) -> AppResult<Option<LikeToggle>>;

    async fn add_comment(&self, recipe_id: Uuid, comment: Comment) -> AppResult<()>;

    /// Adds a review; false if the user already reviewed the recipe
    async fn add_review(&self, recipe_id: Uuid, review: Review) -> AppResult<bool>;
}

/// Per-user meal plans
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MealPlanStore: Send + Sync {
    /// The user's plan; empty when nothing is planned
    async fn meal_plan(&self, user_id: Uuid) -> AppResult<MealPlan>;

    /// Replaces or appends one day and returns the updated plan
    async fn upsert_day(&self, user_id: Uuid, day: DayPlan) -> AppResult<MealPlan>;

    /// Removes one day; false if it was not planned
    async fn remove_day(&self, user_id: Uuid, day: &str) -> AppResult<bool>;

    async fn clear(&self, user_id: Uuid) -> AppResult<()>;
}
