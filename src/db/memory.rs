use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{MealPlanStore, RecipeStore, UserStore},
    error::{AppError, AppResult},
    models::{
        Comment, DayPlan, LikeToggle, MealPlan, NewUser, Recipe, RecipeFilter, Review, User,
        UserSummary,
    },
};

/// In-process store backing all repositories
///
/// Used for local development and tests; nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

/// Inner state guarded by the lock
#[derive(Default)]
struct MemoryInner {
    users: HashMap<Uuid, User>,
    /// follower id -> followee ids, in follow order
    following: HashMap<Uuid, Vec<Uuid>>,
    saved: HashMap<Uuid, Vec<Uuid>>,
    recipes: HashMap<Uuid, Recipe>,
    meal_plans: HashMap<Uuid, MealPlan>,
}

impl MemoryInner {
    fn summaries(&self, ids: &[Uuid]) -> Vec<UserSummary> {
        ids.iter()
            .filter_map(|id| self.users.get(id))
            .map(UserSummary::from)
            .collect()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AppError::invalid("User already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            age: user.age,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> AppResult<Vec<UserSummary>> {
        Ok(self.inner.read().await.summaries(ids))
    }

    async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let edges = inner.following.entry(follower_id).or_default();
        if edges.contains(&followee_id) {
            return Ok(false);
        }
        edges.push(followee_id);
        Ok(true)
    }

    async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(edges) = inner.following.get_mut(&follower_id) else {
            return Ok(false);
        };
        let before = edges.len();
        edges.retain(|id| *id != followee_id);
        Ok(edges.len() != before)
    }

    async fn followers(&self, user_id: Uuid) -> AppResult<Vec<UserSummary>> {
        let inner = self.inner.read().await;
        let mut ids: Vec<Uuid> = inner
            .following
            .iter()
            .filter(|(_, followees)| followees.contains(&user_id))
            .map(|(follower, _)| *follower)
            .collect();
        ids.sort();
        Ok(inner.summaries(&ids))
    }

    async fn following(&self, user_id: Uuid) -> AppResult<Vec<UserSummary>> {
        let inner = self.inner.read().await;
        let ids = inner.following.get(&user_id).cloned().unwrap_or_default();
        Ok(inner.summaries(&ids))
    }

    async fn toggle_saved(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let saved = inner.saved.entry(user_id).or_default();
        if saved.contains(&recipe_id) {
            saved.retain(|id| *id != recipe_id);
            Ok(false)
        } else {
            saved.push(recipe_id);
            Ok(true)
        }
    }

    async fn saved_recipe_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner.saved.get(&user_id).cloned().unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl RecipeStore for MemoryStore {
    async fn insert_recipe(&self, recipe: Recipe) -> AppResult<Recipe> {
        let mut inner = self.inner.write().await;
        inner.recipes.insert(recipe.id, recipe.clone());
        Ok(recipe)
    }

    async fn find_recipe(&self, id: Uuid) -> AppResult<Option<Recipe>> {
        Ok(self.inner.read().await.recipes.get(&id).cloned())
    }

    async fn find_recipes(&self, ids: &[Uuid]) -> AppResult<Vec<Recipe>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.recipes.get(id))
            .cloned()
            .collect())
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> AppResult<Vec<Recipe>> {
        let inner = self.inner.read().await;
        let mut recipes: Vec<Recipe> = inner
            .recipes
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(recipes)
    }

    async fn update_recipe(&self, recipe: &Recipe) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.recipes.get_mut(&recipe.id) {
            Some(stored) => {
                // social data is owned by the toggle/add operations
                let likes = std::mem::take(&mut stored.likes);
                let comments = std::mem::take(&mut stored.comments);
                let reviews = std::mem::take(&mut stored.reviews);
                *stored = Recipe {
                    likes,
                    comments,
                    reviews,
                    ..recipe.clone()
                };
                Ok(())
            }
            None => Err(AppError::not_found("Recipe not found")),
        }
    }

    async fn delete_recipe(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.recipes.remove(&id).is_none() {
            return Ok(false);
        }
        for saved in inner.saved.values_mut() {
            saved.retain(|recipe_id| *recipe_id != id);
        }
        for plan in inner.meal_plans.values_mut() {
            for day in &mut plan.days {
                day.meals.forget(id);
            }
        }
        Ok(true)
    }

    async fn toggle_like(&self, recipe_id: Uuid, user_id: Uuid) -> AppResult<Option<LikeToggle>> {
        let mut inner = self.inner.write().await;
        let Some(recipe) = inner.recipes.get_mut(&recipe_id) else {
            return Ok(None);
        };
        let liked = if recipe.is_liked_by(user_id) {
            recipe.likes.retain(|id| *id != user_id);
            false
        } else {
            recipe.likes.push(user_id);
            true
        };
        Ok(Some(LikeToggle {
            liked,
            likes: recipe.likes.len(),
        }))
    }

    async fn add_comment(&self, recipe_id: Uuid, comment: Comment) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let recipe = inner
            .recipes
            .get_mut(&recipe_id)
            .ok_or_else(|| AppError::not_found("Recipe not found"))?;
        recipe.comments.push(comment);
        Ok(())
    }

    async fn add_review(&self, recipe_id: Uuid, review: Review) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let recipe = inner
            .recipes
            .get_mut(&recipe_id)
            .ok_or_else(|| AppError::not_found("Recipe not found"))?;
        if recipe.has_review_from(review.user_id) {
            return Ok(false);
        }
        recipe.reviews.push(review);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl MealPlanStore for MemoryStore {
    async fn meal_plan(&self, user_id: Uuid) -> AppResult<MealPlan> {
        let inner = self.inner.read().await;
        Ok(inner.meal_plans.get(&user_id).cloned().unwrap_or_default())
    }

    async fn upsert_day(&self, user_id: Uuid, day: DayPlan) -> AppResult<MealPlan> {
        let mut inner = self.inner.write().await;
        let plan = inner.meal_plans.entry(user_id).or_default();
        plan.upsert(day);
        Ok(plan.clone())
    }

    async fn remove_day(&self, user_id: Uuid, day: &str) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .meal_plans
            .get_mut(&user_id)
            .is_some_and(|plan| plan.remove(day)))
    }

    async fn clear(&self, user_id: Uuid) -> AppResult<()> {
        self.inner.write().await.meal_plans.remove(&user_id);
        Ok(())
    }
}
