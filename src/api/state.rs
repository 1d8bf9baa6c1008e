use std::sync::Arc;

use crate::{
    auth::TokenService,
    db::{MealPlanStore, MemoryStore, PgStore, RecipeStore, UserStore},
    models::CategoryMatch,
};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub recipes: Arc<dyn RecipeStore>,
    pub meal_plans: Arc<dyn MealPlanStore>,
    pub tokens: TokenService,
    pub category_match: CategoryMatch,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        recipes: Arc<dyn RecipeStore>,
        meal_plans: Arc<dyn MealPlanStore>,
        tokens: TokenService,
        category_match: CategoryMatch,
    ) -> Self {
        Self {
            users,
            recipes,
            meal_plans,
            tokens,
            category_match,
        }
    }

    /// State backed by a single Postgres store
    pub fn postgres(store: PgStore, tokens: TokenService, category_match: CategoryMatch) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store, tokens, category_match)
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(tokens: TokenService, category_match: CategoryMatch) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store, tokens, category_match)
    }
}
