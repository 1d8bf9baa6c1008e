pub mod memory;
pub mod postgres;
mod store;

pub use memory::MemoryStore;
pub use postgres::{create_pool, run_migrations, PgStore};
pub use store::{MealPlanStore, RecipeStore, UserStore};

#[cfg(test)]
pub use store::{MockMealPlanStore, MockRecipeStore, MockUserStore};
