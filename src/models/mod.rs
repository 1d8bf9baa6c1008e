pub mod meal_plan;
pub mod recipe;
pub mod shopping_list;
pub mod user;
pub mod views;

pub use meal_plan::{DayPlan, MealPlan, MealSlot, Meals};
pub use recipe::{
    Comment, Ingredient, LikeToggle, NewRecipe, NutritionalFacts, Recipe, RecipeFilter,
    RecipeUpdate, Review,
};
pub use shopping_list::{
    Aggregation, CategoryMatch, MalformedIngredient, ShoppingList, ShoppingListCategory,
    ShoppingListEntry, DEFAULT_CATEGORY,
};
pub use user::{normalize_email, NewUser, User, UserSummary, DEFAULT_AGE};
pub use views::{
    AccountView, AuthorView, CommentView, DayView, MealsView, ProfileView, RecipeSummary,
    RecipeView, ReviewView,
};
