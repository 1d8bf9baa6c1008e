pub mod meal_plan;
pub mod recipes;
pub mod shopping_list;
pub mod users;

pub use shopping_list::{build_shopping_list, shopping_list_for_user};
