use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    db::{MealPlanStore, RecipeStore},
    error::{AppError, AppResult},
    models::{DayPlan, DayView, MealPlan, MealSlot, MealsView, Recipe, RecipeSummary},
};

/// What to drop from a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearTarget {
    Everything,
    Day(String),
    Slot { day: String, slot: MealSlot },
}

/// Adds or replaces one day of the user's plan after checking every referenced recipe exists
pub async fn set_day(
    meal_plans: &dyn MealPlanStore,
    recipes: &dyn RecipeStore,
    user_id: Uuid,
    day: DayPlan,
) -> AppResult<Vec<DayView>> {
    if day.day.trim().is_empty() {
        return Err(AppError::invalid("Day is required"));
    }

    let mut wanted: Vec<Uuid> = day.meals.filled().map(|(_, id)| id).collect();
    wanted.sort();
    wanted.dedup();
    if !wanted.is_empty() {
        let found = recipes.find_recipes(&wanted).await?;
        if found.len() != wanted.len() {
            return Err(AppError::invalid("One or more meal IDs are invalid."));
        }
    }

    let label = day.day.clone();
    let plan = meal_plans.upsert_day(user_id, day).await?;
    tracing::info!(user_id = %user_id, day = %label, slots = wanted.len(), "Meal plan day saved");

    populate(recipes, &plan).await
}

/// The user's plan with every slot resolved to a recipe summary
pub async fn get_plan(
    meal_plans: &dyn MealPlanStore,
    recipes: &dyn RecipeStore,
    user_id: Uuid,
) -> AppResult<Vec<DayView>> {
    let plan = meal_plans.meal_plan(user_id).await?;
    if plan.is_empty() {
        return Err(AppError::not_found("No meal plan found for this user"));
    }
    populate(recipes, &plan).await
}

/// Drops all or part of the user's plan and returns what remains
///
/// Removing a day that is not planned is not an error.
pub async fn clear(
    meal_plans: &dyn MealPlanStore,
    recipes: &dyn RecipeStore,
    user_id: Uuid,
    target: ClearTarget,
) -> AppResult<Vec<DayView>> {
    match target {
        ClearTarget::Everything => {
            meal_plans.clear(user_id).await?;
            tracing::info!(user_id = %user_id, "Meal plan cleared");
            Ok(Vec::new())
        }
        ClearTarget::Day(label) => {
            let removed = meal_plans.remove_day(user_id, &label).await?;
            tracing::info!(user_id = %user_id, day = %label, removed, "Meal plan day cleared");
            let plan = meal_plans.meal_plan(user_id).await?;
            populate(recipes, &plan).await
        }
        ClearTarget::Slot { day, slot } => {
            let plan = meal_plans.meal_plan(user_id).await?;
            let Some(existing) = plan.day(&day) else {
                return Err(AppError::NotFound(format!("No meal plan found for {day}")));
            };
            if existing.meals.get(slot).is_none() {
                return Err(AppError::NotFound(format!("No {slot} found for {day}")));
            }

            let mut updated = existing.clone();
            updated.meals.set(slot, None);
            let plan = meal_plans.upsert_day(user_id, updated).await?;
            tracing::info!(user_id = %user_id, day = %day, slot = %slot, "Meal slot cleared");
            populate(recipes, &plan).await
        }
    }
}

/// Resolves slot references in one batch; dangling references render as empty slots
async fn populate(recipes: &dyn RecipeStore, plan: &MealPlan) -> AppResult<Vec<DayView>> {
    let ids = plan.recipe_ids();
    let resolved: HashMap<Uuid, Recipe> = if ids.is_empty() {
        HashMap::new()
    } else {
        recipes
            .find_recipes(&ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect()
    };

    Ok(plan
        .days
        .iter()
        .map(|day| {
            let summary = |slot: MealSlot| {
                day.meals
                    .get(slot)
                    .and_then(|id| resolved.get(&id))
                    .map(summarize)
            };
            DayView {
                day: day.day.clone(),
                meals: MealsView {
                    breakfast: summary(MealSlot::Breakfast),
                    lunch: summary(MealSlot::Lunch),
                    dinner: summary(MealSlot::Dinner),
                    snacks: summary(MealSlot::Snacks),
                },
            }
        })
        .collect())
}

fn summarize(recipe: &Recipe) -> RecipeSummary {
    RecipeSummary {
        id: recipe.id,
        title: recipe.title.clone(),
        image: recipe.image.clone(),
        cuisine: recipe.cuisine.clone(),
        cooking_time: recipe.cooking_time,
    }
}
