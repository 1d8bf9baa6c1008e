use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    db::{MealPlanStore, RecipeStore},
    error::AppResult,
    models::{
        Aggregation, CategoryMatch, MalformedIngredient, MealPlan, Recipe, ShoppingListCategory,
        ShoppingListEntry, DEFAULT_CATEGORY,
    },
};

/// Items of one category, keyed by lowercased ingredient name
struct CategoryBucket {
    category: String,
    items: Vec<ShoppingListEntry>,
    positions: HashMap<String, usize>,
}

/// Aggregates the ingredients of every planned meal into a shopping list
///
/// Days are walked in plan order and each day's slots in breakfast, lunch,
/// dinner, snacks order; that order only decides which casing of a name (or,
/// under [`CategoryMatch::CaseInsensitive`], of a category) is displayed.
/// Slots whose recipe cannot be resolved contribute nothing. Ingredients
/// without a name are skipped and reported in [`Aggregation::skipped`].
pub fn build_shopping_list<'a, F>(plan: &MealPlan, policy: CategoryMatch, resolve: F) -> Aggregation
where
    F: Fn(Uuid) -> Option<&'a Recipe>,
{
    let mut buckets: HashMap<String, CategoryBucket> = HashMap::new();
    let mut skipped = Vec::new();

    for day in &plan.days {
        for (slot, recipe_id) in day.meals.filled() {
            let Some(recipe) = resolve(recipe_id) else {
                continue;
            };

            for (position, ingredient) in recipe.ingredients.iter().enumerate() {
                if !ingredient.is_named() {
                    skipped.push(MalformedIngredient {
                        recipe_id,
                        day: day.day.clone(),
                        slot,
                        position,
                    });
                    continue;
                }

                let category = ingredient
                    .category
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .unwrap_or(DEFAULT_CATEGORY);

                let bucket = buckets
                    .entry(policy.key(category))
                    .or_insert_with(|| CategoryBucket {
                        category: category.to_string(),
                        items: Vec::new(),
                        positions: HashMap::new(),
                    });

                let name_key = ingredient.name.to_lowercase();
                match bucket.positions.get(&name_key) {
                    Some(&index) => bucket.items[index].occurrence_count += 1,
                    None => {
                        bucket.positions.insert(name_key, bucket.items.len());
                        bucket.items.push(ShoppingListEntry {
                            name: ingredient.name.clone(),
                            occurrence_count: 1,
                        });
                    }
                }
            }
        }
    }

    let mut shopping_list: Vec<ShoppingListCategory> = buckets
        .into_values()
        .map(|bucket| ShoppingListCategory {
            category: bucket.category,
            items: bucket.items,
        })
        .collect();
    shopping_list.sort_by(|a, b| a.category.cmp(&b.category));

    Aggregation {
        shopping_list,
        skipped,
    }
}

/// Loads a user's plan, resolves its recipes in one batch and aggregates them
pub async fn shopping_list_for_user(
    meal_plans: &dyn MealPlanStore,
    recipes: &dyn RecipeStore,
    policy: CategoryMatch,
    user_id: Uuid,
) -> AppResult<Aggregation> {
    let plan = meal_plans.meal_plan(user_id).await?;
    let recipe_ids = plan.recipe_ids();

    let resolved: HashMap<Uuid, Recipe> = if recipe_ids.is_empty() {
        HashMap::new()
    } else {
        recipes
            .find_recipes(&recipe_ids)
            .await?
            .into_iter()
            .map(|recipe| (recipe.id, recipe))
            .collect()
    };

    let aggregation = build_shopping_list(&plan, policy, |id| resolved.get(&id));

    for malformed in &aggregation.skipped {
        tracing::warn!(
            user_id = %user_id,
            recipe_id = %malformed.recipe_id,
            day = %malformed.day,
            slot = %malformed.slot,
            position = malformed.position,
            "Skipping ingredient without a name"
        );
    }

    tracing::info!(
        user_id = %user_id,
        days = plan.days.len(),
        recipes_requested = recipe_ids.len(),
        recipes_resolved = resolved.len(),
        categories = aggregation.shopping_list.len(),
        "Built shopping list"
    );

    Ok(aggregation)
}
