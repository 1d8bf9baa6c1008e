use std::collections::{HashMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{RecipeStore, UserStore},
    error::{AppError, AppResult},
    models::{
        AuthorView, Comment, CommentView, Ingredient, LikeToggle, NewRecipe, Recipe,
        RecipeFilter, RecipeUpdate, RecipeView, Review, ReviewView, UserSummary,
    },
};

const REQUIRED_FIELDS: &str = "Title, ingredients, and steps are required";

/// What the requesting user's relationships look like
struct Viewer {
    id: Uuid,
    following: HashSet<Uuid>,
    saved: HashSet<Uuid>,
}

impl Viewer {
    async fn load(users: &dyn UserStore, id: Uuid) -> AppResult<Self> {
        let following = users.following(id).await?.into_iter().map(|u| u.id).collect();
        let saved = users.saved_recipe_ids(id).await?.into_iter().collect();
        Ok(Self {
            id,
            following,
            saved,
        })
    }
}

/// Shapes recipes for a viewer, resolving every referenced user in one lookup
async fn present(
    users: &dyn UserStore,
    viewer: &Viewer,
    recipes: Vec<Recipe>,
) -> AppResult<Vec<RecipeView>> {
    let mut ids: Vec<Uuid> = Vec::new();
    for recipe in &recipes {
        ids.push(recipe.owner_id);
        ids.extend(recipe.comments.iter().map(|c| c.user_id));
        ids.extend(recipe.reviews.iter().map(|r| r.user_id));
    }
    ids.sort();
    ids.dedup();

    let people: HashMap<Uuid, UserSummary> = users
        .find_users(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(recipes
        .into_iter()
        .map(|recipe| shape(recipe, viewer, &people))
        .collect())
}

fn shape(recipe: Recipe, viewer: &Viewer, people: &HashMap<Uuid, UserSummary>) -> RecipeView {
    let user = people.get(&recipe.owner_id).map(|author| AuthorView {
        id: author.id,
        name: author.name.clone(),
        email: author.email.clone(),
        is_followed: (author.id != viewer.id).then(|| viewer.following.contains(&author.id)),
    });

    let average_rating = recipe.average_rating();
    let comments = recipe
        .comments
        .into_iter()
        .map(|c| CommentView {
            id: c.id,
            user: people.get(&c.user_id).cloned(),
            text: c.text,
            created_at: c.created_at,
        })
        .collect();
    let reviews: Vec<ReviewView> = recipe
        .reviews
        .into_iter()
        .map(|r| ReviewView {
            user: people.get(&r.user_id).cloned(),
            rating: r.rating,
            review: r.review,
            created_at: r.created_at,
        })
        .collect();

    RecipeView {
        id: recipe.id,
        user,
        title: recipe.title,
        description: recipe.description,
        ingredients: recipe.ingredients,
        steps: recipe.steps,
        image: recipe.image,
        cuisine: recipe.cuisine,
        cooking_time: recipe.cooking_time,
        nutritional_facts: recipe.nutritional_facts,
        likes_count: recipe.likes.len(),
        likes: recipe.likes,
        comments,
        total_reviews: reviews.len(),
        reviews,
        average_rating,
        is_saved: viewer.saved.contains(&recipe.id),
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }
}

async fn present_one(
    users: &dyn UserStore,
    viewer_id: Uuid,
    recipe: Recipe,
) -> AppResult<RecipeView> {
    let viewer = Viewer::load(users, viewer_id).await?;
    present(users, &viewer, vec![recipe])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Recipe vanished while shaping".to_string()))
}

fn check_ingredients(ingredients: &[Ingredient]) -> AppResult<()> {
    if ingredients.iter().any(|i| !i.is_named()) {
        return Err(AppError::invalid("Every ingredient needs a name"));
    }
    Ok(())
}

fn check_cooking_time(cooking_time: Option<i32>) -> AppResult<()> {
    match cooking_time {
        Some(minutes) if minutes < 0 => Err(AppError::invalid("Cooking time cannot be negative")),
        _ => Ok(()),
    }
}

/// Validates the fields of a recipe about to be created
pub fn validate_new_recipe(fields: &NewRecipe) -> AppResult<()> {
    if fields.title.trim().is_empty() || fields.ingredients.is_empty() || fields.steps.is_empty() {
        return Err(AppError::invalid(REQUIRED_FIELDS));
    }
    check_ingredients(&fields.ingredients)?;
    check_cooking_time(fields.cooking_time)
}

/// Validates the present fields of a partial update
pub fn validate_update(update: &RecipeUpdate) -> AppResult<()> {
    let blank_title = update.title.as_deref().is_some_and(|t| t.trim().is_empty());
    let no_ingredients = update.ingredients.as_ref().is_some_and(Vec::is_empty);
    let no_steps = update.steps.as_ref().is_some_and(Vec::is_empty);
    if blank_title || no_ingredients || no_steps {
        return Err(AppError::invalid(REQUIRED_FIELDS));
    }
    if let Some(ingredients) = &update.ingredients {
        check_ingredients(ingredients)?;
    }
    check_cooking_time(update.cooking_time)
}

async fn require_recipe(recipes: &dyn RecipeStore, recipe_id: Uuid) -> AppResult<Recipe> {
    recipes
        .find_recipe(recipe_id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe not found"))
}

pub async fn create_recipe(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    owner_id: Uuid,
    fields: NewRecipe,
) -> AppResult<RecipeView> {
    validate_new_recipe(&fields)?;

    let recipe = recipes.insert_recipe(Recipe::new(owner_id, fields)).await?;
    tracing::info!(
        recipe_id = %recipe.id,
        owner_id = %owner_id,
        ingredients = recipe.ingredients.len(),
        "Recipe created"
    );

    present_one(users, owner_id, recipe).await
}

/// Lists recipes matching the filter as seen by the viewer
pub async fn list_recipes(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    viewer_id: Uuid,
    filter: &RecipeFilter,
) -> AppResult<Vec<RecipeView>> {
    let found = recipes.list_recipes(filter).await?;
    let viewer = Viewer::load(users, viewer_id).await?;
    present(users, &viewer, found).await
}

pub async fn get_recipe(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    viewer_id: Uuid,
    recipe_id: Uuid,
) -> AppResult<RecipeView> {
    let recipe = require_recipe(recipes, recipe_id).await?;
    present_one(users, viewer_id, recipe).await
}

/// Recipes by one author; an author without recipes is reported as not found
pub async fn user_recipes(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    viewer_id: Uuid,
    owner_id: Uuid,
) -> AppResult<Vec<RecipeView>> {
    let views = list_recipes(recipes, users, viewer_id, &RecipeFilter::by_owner(owner_id)).await?;
    if views.is_empty() {
        return Err(AppError::not_found("No recipes found for this user"));
    }
    Ok(views)
}

pub async fn search_recipes(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    viewer_id: Uuid,
    filter: &RecipeFilter,
) -> AppResult<Vec<RecipeView>> {
    let views = list_recipes(recipes, users, viewer_id, filter).await?;
    tracing::info!(viewer_id = %viewer_id, results = views.len(), "Recipe search");
    if views.is_empty() {
        return Err(AppError::not_found("No recipes found"));
    }
    Ok(views)
}

/// Applies a partial update; only the owner may edit
pub async fn update_recipe(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    viewer_id: Uuid,
    recipe_id: Uuid,
    update: RecipeUpdate,
) -> AppResult<RecipeView> {
    let mut recipe = require_recipe(recipes, recipe_id).await?;
    if recipe.owner_id != viewer_id {
        return Err(AppError::Forbidden(
            "Not authorized to update this recipe".to_string(),
        ));
    }
    validate_update(&update)?;

    recipe.apply(update);
    recipes.update_recipe(&recipe).await?;
    tracing::info!(recipe_id = %recipe_id, "Recipe updated");

    present_one(users, viewer_id, recipe).await
}

/// Deletes a recipe; only the owner may delete
pub async fn delete_recipe(
    recipes: &dyn RecipeStore,
    viewer_id: Uuid,
    recipe_id: Uuid,
) -> AppResult<()> {
    let recipe = require_recipe(recipes, recipe_id).await?;
    if recipe.owner_id != viewer_id {
        return Err(AppError::Forbidden(
            "Not authorized to delete this recipe".to_string(),
        ));
    }

    recipes.delete_recipe(recipe_id).await?;
    tracing::info!(recipe_id = %recipe_id, "Recipe deleted");
    Ok(())
}

pub async fn toggle_like(
    recipes: &dyn RecipeStore,
    viewer_id: Uuid,
    recipe_id: Uuid,
) -> AppResult<LikeToggle> {
    recipes
        .toggle_like(recipe_id, viewer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe not found"))
}

pub async fn add_comment(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    viewer_id: Uuid,
    recipe_id: Uuid,
    text: String,
) -> AppResult<CommentView> {
    if text.trim().is_empty() {
        return Err(AppError::invalid("Comment text is required"));
    }
    require_recipe(recipes, recipe_id).await?;

    let comment = Comment {
        id: Uuid::new_v4(),
        user_id: viewer_id,
        text,
        created_at: Utc::now(),
    };
    recipes.add_comment(recipe_id, comment.clone()).await?;

    let user = users.find_users(&[viewer_id]).await?.pop();
    Ok(CommentView {
        id: comment.id,
        user,
        text: comment.text,
        created_at: comment.created_at,
    })
}

/// Result of adding a review
#[derive(Debug)]
pub struct ReviewOutcome {
    pub review: ReviewView,
    pub average_rating: Option<f64>,
    pub total_reviews: usize,
}

/// Adds the viewer's single review of a recipe
pub async fn add_review(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    viewer_id: Uuid,
    recipe_id: Uuid,
    rating: i16,
    text: Option<String>,
) -> AppResult<ReviewOutcome> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::invalid("Rating must be between 1 and 5"));
    }

    let mut recipe = require_recipe(recipes, recipe_id).await?;
    if recipe.has_review_from(viewer_id) {
        return Err(AppError::invalid("You already reviewed this recipe"));
    }

    let review = Review {
        user_id: viewer_id,
        rating,
        review: text,
        created_at: Utc::now(),
    };
    if !recipes.add_review(recipe_id, review.clone()).await? {
        return Err(AppError::invalid("You already reviewed this recipe"));
    }
    recipe.reviews.push(review.clone());

    let user = users.find_users(&[viewer_id]).await?.pop();
    Ok(ReviewOutcome {
        review: ReviewView {
            user,
            rating: review.rating,
            review: review.review,
            created_at: review.created_at,
        },
        average_rating: recipe.average_rating(),
        total_reviews: recipe.reviews.len(),
    })
}

/// Flips whether the viewer saved a recipe; returns the new state and saved ids
pub async fn toggle_save(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    viewer_id: Uuid,
    recipe_id: Uuid,
) -> AppResult<(bool, Vec<Uuid>)> {
    require_recipe(recipes, recipe_id).await?;
    let saved = users.toggle_saved(viewer_id, recipe_id).await?;
    let ids = users.saved_recipe_ids(viewer_id).await?;
    Ok((saved, ids))
}

/// The viewer's saved recipes in the order they were saved
pub async fn saved_recipes(
    recipes: &dyn RecipeStore,
    users: &dyn UserStore,
    viewer_id: Uuid,
) -> AppResult<Vec<RecipeView>> {
    let ids = users.saved_recipe_ids(viewer_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut found: HashMap<Uuid, Recipe> = recipes
        .find_recipes(&ids)
        .await?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();
    let ordered: Vec<Recipe> = ids.iter().filter_map(|id| found.remove(id)).collect();

    let viewer = Viewer::load(users, viewer_id).await?;
    present(users, &viewer, ordered).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MockRecipeStore, MockUserStore};

    fn new_recipe() -> NewRecipe {
        NewRecipe {
            title: "Pancakes".to_string(),
            description: "Fluffy".to_string(),
            ingredients: vec![Ingredient::new("Flour", "200g", Some("Baking"))],
            steps: vec!["Whisk".to_string(), "Fry".to_string()],
            ..NewRecipe::default()
        }
    }

    #[test]
    fn test_validate_new_recipe_requires_core_fields() {
        assert!(validate_new_recipe(&new_recipe()).is_ok());

        let mut no_title = new_recipe();
        no_title.title = "  ".to_string();
        let mut no_steps = new_recipe();
        no_steps.steps.clear();
        let mut no_ingredients = new_recipe();
        no_ingredients.ingredients.clear();

        for fields in [no_title, no_steps, no_ingredients] {
            let err = validate_new_recipe(&fields).unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(msg) if msg == REQUIRED_FIELDS));
        }
    }

    #[test]
    fn test_validate_rejects_nameless_ingredient_and_negative_time() {
        let mut nameless = new_recipe();
        nameless.ingredients.push(Ingredient::new("", "1", None));
        assert!(validate_new_recipe(&nameless).is_err());

        let update = RecipeUpdate {
            cooking_time: Some(-5),
            ..RecipeUpdate::default()
        };
        assert!(validate_update(&update).is_err());
        assert!(validate_update(&RecipeUpdate::default()).is_ok());
    }

    #[test]
    fn test_shape_marks_follow_and_save_state() {
        let author = UserSummary {
            id: Uuid::new_v4(),
            name: "Chef".to_string(),
            email: "chef@example.com".to_string(),
        };
        let mut recipe = Recipe::new(author.id, new_recipe());
        recipe.likes.push(Uuid::new_v4());
        let viewer = Viewer {
            id: Uuid::new_v4(),
            following: HashSet::from([author.id]),
            saved: HashSet::from([recipe.id]),
        };
        let people = HashMap::from([(author.id, author.clone())]);

        let view = shape(recipe.clone(), &viewer, &people);
        assert_eq!(view.user.as_ref().unwrap().is_followed, Some(true));
        assert!(view.is_saved);
        assert_eq!(view.likes_count, 1);
        assert_eq!(view.total_reviews, 0);

        let own = Viewer {
            id: author.id,
            following: HashSet::new(),
            saved: HashSet::new(),
        };
        let view = shape(recipe, &own, &people);
        assert_eq!(view.user.unwrap().is_followed, None);
        assert!(!view.is_saved);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let recipe = Recipe::new(Uuid::new_v4(), new_recipe());
        let recipe_id = recipe.id;

        let mut recipes = MockRecipeStore::new();
        recipes
            .expect_find_recipe()
            .returning(move |_| Ok(Some(recipe.clone())));
        recipes.expect_update_recipe().never();
        let users = MockUserStore::new();

        let err = update_recipe(
            &recipes,
            &users,
            Uuid::new_v4(),
            recipe_id,
            RecipeUpdate::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_recipe_is_not_found() {
        let mut recipes = MockRecipeStore::new();
        recipes.expect_find_recipe().returning(|_| Ok(None));
        recipes.expect_delete_recipe().never();

        let err = delete_recipe(&recipes, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_review_rating_out_of_range() {
        let recipes = MockRecipeStore::new();
        let users = MockUserStore::new();
        for rating in [0, 6] {
            let err = add_review(&recipes, &users, Uuid::new_v4(), Uuid::new_v4(), rating, None)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
    }
}
