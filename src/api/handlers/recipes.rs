use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::parse_id;
use crate::{
    api::AppState,
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{Ingredient, NewRecipe, NutritionalFacts, RecipeFilter, RecipeUpdate, RecipeView},
    services::recipes,
};

fn recipe_id(raw: &str) -> AppResult<Uuid> {
    parse_id(raw, "Invalid recipe ID")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    pub cooking_time: Option<i32>,
    pub nutritional_facts: Option<NutritionalFacts>,
}

impl From<CreateRecipeRequest> for NewRecipe {
    fn from(request: CreateRecipeRequest) -> Self {
        Self {
            title: request.title.trim().to_string(),
            description: request.description,
            ingredients: request.ingredients,
            steps: request.steps,
            image: request.image,
            cuisine: request.cuisine,
            cooking_time: request.cooking_time,
            nutritional_facts: request.nutritional_facts,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub steps: Option<Vec<String>>,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    pub cooking_time: Option<i32>,
    pub nutritional_facts: Option<NutritionalFacts>,
}

impl From<UpdateRecipeRequest> for RecipeUpdate {
    fn from(request: UpdateRecipeRequest) -> Self {
        Self {
            title: request.title.map(|t| t.trim().to_string()),
            description: request.description,
            ingredients: request.ingredients,
            steps: request.steps,
            image: request.image,
            cuisine: request.cuisine,
            cooking_time: request.cooking_time,
            nutritional_facts: request.nutritional_facts,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i16,
    pub review: Option<String>,
}

/// Query string of the search endpoint; blank parameters are ignored
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub cuisine: Option<String>,
    /// Comma-separated terms
    pub ingredients: Option<String>,
    pub max_cooking_time: Option<String>,
}

impl SearchQuery {
    fn into_filter(self) -> AppResult<RecipeFilter> {
        let present = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let max_cooking_time = match present(self.max_cooking_time) {
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|_| AppError::invalid("maxCookingTime must be a number"))?,
            ),
            None => None,
        };

        let ingredients = present(self.ingredients)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|term| !term.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(RecipeFilter {
            owner_id: None,
            keyword: present(self.keyword),
            cuisine: present(self.cuisine),
            ingredients,
            max_cooking_time,
        })
    }
}

pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let recipe = recipes::create_recipe(
        state.recipes.as_ref(),
        state.users.as_ref(),
        user.id,
        payload.into(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Recipe created successfully",
            "recipe": recipe,
        })),
    ))
}

pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<RecipeView>>> {
    let views = recipes::list_recipes(
        state.recipes.as_ref(),
        state.users.as_ref(),
        user.id,
        &RecipeFilter::default(),
    )
    .await?;
    Ok(Json(views))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<RecipeView>> {
    let view = recipes::get_recipe(
        state.recipes.as_ref(),
        state.users.as_ref(),
        user.id,
        recipe_id(&id)?,
    )
    .await?;
    Ok(Json(view))
}

pub async fn user_recipes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<RecipeView>>> {
    let owner_id = parse_id(&id, "Invalid user ID")?;
    let views = recipes::user_recipes(
        state.recipes.as_ref(),
        state.users.as_ref(),
        user.id,
        owner_id,
    )
    .await?;
    Ok(Json(views))
}

pub async fn search_recipes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<RecipeView>>> {
    let filter = query.into_filter()?;
    let views = recipes::search_recipes(
        state.recipes.as_ref(),
        state.users.as_ref(),
        user.id,
        &filter,
    )
    .await?;
    Ok(Json(views))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> AppResult<Json<RecipeView>> {
    let view = recipes::update_recipe(
        state.recipes.as_ref(),
        state.users.as_ref(),
        user.id,
        recipe_id(&id)?,
        payload.into(),
    )
    .await?;
    Ok(Json(view))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    recipes::delete_recipe(state.recipes.as_ref(), user.id, recipe_id(&id)?).await?;
    Ok(Json(json!({ "message": "Recipe deleted successfully" })))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let toggle = recipes::toggle_like(state.recipes.as_ref(), user.id, recipe_id(&id)?).await?;
    let message = if toggle.liked {
        "Recipe liked"
    } else {
        "Recipe unliked"
    };
    Ok(Json(json!({ "message": message, "likes": toggle.likes })))
}

pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let comment = recipes::add_comment(
        state.recipes.as_ref(),
        state.users.as_ref(),
        user.id,
        recipe_id(&id)?,
        payload.text,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment added successfully",
            "comment": comment,
        })),
    ))
}

pub async fn add_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let outcome = recipes::add_review(
        state.recipes.as_ref(),
        state.users.as_ref(),
        user.id,
        recipe_id(&id)?,
        payload.rating,
        payload.review,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Review added successfully",
            "review": outcome.review,
            "averageRating": outcome.average_rating,
            "totalReviews": outcome.total_reviews,
        })),
    ))
}

pub async fn toggle_save(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let (saved, saved_recipes) = recipes::toggle_save(
        state.recipes.as_ref(),
        state.users.as_ref(),
        user.id,
        recipe_id(&id)?,
    )
    .await?;

    let message = if saved { "Recipe saved" } else { "Recipe unsaved" };
    Ok(Json(json!({
        "message": message,
        "savedRecipes": saved_recipes,
    })))
}

pub async fn saved_recipes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<RecipeView>>> {
    let views =
        recipes::saved_recipes(state.recipes.as_ref(), state.users.as_ref(), user.id).await?;
    Ok(Json(views))
}
