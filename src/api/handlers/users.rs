use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::parse_id;
use crate::{
    api::AppState,
    error::AppResult,
    middleware::AuthUser,
    models::{ProfileView, ShoppingList},
    services::{self, users::Registration},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    #[serde(default)]
    pub target_user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListResponse {
    pub shopping_list: ShoppingList,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Registration>,
) -> AppResult<Json<Value>> {
    let session = services::users::register(state.users.as_ref(), &state.tokens, payload).await?;
    Ok(Json(json!({
        "message": "User created successfully",
        "user": session.user,
        "token": session.token,
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    let session = services::users::login(
        state.users.as_ref(),
        &state.tokens,
        &payload.email,
        payload.password,
    )
    .await?;
    Ok(Json(json!({
        "message": "Login successful",
        "user": session.user,
        "token": session.token,
    })))
}

pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<ProfileView>> {
    let profile = services::users::profile(state.users.as_ref(), user.id).await?;
    Ok(Json(profile))
}

pub async fn follow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<FollowRequest>,
) -> AppResult<Json<Value>> {
    let target = parse_id(&payload.target_user_id, "Invalid user ID")?;
    services::users::follow(state.users.as_ref(), user.id, target).await?;
    Ok(Json(json!({ "message": "Followed successfully" })))
}

pub async fn unfollow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<FollowRequest>,
) -> AppResult<Json<Value>> {
    let target = parse_id(&payload.target_user_id, "Invalid user ID")?;
    services::users::unfollow(state.users.as_ref(), user.id, target).await?;
    Ok(Json(json!({ "message": "Unfollowed successfully" })))
}

pub async fn followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = parse_id(&id, "Invalid user ID")?;
    let followers = services::users::followers(state.users.as_ref(), user_id).await?;
    Ok(Json(json!({ "followers": followers })))
}

pub async fn following(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = parse_id(&id, "Invalid user ID")?;
    let following = services::users::following(state.users.as_ref(), user_id).await?;
    Ok(Json(json!({ "following": following })))
}

pub async fn shopping_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<ShoppingListResponse>> {
    let aggregation = services::shopping_list_for_user(
        state.meal_plans.as_ref(),
        state.recipes.as_ref(),
        state.category_match,
        user.id,
    )
    .await?;

    Ok(Json(ShoppingListResponse {
        shopping_list: aggregation.shopping_list,
    }))
}
