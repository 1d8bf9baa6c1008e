use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        password::{check_strength, hash_password, verify_password},
        TokenService,
    },
    db::UserStore,
    error::{AppError, AppResult},
    models::{normalize_email, AccountView, NewUser, ProfileView, UserSummary, DEFAULT_AGE},
};

/// Credentials and profile data supplied at sign-up
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[validate(range(min = 1, message = "Age must be greater than 0"))]
    pub age: Option<i32>,
}

/// An authenticated session handed back to the client
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: AccountView,
}

pub async fn register(
    users: &dyn UserStore,
    tokens: &TokenService,
    mut registration: Registration,
) -> AppResult<Session> {
    registration.email = normalize_email(&registration.email);
    registration.name = registration.name.trim().to_string();
    if registration.name.is_empty()
        || registration.email.is_empty()
        || registration.password.is_empty()
    {
        return Err(AppError::invalid("Name, email and password are required"));
    }
    registration.validate()?;
    check_strength(&registration.password)?;

    if users
        .find_user_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(AppError::invalid("User already exists"));
    }

    let password_hash = hash_password(registration.password).await?;
    let user = users
        .create_user(NewUser {
            name: registration.name,
            email: registration.email,
            password_hash,
            age: registration.age.unwrap_or(DEFAULT_AGE),
        })
        .await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok(Session {
        token: tokens.issue(user.id)?,
        user: AccountView::from(&user),
    })
}

/// Exchanges credentials for a token; unknown email and wrong password look the same
pub async fn login(
    users: &dyn UserStore,
    tokens: &TokenService,
    email: &str,
    password: String,
) -> AppResult<Session> {
    let email = normalize_email(email);
    let Some(user) = users.find_user_by_email(&email).await? else {
        tracing::debug!("Login for unknown email");
        return Err(AppError::invalid("Invalid credentials"));
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(AppError::invalid("Invalid credentials"));
    }

    Ok(Session {
        token: tokens.issue(user.id)?,
        user: AccountView::from(&user),
    })
}

pub async fn profile(users: &dyn UserStore, user_id: Uuid) -> AppResult<ProfileView> {
    let user = users
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let followers = ids(users.followers(user_id).await?);
    let following = ids(users.following(user_id).await?);
    let saved_recipes = users.saved_recipe_ids(user_id).await?;

    Ok(ProfileView {
        id: user.id,
        name: user.name,
        email: user.email,
        age: user.age,
        followers,
        following,
        saved_recipes,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })
}

fn ids(summaries: Vec<UserSummary>) -> Vec<Uuid> {
    summaries.into_iter().map(|u| u.id).collect()
}

async fn require_user(users: &dyn UserStore, user_id: Uuid) -> AppResult<()> {
    match users.find_user(user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("User not found")),
    }
}

pub async fn follow(users: &dyn UserStore, follower_id: Uuid, followee_id: Uuid) -> AppResult<()> {
    if follower_id == followee_id {
        return Err(AppError::invalid("You can't follow yourself"));
    }
    require_user(users, followee_id).await?;

    if !users.follow(follower_id, followee_id).await? {
        return Err(AppError::invalid("Already following this user"));
    }
    tracing::info!(follower_id = %follower_id, followee_id = %followee_id, "Followed user");
    Ok(())
}

pub async fn unfollow(
    users: &dyn UserStore,
    follower_id: Uuid,
    followee_id: Uuid,
) -> AppResult<()> {
    require_user(users, followee_id).await?;

    if !users.unfollow(follower_id, followee_id).await? {
        return Err(AppError::invalid("You are not following this user"));
    }
    tracing::info!(follower_id = %follower_id, followee_id = %followee_id, "Unfollowed user");
    Ok(())
}

pub async fn followers(users: &dyn UserStore, user_id: Uuid) -> AppResult<Vec<UserSummary>> {
    require_user(users, user_id).await?;
    users.followers(user_id).await
}

pub async fn following(users: &dyn UserStore, user_id: Uuid) -> AppResult<Vec<UserSummary>> {
    require_user(users, user_id).await?;
    users.following(user_id).await
}
