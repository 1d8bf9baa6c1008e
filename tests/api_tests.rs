use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use recipe_hub_api::{
    api::{create_router, AppState},
    auth::TokenService,
    models::CategoryMatch,
};

const PASSWORD: &str = "Sup3r$ecret";

fn create_test_server() -> TestServer {
    create_test_server_with(CategoryMatch::CaseSensitive)
}

fn create_test_server_with(policy: CategoryMatch) -> TestServer {
    let state = AppState::in_memory(TokenService::new("test-secret", 3600), policy);
    let app = create_router(state, "http://localhost:4200");
    TestServer::new(app).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

/// Registers an account and returns (user id, token)
async fn sign_up(server: &TestServer, name: &str, email: &str) -> (String, String) {
    let response = server
        .post("/api/users/register")
        .json(&json!({ "name": name, "email": email, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    (
        body["user"]["id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn create_recipe(server: &TestServer, token: &str, body: Value) -> Value {
    let response = server
        .post("/api/recipes")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    created["recipe"].clone()
}

fn omelette() -> Value {
    json!({
        "title": "Omelette",
        "description": "Quick breakfast",
        "ingredients": [
            { "name": "Egg", "quantity": "2", "category": "Dairy" },
            { "name": "egg", "quantity": "1 extra", "category": "Dairy" }
        ],
        "steps": ["Whisk", "Fry"],
        "cuisine": "French",
        "cookingTime": 10
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let id = "4f1a8f0e-8f5c-4d5e-9a43-1d2c3b4a5f6e";
    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), id);

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let server = create_test_server();
    let (user_id, _) = sign_up(&server, "Alice", "Alice@Example.com").await;

    let response = server
        .post("/api/users/register")
        .json(&json!({ "name": "Alice", "email": "alice@example.com", "password": PASSWORD }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "User already exists");

    let response = server
        .post("/api/users/login")
        .json(&json!({ "email": "alice@example.com", "password": "Wr0ng!pass" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid credentials");

    let response = server
        .post("/api/users/login")
        .json(&json!({ "email": "ALICE@example.com", "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().unwrap().to_string();

    let response = server
        .get("/api/users/profile")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["id"], user_id.as_str());
    assert_eq!(profile["email"], "alice@example.com");
    assert_eq!(profile["age"], 18);
    assert!(profile.get("passwordHash").is_none());
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn test_weak_password_rejected() {
    let server = create_test_server();
    let response = server
        .post("/api/users/register")
        .json(&json!({ "name": "Bob", "email": "bob@example.com", "password": "password" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "weak password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = create_test_server();

    let response = server.get("/api/users/profile").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unauthorized");

    let response = server
        .get("/api/recipes")
        .add_header(AUTHORIZATION, bearer("not-a-token"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_recipe_crud_and_ownership() {
    let server = create_test_server();
    let (_, owner) = sign_up(&server, "Chef", "chef@example.com").await;
    let (_, other) = sign_up(&server, "Guest", "guest@example.com").await;

    let response = server
        .post("/api/recipes")
        .add_header(AUTHORIZATION, bearer(&owner))
        .json(&json!({ "title": "Empty", "ingredients": [], "steps": [] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Title, ingredients, and steps are required");

    let recipe = create_recipe(&server, &owner, omelette()).await;
    let id = recipe["id"].as_str().unwrap().to_string();
    assert_eq!(recipe["title"], "Omelette");
    assert_eq!(recipe["cookingTime"], 10);
    assert_eq!(recipe["likesCount"], 0);
    assert_eq!(recipe["user"]["name"], "Chef");

    let response = server
        .get(&format!("/api/recipes/{id}"))
        .add_header(AUTHORIZATION, bearer(&other))
        .await;
    response.assert_status_ok();
    let fetched: Value = response.json();
    assert_eq!(fetched["user"]["isFollowed"], false);
    assert_eq!(fetched["isSaved"], false);

    let response = server
        .get("/api/recipes/not-an-id")
        .add_header(AUTHORIZATION, bearer(&other))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid recipe ID");

    let response = server
        .put(&format!("/api/recipes/{id}"))
        .add_header(AUTHORIZATION, bearer(&other))
        .json(&json!({ "title": "Stolen" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "Not authorized to update this recipe");

    let response = server
        .put(&format!("/api/recipes/{id}"))
        .add_header(AUTHORIZATION, bearer(&owner))
        .json(&json!({ "title": "Cheese Omelette", "cookingTime": 12 }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["title"], "Cheese Omelette");
    assert_eq!(updated["cookingTime"], 12);
    assert_eq!(updated["description"], "Quick breakfast");

    let response = server
        .delete(&format!("/api/recipes/{id}"))
        .add_header(AUTHORIZATION, bearer(&other))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .delete(&format!("/api/recipes/{id}"))
        .add_header(AUTHORIZATION, bearer(&owner))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Recipe deleted successfully");

    let response = server
        .get(&format!("/api/recipes/{id}"))
        .add_header(AUTHORIZATION, bearer(&owner))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_comment_review_and_save() {
    let server = create_test_server();
    let (_, owner) = sign_up(&server, "Chef", "chef@example.com").await;
    let (_, fan) = sign_up(&server, "Fan", "fan@example.com").await;
    let recipe = create_recipe(&server, &owner, omelette()).await;
    let id = recipe["id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/api/recipes/{id}/like"))
        .add_header(AUTHORIZATION, bearer(&fan))
        .await;
    let body: Value = response.json();
    assert_eq!(body["message"], "Recipe liked");
    assert_eq!(body["likes"], 1);

    let response = server
        .post(&format!("/api/recipes/{id}/like"))
        .add_header(AUTHORIZATION, bearer(&fan))
        .await;
    let body: Value = response.json();
    assert_eq!(body["message"], "Recipe unliked");
    assert_eq!(body["likes"], 0);

    let response = server
        .post(&format!("/api/recipes/{id}/comment"))
        .add_header(AUTHORIZATION, bearer(&fan))
        .json(&json!({ "text": "Lovely" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["comment"]["text"], "Lovely");
    assert_eq!(body["comment"]["user"]["name"], "Fan");

    let response = server
        .post(&format!("/api/recipes/{id}/comment"))
        .add_header(AUTHORIZATION, bearer(&fan))
        .json(&json!({ "text": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post(&format!("/api/recipes/{id}/review"))
        .add_header(AUTHORIZATION, bearer(&fan))
        .json(&json!({ "rating": 4, "review": "Solid" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["averageRating"], 4.0);
    assert_eq!(body["totalReviews"], 1);

    let response = server
        .post(&format!("/api/recipes/{id}/review"))
        .add_header(AUTHORIZATION, bearer(&fan))
        .json(&json!({ "rating": 5 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "You already reviewed this recipe");

    let response = server
        .post(&format!("/api/recipes/{id}/review"))
        .add_header(AUTHORIZATION, bearer(&owner))
        .json(&json!({ "rating": 9 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post(&format!("/api/recipes/save/{id}"))
        .add_header(AUTHORIZATION, bearer(&fan))
        .await;
    let body: Value = response.json();
    assert_eq!(body["message"], "Recipe saved");
    assert_eq!(body["savedRecipes"], json!([id]));

    let response = server
        .get("/api/recipes/saved")
        .add_header(AUTHORIZATION, bearer(&fan))
        .await;
    response.assert_status_ok();
    let saved: Vec<Value> = response.json();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["isSaved"], true);
    assert_eq!(saved[0]["totalReviews"], 1);
    assert_eq!(saved[0]["comments"][0]["text"], "Lovely");

    let response = server
        .post(&format!("/api/recipes/save/{id}"))
        .add_header(AUTHORIZATION, bearer(&fan))
        .await;
    let body: Value = response.json();
    assert_eq!(body["message"], "Recipe unsaved");
    assert_eq!(body["savedRecipes"], json!([]));
}

#[tokio::test]
async fn test_search_and_user_recipes() {
    let server = create_test_server();
    let (chef_id, chef) = sign_up(&server, "Chef", "chef@example.com").await;
    let (idle_id, _) = sign_up(&server, "Idle", "idle@example.com").await;

    create_recipe(&server, &chef, omelette()).await;
    create_recipe(
        &server,
        &chef,
        json!({
            "title": "Green Curry",
            "ingredients": [{ "name": "Basil", "quantity": "1 bunch", "category": "Produce" }],
            "steps": ["Simmer"],
            "cuisine": "Thai",
            "cookingTime": 40
        }),
    )
    .await;

    let response = server
        .get("/api/recipes/search?ingredients=basil&maxCookingTime=45")
        .add_header(AUTHORIZATION, bearer(&chef))
        .await;
    response.assert_status_ok();
    let found: Vec<Value> = response.json();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["title"], "Green Curry");

    let response = server
        .get("/api/recipes/search?cuisine=french&maxCookingTime=5")
        .add_header(AUTHORIZATION, bearer(&chef))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "No recipes found");

    let response = server
        .get(&format!("/api/recipes/user/{chef_id}"))
        .add_header(AUTHORIZATION, bearer(&chef))
        .await;
    response.assert_status_ok();
    let mine: Vec<Value> = response.json();
    assert_eq!(mine.len(), 2);

    let response = server
        .get(&format!("/api/recipes/user/{idle_id}"))
        .add_header(AUTHORIZATION, bearer(&chef))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "No recipes found for this user");
}

#[tokio::test]
async fn test_follow_graph() {
    let server = create_test_server();
    let (alice_id, alice) = sign_up(&server, "Alice", "alice@example.com").await;
    let (bob_id, _) = sign_up(&server, "Bob", "bob@example.com").await;

    let response = server
        .post("/api/users/follow")
        .add_header(AUTHORIZATION, bearer(&alice))
        .json(&json!({ "targetUserId": alice_id }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "You can't follow yourself");

    let response = server
        .post("/api/users/follow")
        .add_header(AUTHORIZATION, bearer(&alice))
        .json(&json!({ "targetUserId": bob_id }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Followed successfully");

    let response = server
        .post("/api/users/follow")
        .add_header(AUTHORIZATION, bearer(&alice))
        .json(&json!({ "targetUserId": bob_id }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["error"], "Already following this user");

    let response = server.get(&format!("/api/users/{bob_id}/followers")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["followers"][0]["name"], "Alice");

    let response = server.get(&format!("/api/users/{alice_id}/following")).await;
    let body: Value = response.json();
    assert_eq!(body["following"][0]["id"], bob_id.as_str());

    let response = server
        .post("/api/users/unfollow")
        .add_header(AUTHORIZATION, bearer(&alice))
        .json(&json!({ "targetUserId": bob_id }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["message"], "Unfollowed successfully");

    let response = server
        .post("/api/users/unfollow")
        .add_header(AUTHORIZATION, bearer(&alice))
        .json(&json!({ "targetUserId": bob_id }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "You are not following this user");

    let response = server
        .post("/api/users/follow")
        .add_header(AUTHORIZATION, bearer(&alice))
        .json(&json!({ "targetUserId": "nope" }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid user ID");
}

#[tokio::test]
async fn test_meal_plan_lifecycle() {
    let server = create_test_server();
    let (_, token) = sign_up(&server, "Planner", "planner@example.com").await;
    let recipe = create_recipe(&server, &token, omelette()).await;
    let id = recipe["id"].as_str().unwrap().to_string();

    let response = server
        .get("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "No meal plan found for this user");

    let response = server
        .post("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "day": "Monday", "meals": { "breakfast": "garbage" } }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "One or more meal IDs are invalid.");

    let response = server
        .post("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "day": "Monday", "meals": { "breakfast": id, "lunch": id } }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Meal plan updated successfully");
    assert_eq!(body["mealPlan"][0]["meals"]["breakfast"]["title"], "Omelette");
    assert_eq!(body["mealPlan"][0]["meals"]["dinner"], Value::Null);

    let response = server
        .delete("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "day": "Monday", "category": "dinner" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "No dinner found for Monday");

    let response = server
        .delete("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "day": "Monday", "category": "lunch" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "lunch for Monday cleared successfully");
    assert_eq!(body["mealPlan"][0]["meals"]["lunch"], Value::Null);

    let response = server
        .delete("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Meal plan cleared successfully");

    let response = server
        .get("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_meal_plan_clear_rejects_malformed_body() {
    let server = create_test_server();
    let (_, token) = sign_up(&server, "Careful", "careful@example.com").await;
    let recipe = create_recipe(&server, &token, omelette()).await;
    let id = recipe["id"].as_str().unwrap().to_string();

    for day in ["Monday", "Tuesday"] {
        server
            .post("/api/users/meal-plan")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "day": day, "meals": { "breakfast": id } }))
            .await
            .assert_status_ok();
    }

    let response = server
        .delete("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .text(r#"{ "day": "Monday", "category": "breakfast", }"#)
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = server
        .delete("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "day": " Monday " }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Meal plan for Monday cleared successfully");
    assert_eq!(body["mealPlan"].as_array().unwrap().len(), 1);
    assert_eq!(body["mealPlan"][0]["day"], "Tuesday");
}

#[tokio::test]
async fn test_shopping_list_merges_planned_ingredients() {
    let server = create_test_server();
    let (_, token) = sign_up(&server, "Planner", "planner@example.com").await;
    let recipe = create_recipe(&server, &token, omelette()).await;
    let id = recipe["id"].as_str().unwrap().to_string();

    let response = server
        .get("/api/users/shoppinglist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["shoppingList"], json!([]));

    server
        .post("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "day": "Monday", "meals": { "breakfast": id, "lunch": id } }))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/users/shoppinglist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["shoppingList"],
        json!([{ "category": "Dairy", "items": [{ "name": "Egg", "quantity": 4 }] }])
    );
}

#[tokio::test]
async fn test_shopping_list_after_recipe_deleted() {
    let server = create_test_server();
    let (_, token) = sign_up(&server, "Planner", "planner@example.com").await;
    let keep = create_recipe(
        &server,
        &token,
        json!({
            "title": "Toast",
            "ingredients": [
                { "name": "Bread", "quantity": "2 slices" },
                { "name": "Spinach", "quantity": "1 bag", "category": "Produce" }
            ],
            "steps": ["Toast"]
        }),
    )
    .await;
    let gone = create_recipe(&server, &token, omelette()).await;
    let keep_id = keep["id"].as_str().unwrap().to_string();
    let gone_id = gone["id"].as_str().unwrap().to_string();

    server
        .post("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "day": "Tuesday", "meals": { "breakfast": keep_id, "dinner": gone_id } }))
        .await
        .assert_status_ok();

    server
        .delete(&format!("/api/recipes/{gone_id}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/users/shoppinglist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let body: Value = response.json();
    assert_eq!(
        body["shoppingList"],
        json!([
            { "category": "Other", "items": [{ "name": "Bread", "quantity": 1 }] },
            { "category": "Produce", "items": [{ "name": "Spinach", "quantity": 1 }] }
        ])
    );
}

#[tokio::test]
async fn test_shopping_list_case_insensitive_categories() {
    let server = create_test_server_with(CategoryMatch::CaseInsensitive);
    let (_, token) = sign_up(&server, "Planner", "planner@example.com").await;
    let recipe = create_recipe(
        &server,
        &token,
        json!({
            "title": "Latte",
            "ingredients": [
                { "name": "Milk", "quantity": "1 cup", "category": "Dairy" },
                { "name": "milk", "quantity": "1 cup", "category": "dairy" }
            ],
            "steps": ["Steam"]
        }),
    )
    .await;
    let id = recipe["id"].as_str().unwrap().to_string();

    server
        .post("/api/users/meal-plan")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "day": "Wednesday", "meals": { "snacks": id } }))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/users/shoppinglist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    let body: Value = response.json();
    assert_eq!(
        body["shoppingList"],
        json!([{ "category": "Dairy", "items": [{ "name": "Milk", "quantity": 2 }] }])
    );
}
