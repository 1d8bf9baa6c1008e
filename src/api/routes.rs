use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{self, meal_plan, recipes, users};
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes and middleware
pub fn create_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/users", user_routes())
        .nest("/api/recipes", recipe_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors_layer(cors_origin)),
        )
}

/// Routes under /api/users
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/profile", get(users::profile))
        .route(
            "/meal-plan",
            post(meal_plan::set_day)
                .get(meal_plan::get_plan)
                .delete(meal_plan::clear),
        )
        .route("/shoppinglist", get(users::shopping_list))
        .route("/follow", post(users::follow))
        .route("/unfollow", post(users::unfollow))
        .route("/:id/followers", get(users::followers))
        .route("/:id/following", get(users::following))
}

/// Routes under /api/recipes
fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(recipes::create_recipe).get(recipes::list_recipes))
        .route("/add", post(recipes::create_recipe))
        .route("/search", get(recipes::search_recipes))
        .route("/saved", get(recipes::saved_recipes))
        .route("/save/:id", post(recipes::toggle_save))
        .route("/user/:id", get(recipes::user_recipes))
        .route(
            "/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/:id/like", post(recipes::toggle_like))
        .route("/:id/comment", post(recipes::add_comment))
        .route("/:id/review", post(recipes::add_review))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin, "Ignoring unparsable CORS origin");
            layer
        }
    }
}
