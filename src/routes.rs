use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{auth::auth_middleware, handlers, openapi::ApiDoc, AppState};

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "data": { "status": "ok" } }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let (auth_public, auth_protected) = handlers::auth_routes(&state);

    // Public routes (no auth required)
    let public_routes = Router::new().nest("/auth", auth_public);

    // Protected routes (auth required); per-route guards run after this layer
    let protected_routes = Router::new()
        .nest("/auth", auth_protected)
        .nest("/hr", handlers::hr_routes())
        .nest("/users", handlers::user_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", public_routes.merge(protected_routes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
