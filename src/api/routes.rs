use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Users and sessions
        .route("/users", post(handlers::create_user))
        .route("/users/:id/session", post(handlers::open_session))
        // Orders
        .route("/users/:id/orders", post(handlers::place_order))
        .route("/menu", get(handlers::get_menu))
        // Matches
        .route(
            "/users/:id/matches",
            get(handlers::list_matches).delete(handlers::remove_matches),
        )
        // Recommendations
        .route("/users/:id/recommendations", get(handlers::recommendations))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
