use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// Build the full axum Router with all routes and middleware.
/// Any path not matched by an explicit route falls through to the static
/// asset service over the configured assets directory.
pub fn build_router(state: AppState) -> Router {
    let ws_routes = Router::new().route("/ws", axum::routing::get(ws_handler::ws_upgrade));

    let health = Router::new().route("/health", axum::routing::get(health_check));

    Router::new()
        .merge(ws_routes)
        .merge(health)
        .fallback_service(ServeDir::new(&state.assets_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
