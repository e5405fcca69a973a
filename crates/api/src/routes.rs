use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the control-plane router (§6.1): bound to loopback only by the
/// caller, never the SOCKS5 proxy port.
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::get_stats))
        .route("/logs", get(handlers::get_logs))
        .route("/traffic", get(handlers::get_traffic))
        .route("/reset", post(handlers::reset_data))
        .route("/rules", get(handlers::get_rules).post(handlers::create_rule))
        .route(
            "/rules/{id}",
            patch(handlers::update_rule).delete(handlers::delete_rule),
        )
        .route(
            "/adblock/filters",
            get(handlers::get_adblock_filters).post(handlers::add_adblock_filter),
        )
        .route("/adblock/filters/{id}", delete(handlers::delete_adblock_filter))
        .route("/settings", get(handlers::get_settings))
        .route("/settings/{key}", put(handlers::update_setting))
        .route("/system/proxy", put(handlers::set_system_proxy))
        .route(
            "/system/startup",
            get(handlers::get_startup_enabled).put(handlers::set_startup),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
