use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/careers", get(handlers::careers))
        .route("/events", get(handlers::events))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/reset-password", post(handlers::reset_password))
        .route("/admin", get(handlers::admin_dashboard))
        .route("/admin/alumni", get(handlers::admin_alumni))
        .route("/admin/accounts/:id/status", post(handlers::update_account_status))
        .route("/admin/accounts/:id/sms", post(handlers::send_sms))
        .route("/admin/updates", post(handlers::send_unemployment_updates))
        .route("/admin/updates/:phone", post(handlers::send_update_to))
        .route("/api/trends", get(handlers::api_trends))
        .route("/api/regions", get(handlers::api_regions))
        .route("/api/correlations", get(handlers::api_correlations))
        .route("/api/clusters", get(handlers::api_clusters))
        .with_state(state)
}
