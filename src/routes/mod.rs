//! Route definitions for the prescription parsing API.

pub mod combinations;
pub mod health;
pub mod parsing;
pub mod rules;
pub mod suggestions;

use axum::routing::{get, post, put};
use axum::Router;

use crate::AppState;

/// Build the `/api/v1` routes plus health probes, without middleware layers.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/prescriptions/parse", post(parsing::parse))
        .route("/suggestions", get(suggestions::search))
        .route(
            "/parsing-rules",
            get(rules::list_rules).post(rules::create_rule),
        )
        .route("/parsing-rules/apply", post(rules::apply_rules))
        .route(
            "/parsing-rules/active/{field_type}",
            get(rules::list_active_rules),
        )
        .route(
            "/parsing-rules/{id}",
            put(rules::update_rule).delete(rules::delete_rule),
        )
        .route(
            "/combinations",
            get(combinations::list).post(combinations::upsert),
        )
        .route("/combinations/observe", post(combinations::observe));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api)
        .with_state(state)
}
