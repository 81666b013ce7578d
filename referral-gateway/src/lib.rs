// Referral Gateway Library
// HTTP transport over the referral ledger; exposes modules for testing and integration

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod scheduler;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use rate_limit::CallerRateLimiter;
use referral_ledger::{CredentialCheck, ReferralLedger};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<ReferralLedger>,
    pub settle_secret: Arc<dyn CredentialCheck>,
    pub limiter: CallerRateLimiter,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/register-referral", post(handlers::register_referral))
        .route(
            "/api/use-referral",
            post(handlers::use_referral).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit::enforce,
            )),
        )
        .route("/api/referral-status/:address", get(handlers::referral_status))
        .route("/api/payout-list", get(handlers::payout_list))
        .route("/api/mark-paid", post(handlers::mark_paid))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
