use crate::{
    errors::ApiError,
    models::{
        IndexResponse, MessageResponse, PayoutListResponse, ReferralStatusResponse,
        RegisterReferralRequest, UseReferralRequest,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use referral_ledger::{ReferralLedger, RegisterOutcome};
use std::sync::Arc;
use tracing::info;

pub const SECRET_HEADER: &str = "X-Secret-Key";

/// Run a ledger call on the blocking pool; persistence does file I/O
async fn with_ledger<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ReferralLedger) -> referral_ledger::Result<T> + Send + 'static,
{
    let ledger: Arc<ReferralLedger> = state.ledger.clone();
    tokio::task::spawn_blocking(move || f(&ledger))
        .await
        .map_err(|e| ApiError::Internal(format!("ledger task failed: {}", e)))?
        .map_err(ApiError::from)
}

// ===== Health Check =====
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        status: "Backend running".to_string(),
    })
}

// ===== Register Referrer =====
pub async fn register_referral(
    State(state): State<AppState>,
    Json(req): Json<RegisterReferralRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let outcome = with_ledger(&state, move |ledger| ledger.register(&req.address)).await?;

    if outcome == RegisterOutcome::CapReached {
        info!("Registration skipped: referrer at cap");
    }

    Ok(Json(MessageResponse::new("Referral link registered")))
}

// ===== Use Referral =====
pub async fn use_referral(
    State(state): State<AppState>,
    Json(req): Json<UseReferralRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    with_ledger(&state, move |ledger| {
        ledger.attach_referee(&req.referrer, &req.referee, &req.faucet_token)
    })
    .await?;

    Ok(Json(MessageResponse::new("Referral recorded")))
}

// ===== Referral Status =====
pub async fn referral_status(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<ReferralStatusResponse> {
    Json(state.ledger.status_for(&address).into())
}

// ===== Payout List =====
pub async fn payout_list(State(state): State<AppState>) -> Json<PayoutListResponse> {
    Json(state.ledger.payout_list().into())
}

// ===== Settlement =====
pub async fn mark_paid(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let presented = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !state.settle_secret.verify(presented) {
        tracing::warn!("Rejected settlement request");
        return Err(ApiError::Unauthorized);
    }

    let settlement = with_ledger(&state, |ledger| ledger.settle_all()).await?;
    info!(settled = settlement.settled, "Settlement completed");

    Ok(Json(MessageResponse::new(
        "All referrals have been marked as paid.",
    )))
}
