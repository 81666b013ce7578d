use crate::{errors::ApiError, AppState};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota,
    RateLimiter as GovernorRateLimiter,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

type KeyedLimiter = GovernorRateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Per-caller limiter keyed by peer IP
#[derive(Clone)]
pub struct CallerRateLimiter {
    limiter: Arc<KeyedLimiter>,
}

impl CallerRateLimiter {
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let quota = Quota::per_minute(
            NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN),
        );
        Self {
            limiter: Arc::new(GovernorRateLimiter::keyed(quota)),
        }
    }

    /// Consume one request for `caller`; false when over quota
    pub fn check(&self, caller: IpAddr) -> bool {
        self.limiter.check_key(&caller).is_ok()
    }

    /// Drop state for callers whose quota has fully replenished
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn tracked_callers(&self) -> usize {
        self.limiter.len()
    }
}

impl std::fmt::Debug for CallerRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallerRateLimiter")
            .field("tracked_callers", &self.tracked_callers())
            .finish()
    }
}

/// Middleware for rate-limited routes
///
/// Requests without connection info (in-process callers) share one bucket.
pub async fn enforce(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !state.limiter.check(caller) {
        tracing::warn!(%caller, path = req.uri().path(), "Rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_per_caller() {
        let limiter = CallerRateLimiter::per_minute(3);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(a));
        assert!(limiter.check(a));
        assert!(limiter.check(a));
        assert!(!limiter.check(a));

        // Separate bucket per caller
        assert!(limiter.check(b));
        assert_eq!(limiter.tracked_callers(), 2);
    }

    #[test]
    fn test_zero_quota_still_allows_one() {
        let limiter = CallerRateLimiter::per_minute(0);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        assert!(limiter.check(a));
        assert!(!limiter.check(a));
    }
}
