use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::error::{AppError, AppResult};

/// Per-IP governor layer applied in front of the whole router
pub type GlobalGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Each client IP earns one request every `period_ms` and may spend up to
/// `burst` at once. Needs the peer address, so the app must be served with
/// connect info.
pub fn create_global_governor(period_ms: u64, burst: u32) -> AppResult<GlobalGovernorLayer> {
    let config = GovernorConfigBuilder::default()
        .per_millisecond(period_ms)
        .burst_size(burst)
        .finish()
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid rate limit: period {}ms, burst {} (both must be non-zero)",
                period_ms, burst
            ))
        })?;

    tracing::info!(period_ms, burst, "Rate limiting enabled");
    Ok(GovernorLayer::new(Arc::new(config)))
}

/// Log every request with its latency, warning on rejected or failed ones
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            "Rate limited"
        );
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            elapsed_ms,
            "Request failed"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            elapsed_ms,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_limits_build_a_layer() {
        assert!(create_global_governor(60, 100).is_ok());
        assert!(create_global_governor(1, 1).is_ok());
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        assert!(matches!(
            create_global_governor(0, 100),
            Err(AppError::Internal(_))
        ));
        assert!(matches!(
            create_global_governor(60, 0),
            Err(AppError::Internal(_))
        ));
    }
}
