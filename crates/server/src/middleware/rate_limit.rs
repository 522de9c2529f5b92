//! Rate limiting middleware using governor and `tower_governor`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor that prefers proxy headers, then the socket peer address.
///
/// Checks `CF-Connecting-IP`, the first `X-Forwarded-For` entry and
/// `X-Real-IP` in that order. Without any of them the connection's peer
/// address is used, which needs the server to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"]
            .into_iter()
            .find_map(|name| header_ip(req, name))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// One token every 6 seconds, burst of 5. Returns `None` only if governor
/// rejects the quota.
#[must_use]
pub fn auth_rate_limiter() -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    #[test]
    fn test_prefers_cloudflare_header() {
        let req = Request::builder()
            .header("cf-connecting-ip", "203.0.113.7")
            .header("x-forwarded-for", "198.51.100.1, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).unwrap(),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_first_forwarded_for_entry() {
        let req = Request::builder()
            .header("x-forwarded-for", "198.51.100.1, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).unwrap(),
            "198.51.100.1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.4:51000".parse::<SocketAddr>().unwrap()));
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).unwrap(),
            "192.0.2.4".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_no_address_is_an_error() {
        let req = Request::builder().body(()).unwrap();
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }

    #[test]
    fn test_auth_limiter_builds() {
        assert!(auth_rate_limiter().is_some());
    }
}
