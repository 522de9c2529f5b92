//! Request ID middleware.
//!
//! Each request carries an `x-request-id`. An id supplied by an upstream proxy
//! is reused when it looks sane; otherwise a UUID v4 is generated. The id is
//! recorded on the `request` span, tagged on the Sentry scope and echoed back
//! in the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id accepted as is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Upstream request id, if present and printable.
fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let acceptable = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());
    acceptable.then(|| value.to_owned())
}

/// Attach a request id to the span, the Sentry scope and the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        incoming_request_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_reuses_upstream_id() {
        assert_eq!(
            incoming_request_id(&headers("cf-8a1b2c3d")).as_deref(),
            Some("cf-8a1b2c3d")
        );
    }

    #[test]
    fn test_rejects_odd_upstream_ids() {
        assert_eq!(incoming_request_id(&HeaderMap::new()), None);
        assert_eq!(incoming_request_id(&headers("   ")), None);
        assert_eq!(incoming_request_id(&headers("two words")), None);
        assert_eq!(incoming_request_id(&headers(&"x".repeat(200))), None);
    }
}
