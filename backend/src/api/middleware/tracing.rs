//! Correlation IDs and per-request spans.
//!
//! Every request runs inside an `http_request` span carrying its correlation
//! ID, so service and storage logs (including git commits) can be tied back to
//! the request that caused them. The ID is echoed in `X-Correlation-ID`.

use axum::{
    extract::Request,
    http::{header::HeaderValue, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// The header name for correlation IDs.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// W3C Trace Context header.
const TRACEPARENT_HEADER: &str = "traceparent";

/// Longest client-supplied ID that is accepted verbatim.
const MAX_CORRELATION_ID_LEN: usize = 128;

/// Correlation ID of the current request, stored as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the ID from `X-Correlation-ID`, then from the trace-id part of
    /// `traceparent`, else generate one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let explicit = headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.len() <= MAX_CORRELATION_ID_LEN);
        // traceparent: version-traceid-parentid-flags
        let from_trace = || {
            headers
                .get(TRACEPARENT_HEADER)
                .and_then(|h| h.to_str().ok())
                .and_then(|tp| tp.split('-').nth(1))
                .filter(|id| !id.is_empty())
        };

        explicit
            .or_else(from_trace)
            .map(|id| Self(id.to_string()))
            .unwrap_or_else(Self::generate)
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = CorrelationId::from_headers(request.headers());
    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    request.extensions_mut().insert(correlation_id.clone());

    async move {
        let mut response = next.run(request).await;
        if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
            response.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }
        tracing::debug!(status = response.status().as_u16(), "Request completed");
        response
    }
    .instrument(span)
    .await
}
