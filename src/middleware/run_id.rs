use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header carrying the run id in both directions
pub const RUN_ID_HEADER: &str = "x-request-id";

/// Identifies one recommendation run across logs, responses and reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reads a caller-supplied id; anything that is not a UUID is ignored
    fn from_request(request: &Request) -> Option<Self> {
        request
            .headers()
            .get(RUN_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Self)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attaches a [`RunId`] to the request extensions and echoes it on the response.
///
/// An incoming `x-request-id` is honored when it parses as a UUID; otherwise a
/// fresh v4 id is generated.
pub async fn run_id_middleware(mut request: Request, next: Next) -> Response {
    let run_id = RunId::from_request(&request).unwrap_or_default();
    request.extensions_mut().insert(run_id);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&run_id.to_string()) {
        response.headers_mut().insert(RUN_ID_HEADER, value);
    }

    response
}

/// Span for `TraceLayer`, tagged with the run id set by [`run_id_middleware`]
pub fn make_span_with_run_id(request: &Request<Body>) -> tracing::Span {
    let run_id = request
        .extensions()
        .get::<RunId>()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        run_id = %run_id,
    )
}
