use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Policy for HTML pages: same-origin assets, inline styles/scripts, and
/// `data:` images for inline results.
const PAGE_CSP: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline'; \
     style-src 'self' 'unsafe-inline'; \
     img-src 'self' data: blob:; \
     form-action 'self'; \
     frame-ancestors 'none'";

/// Policy for JSON and plain-text endpoints.
const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

fn is_api_route(path: &str) -> bool {
    path.starts_with("/api/") || path == "/health" || path == "/ready" || path == "/metrics"
}

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let api_route = is_api_route(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static(if api_route { API_CSP } else { PAGE_CSP }),
    );

    response
}
