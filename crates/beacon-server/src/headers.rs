//! Fixed security header set applied to every response.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

/// Header names and values attached to every response, static files included.
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("strict-transport-security", "max-age=63072000; includeSubDomains; preload"),
    ("x-xss-protection", "1; mode=block"),
    ("x-robots-tag", "noindex, nofollow"),
];

/// Middleware: stamp the fixed header set onto the response.
///
/// Installed outside the panic-containment layer, so even a converted panic
/// response carries the headers.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    apply(response.headers_mut());
    response
}

/// Insert (overriding) each security header into the map.
pub fn apply(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        let _ = headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}
