use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// 302 Found to `location`.
///
/// axum's `Redirect` only offers 303/307/308; browsers and identity providers
/// expect the classic 302 for these hops.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
