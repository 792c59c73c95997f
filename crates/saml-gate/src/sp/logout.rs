use crate::redirect;
use crate::session::{self, CurrentSession};
use crate::state::AppState;
use axum::Extension;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::SignedCookieJar;
use std::sync::Arc;

/// Ends the local session and clears its cookie. The identity provider's own
/// session is left alone.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CurrentSession>,
    headers: HeaderMap,
) -> Response {
    let principal = state
        .sessions
        .remove(&session.id)
        .and_then(|s| s.principal)
        .map(|p| p.id);
    tracing::info!(session_id = session.id, principal, "logged out");

    let jar: SignedCookieJar =
        SignedCookieJar::from_headers(&headers, state.cookie_key.clone());
    (jar.remove(session::removal_cookie()), redirect::found("/")).into_response()
}
