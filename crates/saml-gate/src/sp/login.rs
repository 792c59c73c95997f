use crate::error::Error;
use crate::redirect;
use crate::session::CurrentSession;
use crate::state::AppState;
use axum::Extension;
use axum::extract::State;
use axum::response::Response;
use std::sync::Arc;

/// Starts the SAML handshake: records the AuthnRequest ID in the session and
/// sends the browser to the identity provider's SSO endpoint, with the session
/// ID as RelayState. A failure to build the request lands the user back on the
/// home page.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CurrentSession>,
) -> Result<Response, Error> {
    tracing::info!(session_id = session.id, "login requested");

    let request = state.idp.begin_login(&session.id)?;
    state
        .sessions
        .set_pending_request(&session.id, request.request_id.clone());

    tracing::info!(
        session_id = session.id,
        request_id = request.request_id,
        "redirecting to identity provider"
    );

    Ok(redirect::found(&request.redirect_url))
}
