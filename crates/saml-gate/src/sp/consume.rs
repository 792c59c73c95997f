use crate::error::Error;
use crate::principal::validate_profile;
use crate::redirect;
use crate::session::{self, CurrentSession};
use crate::state::AppState;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Form};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ConsumeForm {
    #[serde(rename = "SAMLResponse")]
    pub saml_response: String,
    #[serde(rename = "RelayState")]
    pub relay_state: Option<String>,
}

/// Assertion Consumer Service. Hands the posted response to the identity
/// provider client, maps the resulting profile to a principal, and signs the
/// browser in under a new session ID. Success and failure both end in a
/// redirect home, which also stops the browser from re-posting the form.
pub async fn consume(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CurrentSession>,
    form: Result<Form<ConsumeForm>, FormRejection>,
) -> Result<Response, Error> {
    let Form(form) = form.map_err(|e| Error::MalformedRequest(e.body_text()))?;

    tracing::info!(
        session_id = session.id,
        relay_state = form.relay_state.as_deref(),
        "received SAML response"
    );

    // A Lax cookie stays behind on the IdP's cross-site post. The session that
    // started the login then comes back as RelayState.
    let origin = match session.data.pending_request_id {
        Some(_) => session.clone(),
        None => form
            .relay_state
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| {
                state.sessions.get(id).map(|data| CurrentSession {
                    id: id.to_string(),
                    data,
                })
            })
            .unwrap_or_else(|| session.clone()),
    };

    let profile = state.idp.consume(
        &form.saml_response,
        origin.data.pending_request_id.as_deref(),
    )?;
    let principal = validate_profile(&profile, &state.config.claims)?;

    tracing::info!(
        session_id = origin.id,
        principal = principal.id,
        groups = principal.groups.len(),
        "SAML authentication succeeded"
    );

    let id = state.sessions.sign_in(
        &[session.id.as_str(), origin.id.as_str()],
        principal,
        profile.claims,
        origin.data.pending_request_id,
    );

    let jar: SignedCookieJar = SignedCookieJar::new(state.cookie_key.clone());
    let cookie = session::session_cookie(id, state.config.secure_cookies);
    Ok((jar.add(cookie), redirect::found("/")).into_response())
}
