use crate::redirect;
use crate::session::{CurrentSession, Session};
use crate::state::AppState;
use axum::Extension;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/login";
pub const FORBIDDEN_MESSAGE: &str = "Forbidden: You do not have access to this resource.";

/// Outcome of a gate check for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Not signed in: send the user through the login flow.
    Login,
    Forbidden,
}

pub fn check_authenticated(session: &Session) -> Access {
    if session.principal.is_some() {
        Access::Granted
    } else {
        Access::Login
    }
}

/// Admin membership is read from the session's raw claims on every call and
/// never cached on the session.
pub fn check_admin(session: &Session, admin_group: &str, groups_claim: &str) -> Access {
    let (Some(_), Some(claims)) = (&session.principal, &session.raw_claims) else {
        return Access::Login;
    };

    if claims.contains_value(groups_claim, admin_group) {
        Access::Granted
    } else {
        Access::Forbidden
    }
}

async fn enforce(access: Access, request: Request, next: Next) -> Response {
    match access {
        Access::Granted => next.run(request).await,
        Access::Login => redirect::found(LOGIN_PATH),
        Access::Forbidden => (StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE).into_response(),
    }
}

/// Middleware: only signed-in sessions reach the wrapped routes.
pub async fn require_auth(
    Extension(session): Extension<CurrentSession>,
    request: Request,
    next: Next,
) -> Response {
    enforce(check_authenticated(&session.data), request, next).await
}

/// Middleware: only members of the configured admin group reach the wrapped
/// routes.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<CurrentSession>,
    request: Request,
    next: Next,
) -> Response {
    let access = check_admin(
        &session.data,
        &state.config.admin_group,
        &state.config.claims.groups,
    );
    if access == Access::Forbidden {
        tracing::warn!(
            session_id = session.id,
            principal = session.data.principal.as_ref().map(|p| p.id.as_str()),
            "admin access denied"
        );
    }
    enforce(access, request, next).await
}
