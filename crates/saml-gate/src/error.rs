use crate::redirect;
use axum::response::{IntoResponse, Response};
use std::any::Any;

/// Why a SAML handshake did not produce a principal.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeFailure {
    #[error("failed to start SAML handshake: {0}")]
    Initiation(String),
    #[error("SAML response rejected: {0}")]
    InvalidResponse(String),
    #[error("assertion carries no NameID")]
    MissingNameId,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Handshake(#[from] HandshakeFailure),
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Handshake(_) => tracing::warn!(error = %self, "SAML handshake failed"),
            Error::MalformedRequest(_) | Error::Internal(_) => {
                tracing::error!(error = %self, "request failed")
            }
        }

        // The user only ever sees the redirect; details stay in the logs.
        redirect::found("/")
    }
}

/// Response for a handler that panicked: log it and send the browser home.
pub fn redirect_on_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(detail, "handler panicked");
    redirect::found("/")
}
