pub mod consume;
pub mod login;
pub mod logout;
pub mod metadata;

use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login::login))
        .route("/logout", get(logout::logout))
        .route("/saml/consume", post(consume::consume))
        .route("/saml/metadata", get(metadata::metadata))
}
