pub mod claims;
pub mod config;
pub mod error;
pub mod gate;
pub mod idp;
pub mod pages;
pub mod principal;
pub mod redirect;
pub mod session;
pub mod sp;
pub mod state;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use state::AppState;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub fn app(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/admin", get(pages::admin))
        .route_layer(from_fn_with_state(state.clone(), gate::require_admin))
        .route_layer(from_fn(gate::require_auth));

    let routes = Router::new()
        .route("/", get(pages::home))
        .merge(admin)
        .merge(sp::router());
    with_layers(routes, state)
}

/// Session loading, request tracing, and the panic catch-all shared by every
/// route.
fn with_layers(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    routes
        .layer(from_fn_with_state(state.clone(), session::load_session))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(error::redirect_on_panic))
}
