use crate::session::CurrentSession;
use askama::Template;
use axum::Extension;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    name: Option<String>,
}

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    name: String,
}

fn render(template: &impl Template) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render template");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}

/// Greets a signed-in user with a link to the admin area; everyone else gets
/// the login link.
pub async fn home(Extension(session): Extension<CurrentSession>) -> Response {
    let name = session
        .data
        .principal
        .as_ref()
        .map(|p| p.display_name().to_string());
    render(&HomeTemplate { name })
}

/// Admin landing page. Reached only through the authentication and
/// authorization gates.
pub async fn admin(Extension(session): Extension<CurrentSession>) -> Response {
    let name = session
        .data
        .principal
        .as_ref()
        .map(|p| p.display_name().to_string())
        .unwrap_or_default();
    render(&AdminTemplate { name })
}
