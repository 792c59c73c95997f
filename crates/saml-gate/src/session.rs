use crate::claims::Claims;
use crate::principal::Principal;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

pub const SESSION_COOKIE: &str = "saml_gate_session";
const CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Debug)]
pub struct Session {
    pub principal: Option<Principal>,
    pub raw_claims: Option<Claims>,
    /// ID of the AuthnRequest most recently sent to the identity provider.
    pub pending_request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            principal: None,
            raw_claims: None,
            pending_request_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Snapshot of the caller's session, taken once per request by
/// [`load_session`] and placed in the request extensions.
#[derive(Clone, Debug)]
pub struct CurrentSession {
    pub id: String,
    pub data: Session,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Returns the live session for `id`, or a fresh one under a new ID. The
    /// flag is true when the session is already in the store; fresh sessions
    /// are only kept once the login flow writes to them.
    pub fn load(&self, id: Option<&str>) -> (String, Session, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id) {
                return (id.to_string(), session, true);
            }
        }

        (uuid::Uuid::new_v4().to_string(), Session::new(), false)
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        let entry = self.inner.get(id)?;
        if self.is_expired(&entry, Utc::now()) {
            drop(entry);
            self.inner.remove(id);
            return None;
        }
        Some(entry.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.contains_key(id)
    }

    pub fn set_pending_request(&self, id: &str, request_id: String) {
        self.inner
            .entry(id.to_string())
            .or_insert_with(Session::new)
            .pending_request_id = Some(request_id);
    }

    /// Stores the principal and its claims under a newly issued ID and drops
    /// the sessions in `replaced`. The pending request ID travels along so a
    /// duplicate post of the same response still validates.
    pub fn sign_in(
        &self,
        replaced: &[&str],
        principal: Principal,
        claims: Claims,
        pending_request_id: Option<String>,
    ) -> String {
        for id in replaced {
            self.inner.remove(*id);
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.inner.insert(
            id.clone(),
            Session {
                principal: Some(principal),
                raw_claims: Some(claims),
                pending_request_id,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn remove(&self, id: &str) -> Option<Session> {
        self.inner.remove(id).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(session.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        elapsed > self.ttl
    }

    fn cleanup_expired(&self) {
        let now = Utc::now();
        self.inner
            .retain(|_, session| !self.is_expired(session, now));
    }
}

pub async fn session_cleanup_task(store: SessionStore) {
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
    loop {
        interval.tick().await;
        let before = store.len();
        store.cleanup_expired();
        let removed = before.saturating_sub(store.len());
        if removed > 0 {
            tracing::info!(removed, "cleaned up expired sessions");
        }
    }
}

/// Resolves the session cookie to a session and exposes it to handlers as a
/// [`CurrentSession`] extension. Visitors without a session get a fresh one
/// that lives only in the request; the cookie is issued once a handler has
/// stored it.
pub async fn load_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar: SignedCookieJar =
        SignedCookieJar::from_headers(request.headers(), state.cookie_key.clone());
    let cookie_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    let (id, data, stored) = state.sessions.load(cookie_id.as_deref());

    request.extensions_mut().insert(CurrentSession {
        id: id.clone(),
        data,
    });
    let response = next.run(request).await;

    if !stored && state.sessions.contains(&id) {
        tracing::debug!(session_id = id, "started new session");
        let cookie = session_cookie(id, state.config.secure_cookies);
        (jar.add(cookie), response).into_response()
    } else {
        response
    }
}

/// The IdP posts the assertion cross-site, so a secure deployment needs
/// SameSite=None for the cookie to come along. Plain-HTTP development falls
/// back to Lax, which browsers accept without Secure.
pub fn session_cookie(id: String, secure: bool) -> Cookie<'static> {
    let same_site = if secure { SameSite::None } else { SameSite::Lax };
    Cookie::build((SESSION_COOKIE, id))
        .http_only(true)
        .secure(secure)
        .same_site(same_site)
        .path("/")
        .build()
}

/// Expired copy of the session cookie, used to clear it on logout.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
