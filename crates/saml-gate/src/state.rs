use crate::config::Config;
use crate::idp::{IdentityProviderClient, SamlClient};
use crate::session::SessionStore;
use anyhow::Result;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub idp: Arc<dyn IdentityProviderClient>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let idp = Arc::new(SamlClient::new(&config)?);
        Self::with_identity_provider(config, idp)
    }

    pub fn with_identity_provider(
        config: Config,
        idp: Arc<dyn IdentityProviderClient>,
    ) -> Result<Self> {
        let cookie_key = Key::try_from(config.session_secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid SESSION_SECRET: {e}"))?;

        Ok(Self {
            sessions: SessionStore::new(config.session_ttl),
            config,
            idp,
            cookie_key,
        })
    }
}
