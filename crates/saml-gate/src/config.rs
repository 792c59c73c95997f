use anyhow::{Context, Result, bail};
use std::time::Duration;

const MIN_SESSION_SECRET_LEN: usize = 64;

/// Where the identity provider's trust material comes from.
pub enum IdpTrust {
    /// A SAML metadata document (EntityDescriptor with IDPSSODescriptor).
    MetadataFile(String),
    /// Entity ID, SSO endpoint, and signing certificate given individually.
    Explicit {
        entity_id: String,
        sso_url: String,
        cert_path: String,
    },
}

/// Attribute names in the assertion that feed the principal.
#[derive(Clone, Debug)]
pub struct ClaimMapping {
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub groups: String,
}

impl Default for ClaimMapping {
    fn default() -> Self {
        Self {
            email: "email".into(),
            given_name: "given_name".into(),
            family_name: "family_name".into(),
            groups: "https://schemas.myapp.com/claims/groups".into(),
        }
    }
}

pub struct Config {
    pub base_url: String,
    pub entity_id: String,
    pub idp: IdpTrust,
    pub sp_cert_path: Option<String>,
    pub admin_group: String,
    pub claims: ClaimMapping,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub secure_cookies: bool,
    pub allow_idp_initiated: bool,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = var("BASE_URL").context("BASE_URL must be set")?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let entity_id = var("ENTITY_ID").unwrap_or_else(|| format!("{base_url}/saml/metadata"));

        let idp = match var("IDP_METADATA_PATH") {
            Some(path) => IdpTrust::MetadataFile(path),
            None => IdpTrust::Explicit {
                entity_id: var("IDP_ENTITY_ID")
                    .context("IDP_ENTITY_ID must be set when IDP_METADATA_PATH is not")?,
                sso_url: var("IDP_SSO_URL")
                    .context("IDP_SSO_URL must be set when IDP_METADATA_PATH is not")?,
                cert_path: var("IDP_CERT_PATH")
                    .context("IDP_CERT_PATH must be set when IDP_METADATA_PATH is not")?,
            },
        };

        let session_secret = var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            bail!("SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} bytes");
        }

        let defaults = ClaimMapping::default();
        let claims = ClaimMapping {
            email: var("EMAIL_CLAIM").unwrap_or(defaults.email),
            given_name: var("GIVEN_NAME_CLAIM").unwrap_or(defaults.given_name),
            family_name: var("FAMILY_NAME_CLAIM").unwrap_or(defaults.family_name),
            groups: var("GROUPS_CLAIM").unwrap_or(defaults.groups),
        };

        let session_ttl = var("SESSION_TTL_SECS")
            .unwrap_or_else(|| "28800".into())
            .parse::<u64>()
            .map(Duration::from_secs)
            .context("SESSION_TTL_SECS must be a whole number of seconds")?;

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = var("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse::<u16>()
            .context("PORT must be a valid u16")?;

        Ok(Self {
            base_url,
            entity_id,
            idp,
            sp_cert_path: var("SP_CERT_PATH"),
            admin_group: var("ADMIN_GROUP").unwrap_or_else(|| "App-Admins".into()),
            claims,
            session_secret,
            session_ttl,
            secure_cookies: parse_flag(var("SECURE_COOKIES"), "SECURE_COOKIES")?,
            allow_idp_initiated: parse_flag(var("ALLOW_IDP_INITIATED"), "ALLOW_IDP_INITIATED")?,
            host,
            port,
        })
    }

    /// Assertion Consumer Service URL registered with the identity provider.
    pub fn acs_url(&self) -> String {
        format!("{}/saml/consume", self.base_url)
    }
}

fn parse_flag(value: Option<String>, name: &str) -> Result<bool> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => bail!("{name} must be true or false, got {other:?}"),
    }
}
