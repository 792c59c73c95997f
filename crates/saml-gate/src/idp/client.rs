use super::{IdentityProviderClient, LoginRequest, trust};
use crate::claims::extract_claims;
use crate::config::Config;
use crate::error::HandshakeFailure;
use crate::principal::RawProfile;
use crate::sp::metadata::build_metadata;
use anyhow::{Result, bail};
use samael::metadata::{EntityDescriptor, HTTP_REDIRECT_BINDING};
use samael::service_provider::ServiceProvider;

/// [`IdentityProviderClient`] backed by samael's `ServiceProvider`.
pub struct SamlClient {
    entity_id: String,
    acs_url: String,
    idp_metadata: EntityDescriptor,
    sp_cert_der: Option<Vec<u8>>,
    allow_idp_initiated: bool,
}

impl SamlClient {
    pub fn new(config: &Config) -> Result<Self> {
        let idp_metadata = trust::load_idp_metadata(&config.idp)?;
        Self::with_idp_metadata(config, idp_metadata)
    }

    /// Refuses identity provider metadata that would leave responses
    /// unverified: samael skips the signature check entirely when the IdP
    /// publishes no signing certificate.
    pub fn with_idp_metadata(config: &Config, idp_metadata: EntityDescriptor) -> Result<Self> {
        let sp_cert_der = config
            .sp_cert_path
            .as_deref()
            .map(trust::read_cert_der)
            .transpose()?;

        let client = Self {
            entity_id: config.entity_id.clone(),
            acs_url: config.acs_url(),
            idp_metadata,
            sp_cert_der,
            allow_idp_initiated: config.allow_idp_initiated,
        };

        let has_sso_descriptor = client
            .idp_metadata
            .idp_sso_descriptors
            .as_ref()
            .is_some_and(|descriptors| !descriptors.is_empty());
        if !has_sso_descriptor {
            bail!("identity provider metadata has no IDPSSODescriptor");
        }

        match client.service_provider().idp_signing_certs() {
            Ok(Some(certs)) if !certs.is_empty() => {}
            Ok(_) => bail!("identity provider metadata has no signing certificate"),
            Err(e) => bail!("invalid identity provider signing certificate: {e}"),
        }

        Ok(client)
    }

    fn service_provider(&self) -> ServiceProvider {
        ServiceProvider {
            entity_id: Some(self.entity_id.clone()),
            acs_url: Some(self.acs_url.clone()),
            idp_metadata: self.idp_metadata.clone(),
            allow_idp_initiated: self.allow_idp_initiated,
            max_issue_delay: chrono::Duration::minutes(5),
            ..ServiceProvider::default()
        }
    }
}

impl IdentityProviderClient for SamlClient {
    fn begin_login(&self, relay_state: &str) -> Result<LoginRequest, HandshakeFailure> {
        let sp = self.service_provider();

        let sso_url = sp.sso_binding_location(HTTP_REDIRECT_BINDING).ok_or_else(|| {
            HandshakeFailure::Initiation(
                "no HTTP-Redirect SSO endpoint in identity provider metadata".into(),
            )
        })?;

        let authn_request = sp
            .make_authentication_request(&sso_url)
            .map_err(|e| HandshakeFailure::Initiation(e.to_string()))?;

        let redirect_url = authn_request
            .redirect(relay_state)
            .map_err(|e| HandshakeFailure::Initiation(e.to_string()))?
            .ok_or_else(|| HandshakeFailure::Initiation("AuthnRequest has no destination".into()))?;

        Ok(LoginRequest {
            request_id: authn_request.id,
            redirect_url: redirect_url.to_string(),
        })
    }

    fn consume(
        &self,
        saml_response: &str,
        pending_request_id: Option<&str>,
    ) -> Result<RawProfile, HandshakeFailure> {
        let sp = self.service_provider();
        let expected = pending_request_id.map(|id| [id]);

        let assertion = sp
            .parse_base64_response(saml_response, expected.as_ref().map(|ids| ids.as_slice()))
            .map_err(|e| HandshakeFailure::InvalidResponse(e.to_string()))?;

        let name_id = assertion
            .subject
            .as_ref()
            .and_then(|s| s.name_id.as_ref())
            .map(|n| n.value.clone());

        Ok(RawProfile {
            name_id,
            claims: extract_claims(&assertion),
        })
    }

    fn metadata_xml(&self) -> Result<String> {
        build_metadata(&self.entity_id, &self.acs_url, self.sp_cert_der.as_deref())
    }
}
