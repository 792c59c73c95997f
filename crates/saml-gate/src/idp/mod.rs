pub mod client;
pub mod trust;

use crate::error::HandshakeFailure;
use crate::principal::RawProfile;

pub use client::SamlClient;

/// A started SAML handshake: the AuthnRequest ID to remember and the URL
/// that carries the request to the identity provider.
#[derive(Clone, Debug)]
pub struct LoginRequest {
    pub request_id: String,
    pub redirect_url: String,
}

/// The identity provider side of the handshake. Protocol work (XML, signature
/// checks, metadata serialization) happens behind this trait.
pub trait IdentityProviderClient: Send + Sync {
    /// Builds an AuthnRequest whose redirect carries `relay_state` back to
    /// the ACS alongside the response.
    fn begin_login(&self, relay_state: &str) -> Result<LoginRequest, HandshakeFailure>;

    /// Validates a base64 `SAMLResponse`. When `pending_request_id` is set the
    /// response must answer that AuthnRequest.
    fn consume(
        &self,
        saml_response: &str,
        pending_request_id: Option<&str>,
    ) -> Result<RawProfile, HandshakeFailure>;

    fn metadata_xml(&self) -> anyhow::Result<String>;
}
