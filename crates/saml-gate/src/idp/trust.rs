use crate::config::IdpTrust;
use anyhow::{Context, Result};
use samael::crypto::CertificateDer;
use samael::key_info::{KeyInfo, X509Data};
use samael::metadata::{
    Endpoint, EntityDescriptor, HTTP_REDIRECT_BINDING, IdpSsoDescriptor, KeyDescriptor,
};

/// Reads a PEM certificate and returns its DER encoding.
pub fn read_cert_der(path: &str) -> Result<Vec<u8>> {
    let pem = std::fs::read(path).with_context(|| format!("failed to read certificate {path}"))?;
    let cert = openssl::x509::X509::from_pem(&pem)
        .with_context(|| format!("failed to parse certificate {path}"))?;
    cert.to_der().context("failed to encode certificate as DER")
}

/// Produces the identity provider's EntityDescriptor, either parsed from its
/// published metadata or assembled from the configured endpoint and
/// certificate.
pub fn load_idp_metadata(trust: &IdpTrust) -> Result<EntityDescriptor> {
    match trust {
        IdpTrust::MetadataFile(path) => {
            let xml = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read IdP metadata {path}"))?;
            xml.parse()
                .map_err(|e| anyhow::anyhow!("failed to parse IdP metadata {path}: {e}"))
        }
        IdpTrust::Explicit {
            entity_id,
            sso_url,
            cert_path,
        } => {
            let cert_der = read_cert_der(cert_path)?;
            Ok(idp_descriptor(entity_id, sso_url, cert_der))
        }
    }
}

fn idp_descriptor(entity_id: &str, sso_url: &str, cert_der: Vec<u8>) -> EntityDescriptor {
    let cert_b64 = samael::crypto::mime_encode_x509_cert(&CertificateDer::from(cert_der));

    let key_descriptor = KeyDescriptor {
        key_use: Some("signing".to_string()),
        key_info: KeyInfo {
            id: None,
            x509_data: Some(X509Data {
                certificates: vec![cert_b64],
            }),
        },
        encryption_methods: None,
    };

    let idp_descriptor = IdpSsoDescriptor {
        want_authn_requests_signed: Some(false),
        protocol_support_enumeration: Some("urn:oasis:names:tc:SAML:2.0:protocol".to_string()),
        key_descriptors: vec![key_descriptor],
        name_id_formats: vec![],
        single_sign_on_services: vec![Endpoint {
            binding: HTTP_REDIRECT_BINDING.to_string(),
            location: sso_url.to_string(),
            response_location: None,
        }],
        id: None,
        valid_until: None,
        cache_duration: None,
        error_url: None,
        signature: None,
        organization: None,
        contact_people: vec![],
        artifact_resolution_service: vec![],
        single_logout_services: vec![],
        manage_name_id_services: vec![],
        name_id_mapping_services: vec![],
        assertion_id_request_services: vec![],
        attribute_profiles: vec![],
        attributes: vec![],
    };

    EntityDescriptor {
        entity_id: Some(entity_id.to_string()),
        idp_sso_descriptors: Some(vec![idp_descriptor]),
        ..Default::default()
    }
}
