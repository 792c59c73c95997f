use crate::state::AppState;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use samael::crypto::CertificateDer;
use samael::key_info::{KeyInfo, X509Data};
use samael::metadata::{
    EntityDescriptor, HTTP_POST_BINDING, IndexedEndpoint, KeyDescriptor, SpSsoDescriptor,
};
use samael::traits::ToXml;
use std::sync::Arc;

/// Serves this application's SP metadata for the identity provider to import.
pub async fn metadata(State(state): State<Arc<AppState>>) -> Response {
    match state.idp.metadata_xml() {
        Ok(xml) => ([(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to generate SP metadata");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// EntityDescriptor with a single SPSSODescriptor: the POST-binding ACS and,
/// when configured, the SP certificate as a signing key.
pub fn build_metadata(
    entity_id: &str,
    acs_url: &str,
    cert_der: Option<&[u8]>,
) -> anyhow::Result<String> {
    let key_descriptors = cert_der.map(|der| {
        let cert_b64 = samael::crypto::mime_encode_x509_cert(&CertificateDer::from(der.to_vec()));
        vec![KeyDescriptor {
            key_use: Some("signing".to_string()),
            key_info: KeyInfo {
                id: None,
                x509_data: Some(X509Data {
                    certificates: vec![cert_b64],
                }),
            },
            encryption_methods: None,
        }]
    });

    let sp_descriptor = SpSsoDescriptor {
        authn_requests_signed: Some(false),
        want_assertions_signed: Some(true),
        protocol_support_enumeration: Some("urn:oasis:names:tc:SAML:2.0:protocol".to_string()),
        key_descriptors,
        name_id_formats: Some(vec![
            "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified".to_string(),
        ]),
        assertion_consumer_services: vec![IndexedEndpoint {
            binding: HTTP_POST_BINDING.to_string(),
            location: acs_url.to_string(),
            response_location: None,
            index: 0,
            is_default: Some(true),
        }],
        ..Default::default()
    };

    let entity_descriptor = EntityDescriptor {
        entity_id: Some(entity_id.to_string()),
        sp_sso_descriptors: Some(vec![sp_descriptor]),
        ..Default::default()
    };

    entity_descriptor
        .to_string()
        .map_err(|e| anyhow::anyhow!("{e}"))
}
