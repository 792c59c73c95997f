use axum::http::{self, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use saml_gate::config::{ClaimMapping, Config, IdpTrust};
use saml_gate::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const IDP_SSO_URL: &str = "https://idp.example.com/samlp/client-id";

/// A well-formed but unsigned Response; the IdP certificate is configured, so
/// samael must refuse it.
const UNSIGNED_RESPONSE_XML: &str = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="_resp" Version="2.0" IssueInstant="2026-01-01T00:00:00Z" Destination="http://localhost:8080/saml/consume"><saml:Issuer>urn:example:idp</saml:Issuer><samlp:Status><samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/></samlp:Status><saml:Assertion ID="_assert" Version="2.0" IssueInstant="2026-01-01T00:00:00Z"><saml:Issuer>urn:example:idp</saml:Issuer><saml:Subject><saml:NameID>u2</saml:NameID></saml:Subject><saml:AttributeStatement><saml:Attribute Name="https://schemas.myapp.com/claims/groups"><saml:AttributeValue>App-Admins</saml:AttributeValue></saml:Attribute></saml:AttributeStatement></saml:Assertion></samlp:Response>"#;

fn test_config() -> Config {
    Config {
        base_url: "http://localhost:8080".into(),
        entity_id: "http://localhost:8080/saml/metadata".into(),
        idp: IdpTrust::Explicit {
            entity_id: "urn:example:idp".into(),
            sso_url: IDP_SSO_URL.into(),
            cert_path: format!("{}/tests/fixtures/idp-cert.pem", env!("CARGO_MANIFEST_DIR")),
        },
        sp_cert_path: None,
        admin_group: "App-Admins".into(),
        claims: ClaimMapping::default(),
        session_secret: "k".repeat(64),
        session_ttl: Duration::from_secs(3600),
        secure_cookies: true,
        allow_idp_initiated: false,
        host: "127.0.0.1".into(),
        port: 8080,
    }
}

fn test_app() -> axum::Router {
    let state = Arc::new(AppState::new(test_config()).expect("failed to create AppState"));
    saml_gate::app(state)
}

fn location(response: &http::Response<axum::body::Body>) -> String {
    response
        .headers()
        .get(http::header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .expect("invalid Location header")
        .to_string()
}

fn cookie(response: &http::Response<axum::body::Body>) -> String {
    let set_cookie = response
        .headers()
        .get(http::header::SET_COOKIE)
        .expect("missing Set-Cookie header")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn body_text(response: http::Response<axum::body::Body>) -> String {
    String::from_utf8(
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec(),
    )
    .unwrap()
}

#[tokio::test]
async fn login_redirects_with_authn_request() {
    let app = test_app();

    let response = app
        .oneshot(
            http::Request::builder()
                .uri("/login")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = location(&response);
    assert!(
        location.starts_with(IDP_SSO_URL),
        "expected redirect to IdP, got: {location}"
    );
    assert!(location.contains("SAMLRequest="));
    assert!(location.contains("RelayState="));

    let set_cookie = response
        .headers()
        .get(http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=None"));
    assert!(set_cookie.contains("Secure"));
}

#[tokio::test]
async fn unsigned_response_is_rejected() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(
            http::Request::builder()
                .uri("/login")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let cookie = cookie(&response);

    for saml_response in [
        STANDARD.encode(UNSIGNED_RESPONSE_XML),
        "definitely not base64 %%%".to_string(),
    ] {
        let form_body = format!("SAMLResponse={}", urlencoding::encode(&saml_response));
        let response = app
            .clone()
            .oneshot(
                http::Request::builder()
                    .method(http::Method::POST)
                    .uri("/saml/consume")
                    .header(
                        http::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .header(http::header::COOKIE, &cookie)
                    .body(axum::body::Body::from(form_body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/");
    }

    let response = app
        .oneshot(
            http::Request::builder()
                .uri("/")
                .header(http::header::COOKIE, &cookie)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Log in with SAML"));
    assert!(!body.contains("Hello"));
}

#[tokio::test]
async fn metadata_endpoint_returns_xml() {
    let app = test_app();

    let response = app
        .oneshot(
            http::Request::builder()
                .uri("/saml/metadata")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(content_type, "application/xml");

    let body = body_text(response).await;
    assert!(body.contains("EntityDescriptor"));
    assert!(body.contains("AssertionConsumerService"));
    assert!(body.contains("http://localhost:8080/saml/consume"));
    assert!(body.contains("http://localhost:8080/saml/metadata"));
}

#[test]
fn missing_idp_certificate_fails_startup() {
    let mut config = test_config();
    config.idp = IdpTrust::Explicit {
        entity_id: "urn:example:idp".into(),
        sso_url: IDP_SSO_URL.into(),
        cert_path: "does/not/exist.pem".into(),
    };
    assert!(AppState::new(config).is_err());
}

#[test]
fn metadata_without_signing_key_fails_startup() {
    let mut config = test_config();
    config.idp = IdpTrust::MetadataFile(format!(
        "{}/tests/fixtures/idp-metadata-unsigned.xml",
        env!("CARGO_MANIFEST_DIR")
    ));
    let err = AppState::new(config).err().expect("startup should fail");
    assert!(err.to_string().contains("signing certificate"));
}
