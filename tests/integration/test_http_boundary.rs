use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use xslmapper::core::config::{ContainersConfig, ServerConfig};
use xslmapper::core::types::StoreLocation;
use xslmapper::core::{BarcodeGenerator, InMemoryStore};
use xslmapper::server::{serve_with_ready_notifier, ServiceState};
use xslmapper_types::{ErrorResponse, XmlToXmlMapperResponse};

const SUMMARY_TEMPLATE: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform" xmlns:u="urn:upper" exclude-result-prefixes="u">
  <xsl:output method="xml" omit-xml-declaration="yes"/>
  <xsl:param name="TedTimbre"/>
  <xsl:template match="/"><Summary folio="{//Folio}" name="{u:shout(string(//Name))}" stamped="{string-length($TedTimbre) &gt; 22}"/></xsl:template>
</xsl:stylesheet>"#;

const UPPER_MODULE: &str = r#"const CLASS = "Acme.Upper";
fn shout(text) { text.to_upper() }
"#;

const INPUT: &str = "<Doc><Folio>7</Folio><Name>acme</Name><TED><DD>7</DD></TED></Doc>";

async fn start_server(default_base64: bool, max_body_bytes: usize) -> SocketAddr {
    let store = InMemoryStore::new()
        .with_blob(StoreLocation::new("mappers", "dte", "summary.xsl"), SUMMARY_TEMPLATE)
        .with_blob(StoreLocation::new("mappers", "dte", "broken.xsl"), "<xsl:stylesheet")
        .with_blob(StoreLocation::new("extension-objects", "text", "upper.rhai"), UPPER_MODULE);
    let state = ServiceState::new(
        Arc::new(store),
        BarcodeGenerator::default(),
        ContainersConfig::default(),
        default_base64,
    );
    let server = ServerConfig {
        bind: "127.0.0.1:0".to_string(),
        max_body_bytes,
    };
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = serve_with_ready_notifier(state, &server, tx).await;
    });
    rx.await.unwrap()
}

fn payload(template: &str) -> Value {
    json!({
        "mapper": { "directory": "dte", "name": template },
        "inputXml": INPUT,
        "extensionObjects": [{
            "directory": "text",
            "name": "upper.rhai",
            "namespace": "urn:upper",
            "className": "Acme.Upper"
        }]
    })
}

async fn post(addr: SocketAddr, body: String) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{}/api/xml-to-xml", addr))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_successful_mapping_returns_content() {
    let addr = start_server(false, 1 << 20).await;
    let response = post(addr, payload("summary.xsl").to_string()).await;
    assert_eq!(response.status(), 200);
    let body: XmlToXmlMapperResponse = response.json().await.unwrap();
    assert_eq!(
        body.content,
        "<Summary folio=\"7\" name=\"ACME\" stamped=\"true\"/>\n"
    );
}

#[tokio::test]
async fn test_base64_flag_and_configured_default() {
    let addr = start_server(true, 1 << 20).await;

    let response = post(addr, payload("summary.xsl").to_string()).await;
    let body: XmlToXmlMapperResponse = response.json().await.unwrap();
    let decoded = STANDARD.decode(body.content.as_bytes()).unwrap();
    assert!(String::from_utf8(decoded).unwrap().starts_with("<Summary"));

    let mut explicit = payload("summary.xsl");
    explicit["encodeBase64Output"] = json!(false);
    let response = post(addr, explicit.to_string()).await;
    let body: XmlToXmlMapperResponse = response.json().await.unwrap();
    assert!(body.content.starts_with("<Summary"));
}

#[tokio::test]
async fn test_caller_faults_are_bad_requests() {
    let addr = start_server(false, 1 << 20).await;

    let response = post(addr, payload("missing.xsl").to_string()).await;
    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.status_code, 400);
    assert!(body.message.starts_with("TemplateNotFound"), "{}", body.message);

    let mut no_ted = payload("summary.xsl");
    no_ted["inputXml"] = json!("<Doc/>");
    let response = post(addr, no_ted.to_string()).await;
    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert!(body.message.starts_with("RequiredNodeMissing"));

    let mut missing_module = payload("summary.xsl");
    missing_module["extensionObjects"][0]["name"] = json!("gone.rhai");
    let response = post(addr, missing_module.to_string()).await;
    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert!(body.message.starts_with("ModuleNotFound"));
}

#[tokio::test]
async fn test_server_faults_are_internal_errors() {
    let addr = start_server(false, 1 << 20).await;

    let response = post(addr, payload("broken.xsl").to_string()).await;
    assert_eq!(response.status(), 500);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.status_code, 500);
    assert!(body.message.starts_with("TemplateCompilationFailed"));
    assert!(body.detail.is_some());

    let mut wrong_class = payload("summary.xsl");
    wrong_class["extensionObjects"][0]["className"] = json!("Acme.Lower");
    let response = post(addr, wrong_class.to_string()).await;
    assert_eq!(response.status(), 500);
    let body: ErrorResponse = response.json().await.unwrap();
    assert!(body.message.starts_with("ModuleInstantiationFailed"));
}

#[tokio::test]
async fn test_deeply_nested_input_is_an_execution_failure() {
    let addr = start_server(false, 4 << 20).await;
    let mut deep = payload("summary.xsl");
    deep["inputXml"] = json!(format!(
        "<Doc><Folio>7</Folio><Name>acme</Name><TED><DD>7</DD></TED>{}{}</Doc>",
        "<a>".repeat(100_000),
        "</a>".repeat(100_000)
    ));
    let response = post(addr, deep.to_string()).await;
    assert_eq!(response.status(), 500);
    let body: ErrorResponse = response.json().await.unwrap();
    assert!(body.message.starts_with("TransformExecutionFailed"), "{}", body.message);

    let response = post(addr, payload("summary.xsl").to_string()).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_unparsable_payload_is_rejected() {
    let addr = start_server(false, 1 << 20).await;
    let response = post(addr, r#"{"mapper": {"name": "summary.xsl"}}"#.to_string()).await;
    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.message, "invalid request payload");
    assert!(body.detail.unwrap().contains("inputXml"));
}

#[tokio::test]
async fn test_oversized_body_gets_json_envelope() {
    let addr = start_server(false, 256).await;
    let mut large = payload("summary.xsl");
    large["inputXml"] = json!(format!("<Doc><TED/>{}</Doc>", "x".repeat(1024)));
    let response = post(addr, large.to_string()).await;
    assert_eq!(response.status(), 413);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.status_code, 413);
}

#[tokio::test]
async fn test_health_reports_store_backend() {
    let addr = start_server(false, 1 << 20).await;
    let body: Value = reqwest::get(format!("http://{}/api/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], xslmapper::VERSION);
    assert_eq!(body["store"], "memory");
}
