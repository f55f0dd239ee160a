use insta::assert_snapshot;
use std::collections::HashSet;
use xslmapper::core::error::ClassifiedError;
use xslmapper::core::store::StoreError;
use xslmapper::core::types::{ErrorKind, PipelineStage, StatusClass, StoreLocation};
use xslmapper_types::ErrorResponse;

#[test]
fn test_status_class_table() {
    let caller: Vec<ErrorKind> = ErrorKind::ALL
        .into_iter()
        .filter(|kind| kind.status_class() == StatusClass::CallerFault)
        .collect();
    assert_eq!(
        caller,
        vec![
            ErrorKind::MalformedDocument,
            ErrorKind::RequiredNodeMissing,
            ErrorKind::TemplateNotFound,
            ErrorKind::ModuleNotFound,
        ]
    );

    for kind in [
        ErrorKind::TemplateCompilationFailed,
        ErrorKind::ModuleInstantiationFailed,
        ErrorKind::BarcodeGenerationFailed,
        ErrorKind::TransformExecutionFailed,
        ErrorKind::StoreUnavailable,
    ] {
        assert_eq!(kind.status_class(), StatusClass::ServerFault, "{}", kind);
    }
}

#[test]
fn test_codes_are_unique() {
    let codes: HashSet<&str> = ErrorKind::ALL.iter().map(|kind| kind.code()).collect();
    assert_eq!(codes.len(), ErrorKind::ALL.len());
    assert!(codes.iter().all(|code| code.starts_with("XSLM-")));
}

#[test]
fn test_display_format() {
    let error = ClassifiedError::new(ErrorKind::TemplateNotFound, "mappers/dte/x.xsl was not found")
        .with_detail("blob missing");
    assert_snapshot!(error.to_string(), @"[XSLM-TPL-001] TemplateNotFound: mappers/dte/x.xsl was not found (blob missing)");

    let bare = ClassifiedError::required_node_missing("TED", 2);
    assert_snapshot!(bare.to_string(), @"[XSLM-DOC-002] RequiredNodeMissing: exactly one TED node is required, found 2");
    assert_eq!(bare.context.get("found").map(String::as_str), Some("2"));
}

#[test]
fn test_first_stage_sticks() {
    let error = ClassifiedError::new(ErrorKind::ModuleNotFound, "gone")
        .at_stage(PipelineStage::ModulesRegistered)
        .at_stage(PipelineStage::Executed);
    assert_eq!(error.stage, Some(PipelineStage::ModulesRegistered));
}

#[test]
fn test_store_errors_classify_by_role() {
    let location = StoreLocation::new("extension-objects", "fmt", "money.rhai");

    let missing = StoreError::NotFound(location.clone()).classify(ErrorKind::ModuleNotFound);
    assert_eq!(missing.kind, ErrorKind::ModuleNotFound);
    assert!(missing.message.contains("extension-objects/fmt/money.rhai"));
    assert!(std::error::Error::source(&missing).is_some());

    let missing = StoreError::NotFound(location).classify(ErrorKind::TemplateNotFound);
    assert_eq!(missing.kind, ErrorKind::TemplateNotFound);

    let container = StoreError::ContainerNotFound("mappers".into()).classify(ErrorKind::TemplateNotFound);
    assert_eq!(container.kind, ErrorKind::StoreUnavailable);

    let outage = StoreError::Unavailable("connection reset".into()).classify(ErrorKind::ModuleNotFound);
    assert_eq!(outage.kind, ErrorKind::StoreUnavailable);
    assert_eq!(outage.detail.as_deref(), Some("content store unavailable: connection reset"));
}

#[test]
fn test_classified_error_survives_anyhow() {
    let error: anyhow::Error = ClassifiedError::new(ErrorKind::MalformedDocument, "bad").into();
    let classified = error.downcast_ref::<ClassifiedError>().unwrap();
    assert_eq!(classified.kind, ErrorKind::MalformedDocument);
}

#[test]
fn test_error_envelope_shape() {
    let body = ErrorResponse::new(400, "TemplateNotFound: missing", None);
    assert_snapshot!(
        serde_json::to_string(&body).unwrap(),
        @r#"{"statusCode":400,"message":"TemplateNotFound: missing"}"#
    );

    let body = ErrorResponse::new(500, "StoreUnavailable: down", Some("timeout".into()));
    assert_snapshot!(
        serde_json::to_string(&body).unwrap(),
        @r#"{"statusCode":500,"message":"StoreUnavailable: down","detail":"timeout"}"#
    );
}
