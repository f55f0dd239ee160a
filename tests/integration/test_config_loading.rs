use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use xslmapper::core::barcode::Compaction;
use xslmapper::core::config::{ConfigLoader, StoreBackend};
use xslmapper::logging::LoggingConfig;

fn clear_xslmapper_env() {
    for v in &[
        "XSLMAPPER_CONTAINERS_MAPPERS",
        "XSLMAPPER_CONTAINERS_EXTENSION_OBJECTS",
        "XSLMAPPER_STORE_BACKEND",
        "XSLMAPPER_STORE_ROOT",
        "XSLMAPPER_STORE_BASE_URL",
        "XSLMAPPER_STORE_SAS_TOKEN",
        "XSLMAPPER_ENCODE_BASE64_OUTPUT",
        "XSLMAPPER_SERVER_BIND",
    ] {
        env::remove_var(v);
    }
}

/// Full file, env overrides on top, then the logging section resolved.
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_xslmapper_env();
    let temp_dir = TempDir::new().unwrap();
    let workspace_path = temp_dir.path();

    let config_content = r#"
[containers]
mappers = "templates"
extension_objects = "helpers"

[store]
backend = "filesystem"
root = "data/blobs"
timeout_seconds = 10

[output]
encode_base64 = true

[barcode]
error_correction = 3
width = 4
height = 2
margin = 1
compaction = "text"

[server]
bind = "0.0.0.0:9000"
max_body_bytes = 1024

[logging]
default_level = "xslmapper=debug"
console_output = "stderr"
"#;
    fs::write(workspace_path.join("xslmapper.toml"), config_content).unwrap();

    env::set_var("XSLMAPPER_CONTAINERS_MAPPERS", "mappers-v2");
    env::set_var("XSLMAPPER_ENCODE_BASE64_OUTPUT", "false");

    let config = ConfigLoader::load(None, workspace_path).unwrap();

    assert_eq!(config.containers.mappers, "mappers-v2");
    assert_eq!(config.containers.extension_objects, "helpers");
    assert_eq!(config.store.backend, StoreBackend::Filesystem);
    assert_eq!(config.store.root, workspace_path.join("data/blobs"));
    assert!(!config.output.encode_base64);
    assert_eq!(config.barcode.error_correction, 3);
    assert_eq!(config.barcode.compaction, Compaction::Text);
    assert_eq!(config.server.bind, "0.0.0.0:9000");
    assert_eq!(config.server.max_body_bytes, 1024);

    let logging = LoggingConfig::from_section(&config.logging).unwrap();
    assert_eq!(logging.default_level, "xslmapper=debug");
    assert!(!logging.enable_file);

    clear_xslmapper_env();
}

#[test]
#[serial]
fn test_explicit_config_path_anchors_store_root() {
    clear_xslmapper_env();
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("etc");
    fs::create_dir_all(&config_dir).unwrap();
    let config_path = config_dir.join("mapper.toml");
    fs::write(&config_path, "[store]\nroot = \"blobs\"\n").unwrap();

    let elsewhere = TempDir::new().unwrap();
    let config = ConfigLoader::load(Some(&config_path), elsewhere.path()).unwrap();
    assert_eq!(config.store.root, config_dir.join("blobs"));
}

#[test]
#[serial]
fn test_missing_explicit_config_is_an_error() {
    clear_xslmapper_env();
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");
    let err = ConfigLoader::load(Some(&missing), temp_dir.path()).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
#[serial]
fn test_defaults_without_a_file() {
    clear_xslmapper_env();
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load(None, temp_dir.path()).unwrap();
    assert_eq!(config.containers.mappers, "mappers");
    assert_eq!(config.containers.extension_objects, "extension-objects");
    assert_eq!(config.store.root, temp_dir.path().join(PathBuf::from("./blobs")));
    assert_eq!(config.server.bind, "127.0.0.1:7071");
}

#[test]
#[serial]
fn test_http_backend_requires_base_url() {
    clear_xslmapper_env();
    let temp_dir = TempDir::new().unwrap();
    env::set_var("XSLMAPPER_STORE_BACKEND", "http");
    assert!(ConfigLoader::load(None, temp_dir.path()).is_err());

    env::set_var("XSLMAPPER_STORE_BASE_URL", "https://blobs.example.com");
    env::set_var("XSLMAPPER_STORE_SAS_TOKEN", "sv=2024&sig=abc");
    let config = ConfigLoader::load(None, temp_dir.path()).unwrap();
    assert_eq!(config.store.backend, StoreBackend::Http);
    assert_eq!(config.store.sas_token.as_deref(), Some("sv=2024&sig=abc"));
    assert_eq!(config.store.build().unwrap().backend(), "http");

    env::set_var("XSLMAPPER_STORE_BACKEND", "ftp");
    assert!(ConfigLoader::load(None, temp_dir.path()).is_err());
    clear_xslmapper_env();
}

#[test]
#[serial]
fn test_invalid_values_fail_validation() {
    clear_xslmapper_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("xslmapper.toml"),
        "[barcode]\nerror_correction = 9\n",
    )
    .unwrap();
    assert!(ConfigLoader::load(None, temp_dir.path()).is_err());

    fs::write(
        temp_dir.path().join("xslmapper.toml"),
        "[server]\nbind = \"not an address\"\n",
    )
    .unwrap();
    assert!(ConfigLoader::load(None, temp_dir.path()).is_err());

    fs::write(temp_dir.path().join("xslmapper.toml"), "[store\n").unwrap();
    assert!(ConfigLoader::load(None, temp_dir.path()).is_err());
}
