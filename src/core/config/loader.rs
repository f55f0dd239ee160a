use super::{ServiceConfig, StoreBackend};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "xslmapper.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `path`, or `xslmapper.toml` in `working_dir` when no path is given.
    /// An explicit path must exist; the implicit file may be absent (defaults + env vars).
    pub fn load(path: Option<&Path>, working_dir: &Path) -> Result<ServiceConfig> {
        let file = match path {
            Some(path) => Some(
                Self::load_from_file(path)?
                    .ok_or_else(|| anyhow!("config file {} does not exist", path.display()))?,
            ),
            None => Self::load_from_file(&working_dir.join(DEFAULT_CONFIG_FILE))?,
        };

        let mut config = file.unwrap_or_default();

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut config)?;
        Self::resolve_relative_paths(&mut config, path, working_dir);
        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<ServiceConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config: ServiceConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        Ok(Some(config))
    }

    /// Environment variables take precedence over config file values.
    fn apply_env_overrides(config: &mut ServiceConfig) -> Result<()> {
        if let Ok(mappers) = env::var("XSLMAPPER_CONTAINERS_MAPPERS") {
            config.containers.mappers = mappers;
        }

        if let Ok(extension_objects) = env::var("XSLMAPPER_CONTAINERS_EXTENSION_OBJECTS") {
            config.containers.extension_objects = extension_objects;
        }

        if let Ok(backend) = env::var("XSLMAPPER_STORE_BACKEND") {
            config.store.backend = backend
                .parse::<StoreBackend>()
                .map_err(|err| anyhow!("XSLMAPPER_STORE_BACKEND: {}", err))?;
        }

        if let Ok(root) = env::var("XSLMAPPER_STORE_ROOT") {
            config.store.root = PathBuf::from(root);
        }

        if let Ok(base_url) = env::var("XSLMAPPER_STORE_BASE_URL") {
            config.store.base_url = Some(base_url);
        }

        if let Ok(sas_token) = env::var("XSLMAPPER_STORE_SAS_TOKEN") {
            config.store.sas_token = Some(sas_token);
        }

        if let Ok(encode_str) = env::var("XSLMAPPER_ENCODE_BASE64_OUTPUT") {
            if let Ok(encode) = encode_str.trim().parse::<bool>() {
                config.output.encode_base64 = encode;
            }
        }

        if let Ok(bind) = env::var("XSLMAPPER_SERVER_BIND") {
            config.server.bind = bind;
        }

        Ok(())
    }

    /// A relative store root is taken relative to the config file that named it.
    fn resolve_relative_paths(config: &mut ServiceConfig, path: Option<&Path>, working_dir: &Path) {
        if config.store.root.is_absolute() {
            return;
        }
        let base = path
            .and_then(Path::parent)
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(|parent| {
                if parent.is_absolute() {
                    parent.to_path_buf()
                } else {
                    working_dir.join(parent)
                }
            })
            .unwrap_or_else(|| working_dir.to_path_buf());
        config.store.root = base.join(&config.store.root);
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "XSLMAPPER_CONTAINERS_MAPPERS - Override the template container (default: mappers)",
            "XSLMAPPER_CONTAINERS_EXTENSION_OBJECTS - Override the module container (default: extension-objects)",
            "XSLMAPPER_STORE_BACKEND - Override the store backend (filesystem/http)",
            "XSLMAPPER_STORE_ROOT - Override the filesystem store root (default: ./blobs)",
            "XSLMAPPER_STORE_BASE_URL - Override the blob service endpoint",
            "XSLMAPPER_STORE_SAS_TOKEN - Override the shared access signature",
            "XSLMAPPER_ENCODE_BASE64_OUTPUT - Override the base64 output default (true/false)",
            "XSLMAPPER_SERVER_BIND - Override the listen address (default: 127.0.0.1:7071)",
            "RUST_LOG - Override the log level filter",
        ]
    }

    /// Validate configuration values
    pub fn validate_config(config: &ServiceConfig) -> Result<()> {
        if config.containers.mappers.trim().is_empty() {
            bail!("containers.mappers cannot be empty");
        }

        if config.containers.extension_objects.trim().is_empty() {
            bail!("containers.extension_objects cannot be empty");
        }

        if config.store.backend == StoreBackend::Http {
            let base_url = config
                .store
                .base_url
                .as_deref()
                .ok_or_else(|| anyhow!("store.base_url is required when store.backend is http"))?;
            url::Url::parse(base_url).map_err(|err| anyhow!("invalid store.base_url: {}", err))?;
        }

        if config.store.timeout_seconds == 0 {
            bail!("store.timeout_seconds must be greater than zero");
        }

        if config.barcode.error_correction > 8 {
            bail!("barcode.error_correction must be between 0 and 8");
        }

        if config.barcode.width == 0 || config.barcode.height == 0 {
            bail!("barcode.width and barcode.height must be greater than zero");
        }

        config
            .server
            .bind
            .parse::<SocketAddr>()
            .map_err(|err| anyhow!("invalid server.bind '{}': {}", config.server.bind, err))?;

        if config.server.max_body_bytes == 0 {
            bail!("server.max_body_bytes must be greater than zero");
        }

        Ok(())
    }
}
