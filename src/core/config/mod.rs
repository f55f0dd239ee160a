use crate::core::barcode::BarcodeSettings;
use crate::core::store::{ContentStore, FileSystemStore, HttpBlobStore};
use crate::core::types::{ModuleDescriptor, StoreLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub mod loader;

pub use loader::ConfigLoader;

/// Service configuration loaded from xslmapper.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServiceConfig {
    /// Container names in the content store
    #[serde(default)]
    pub containers: ContainersConfig,

    /// Content store backend
    #[serde(default)]
    pub store: StoreConfig,

    /// Output defaults
    #[serde(default)]
    pub output: OutputConfig,

    /// Barcode symbol settings
    #[serde(default)]
    pub barcode: BarcodeSettings,

    /// HTTP boundary
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging sinks
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContainersConfig {
    /// Container holding templates
    #[serde(default = "default_mappers_container")]
    pub mappers: String,

    /// Container holding extension modules
    #[serde(default = "default_extension_objects_container")]
    pub extension_objects: String,
}

impl ContainersConfig {
    pub fn template_location(&self, directory: &str, name: &str) -> StoreLocation {
        StoreLocation::new(self.mappers.clone(), directory, name)
    }

    pub fn module_descriptor(
        &self,
        directory: &str,
        name: &str,
        namespace: &str,
        class_name: &str,
    ) -> ModuleDescriptor {
        ModuleDescriptor {
            location: StoreLocation::new(self.extension_objects.clone(), directory, name),
            namespace: namespace.to_string(),
            class_name: class_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Filesystem,
    Http,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Filesystem => write!(f, "filesystem"),
            StoreBackend::Http => write!(f, "http"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "filesystem" => Ok(StoreBackend::Filesystem),
            "http" => Ok(StoreBackend::Http),
            _ => Err(format!(
                "invalid store.backend '{}'; supported values are filesystem, http",
                value
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Filesystem root holding one directory per container
    #[serde(default = "default_store_root")]
    pub root: PathBuf,

    /// Blob service endpoint for the http backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Shared access signature appended to every blob URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sas_token: Option<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl StoreConfig {
    /// Build the configured content store.
    pub fn build(&self) -> crate::Result<Arc<dyn ContentStore>> {
        match self.backend {
            StoreBackend::Filesystem => Ok(Arc::new(FileSystemStore::new(self.root.clone()))),
            StoreBackend::Http => {
                let base_url = self.base_url.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("store.base_url is required when store.backend is http")
                })?;
                let store = HttpBlobStore::new(
                    base_url,
                    self.sas_token.clone(),
                    Duration::from_secs(self.timeout_seconds),
                )?;
                Ok(Arc::new(store))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Encode content as base64 when a request does not say
    #[serde(default)]
    pub encode_base64: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Raw `[logging]` table; resolved by the logging module.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoggingSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_file: Option<bool>,
    /// stdout, stderr or none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_output: Option<String>,
}

// Default functions
fn default_mappers_container() -> String {
    "mappers".to_string()
}

fn default_extension_objects_container() -> String {
    "extension-objects".to_string()
}

fn default_store_root() -> PathBuf {
    PathBuf::from("./blobs")
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_bind() -> String {
    "127.0.0.1:7071".to_string()
}

fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

impl Default for ContainersConfig {
    fn default() -> Self {
        ContainersConfig {
            mappers: default_mappers_container(),
            extension_objects: default_extension_objects_container(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: StoreBackend::default(),
            root: default_store_root(),
            base_url: None,
            sas_token: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}
