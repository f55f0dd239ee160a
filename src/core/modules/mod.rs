//! Dynamically loaded extension objects and the loader that registers them.

pub mod script;

pub use script::RhaiModuleRuntime;

use crate::core::error::ClassifiedError;
use crate::core::registry::ExtensionTable;
use crate::core::store::ContentStore;
use crate::core::types::{ErrorKind, ModuleDescriptor};
use crate::core::store::StoreError;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;

const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Value crossing the boundary between the template engine and an extension object.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    String(String),
    Number(f64),
    Boolean(bool),
    List(Vec<ExtensionValue>),
}

impl ExtensionValue {
    /// XPath string conversion; a list converts through its first item.
    pub fn to_xpath_string(&self) -> String {
        match self {
            ExtensionValue::String(value) => value.clone(),
            ExtensionValue::Number(value) => number_to_string(*value),
            ExtensionValue::Boolean(value) => value.to_string(),
            ExtensionValue::List(items) => items
                .first()
                .map(ExtensionValue::to_xpath_string)
                .unwrap_or_default(),
        }
    }
}

/// XPath `string()` of a number: integers without a fraction, `NaN` and `Infinity` spelled out.
fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e17 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for ExtensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath_string())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtensionError {
    #[error("no function {name} taking {arity} argument(s)")]
    UnknownFunction { name: String, arity: usize },
    #[error("{function} failed: {message}")]
    Failed { function: String, message: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InstantiationError {
    #[error("module binary is incompatible: {0}")]
    Incompatible(String),
    #[error("module declares no class; expected {requested}")]
    MissingClass { requested: String },
    #[error("class {requested} not present in module (module declares {declared})")]
    ClassMismatch { requested: String, declared: String },
}

/// Object callable by name from the template under its registered namespace.
pub trait ExtensionObject: Send + Sync {
    fn class_name(&self) -> &str;

    /// Every name the object answers to; each is bound in the object's namespace.
    fn function_names(&self) -> Vec<String>;

    fn has_function(&self, name: &str, arity: usize) -> bool;

    fn call(&self, name: &str, args: &[ExtensionValue]) -> Result<ExtensionValue, ExtensionError>;
}

/// Turns a fetched module binary into an instance of the named class.
pub trait ModuleRuntime: Send + Sync {
    fn instantiate(
        &self,
        binary: &[u8],
        class_name: &str,
    ) -> Result<Arc<dyn ExtensionObject>, InstantiationError>;
}

/// Fetches module binaries and registers their instances in descriptor order.
#[derive(Clone)]
pub struct ModuleLoader {
    store: Arc<dyn ContentStore>,
    runtime: Arc<dyn ModuleRuntime>,
    max_concurrent_fetches: usize,
}

impl ModuleLoader {
    pub fn new(store: Arc<dyn ContentStore>, runtime: Arc<dyn ModuleRuntime>) -> Self {
        ModuleLoader {
            store,
            runtime,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    /// Fetches run concurrently; results are applied strictly in descriptor order, so the first
    /// failing descriptor decides the error and later namespaces shadow earlier ones.
    pub async fn load(
        &self,
        descriptors: &[ModuleDescriptor],
        extensions: &mut ExtensionTable,
    ) -> Result<(), ClassifiedError> {
        let fetches: Vec<BoxFuture<'static, (ModuleDescriptor, Result<Vec<u8>, StoreError>)>> =
            descriptors
                .iter()
                .map(|descriptor| {
                    let store = Arc::clone(&self.store);
                    let descriptor = descriptor.clone();
                    async move {
                        let fetched = store.fetch(&descriptor.location).await;
                        (descriptor, fetched)
                    }
                    .boxed()
                })
                .collect();
        let mut fetches = stream::iter(fetches).buffered(self.max_concurrent_fetches);

        while let Some((descriptor, fetched)) = fetches.next().await {
            let binary = fetched.map_err(|err| {
                err.classify(ErrorKind::ModuleNotFound)
                    .with_context("namespace", descriptor.namespace.clone())
                    .with_context("class", descriptor.class_name.clone())
            })?;

            let instance = self
                .runtime
                .instantiate(&binary, &descriptor.class_name)
                .map_err(|err| {
                    ClassifiedError::with_source(
                        ErrorKind::ModuleInstantiationFailed,
                        format!(
                            "cannot instantiate {} from {}",
                            descriptor.class_name, descriptor.location
                        ),
                        Box::new(err),
                    )
                    .with_context("namespace", descriptor.namespace.clone())
                })?;

            extensions.register(descriptor.namespace.clone(), instance);
        }
        Ok(())
    }
}
