//! Template resolution: fetch a stylesheet from the content store and compile it.

use crate::core::engine::{
    default_engine, location_from_uri, resource_uri, EngineError, NoResources, OutputEncoding,
    OutputSettings, PreparedStylesheet, ResourceResolver, XsltEngine,
};
use crate::core::error::ClassifiedError;
use crate::core::store::ContentStore;
use crate::core::types::{ErrorKind, StoreLocation};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// A compiled, immutable transformation ready to run any number of times.
#[derive(Clone)]
pub struct CompiledTemplate {
    stylesheet: Arc<dyn PreparedStylesheet>,
    origin: String,
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("origin", &self.origin)
            .field("output", self.stylesheet.output())
            .finish()
    }
}

impl CompiledTemplate {
    /// Compile template bytes that have no store behind them; `origin` names the template in
    /// diagnostics. `xsl:import` and `document()` only see the template itself.
    pub fn from_bytes(bytes: &[u8], origin: impl Into<String>) -> Result<Self, ClassifiedError> {
        let origin = origin.into();
        Self::compile(
            default_engine().as_ref(),
            bytes,
            &origin,
            origin.clone(),
            Arc::new(NoResources),
        )
    }

    pub fn from_text(text: &str, origin: impl Into<String>) -> Result<Self, ClassifiedError> {
        Self::from_bytes(text.as_bytes(), origin)
    }

    fn compile(
        engine: &dyn XsltEngine,
        bytes: &[u8],
        base_uri: &str,
        origin: String,
        resources: Arc<dyn ResourceResolver>,
    ) -> Result<Self, ClassifiedError> {
        let stylesheet = engine
            .compile(bytes, base_uri, resources)
            .map_err(|err| compilation_failed(&origin, err))?;
        Ok(CompiledTemplate { stylesheet, origin })
    }

    pub fn stylesheet(&self) -> &dyn PreparedStylesheet {
        self.stylesheet.as_ref()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn output(&self) -> &OutputSettings {
        self.stylesheet.output()
    }

    /// Character encoding the template declares for its output.
    pub fn output_encoding(&self) -> OutputEncoding {
        self.output().output_encoding()
    }
}

fn compilation_failed(origin: &str, err: EngineError) -> ClassifiedError {
    let message = match &err {
        EngineError::ScriptBlock { .. } => format!("template {} embeds a script block", origin),
        EngineError::DepthExceeded { .. } => format!("template {} nests too deeply", origin),
        _ => format!("template {} does not compile", origin),
    };
    ClassifiedError::with_source(ErrorKind::TemplateCompilationFailed, message, Box::new(err))
        .with_context("template", origin.to_string())
}

/// Serves `xsl:import`, `xsl:include` and `document()` from the store the template came from.
struct StoreResources {
    store: Arc<dyn ContentStore>,
    runtime: Handle,
}

impl ResourceResolver for StoreResources {
    fn load(&self, uri: &str) -> Option<Vec<u8>> {
        let location = location_from_uri(uri)?;
        match self.runtime.block_on(self.store.fetch(&location)) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!(uri, error = %err, "template resource unavailable");
                None
            }
        }
    }
}

/// Resolves template locations against a content store.
#[derive(Clone)]
pub struct TemplateResolver {
    store: Arc<dyn ContentStore>,
    engine: Arc<dyn XsltEngine>,
}

impl TemplateResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        TemplateResolver {
            store,
            engine: default_engine(),
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn XsltEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Must run inside a tokio runtime; compilation itself happens on a blocking thread.
    pub async fn resolve(&self, location: &StoreLocation) -> Result<CompiledTemplate, ClassifiedError> {
        let bytes = self
            .store
            .fetch(location)
            .await
            .map_err(|err| err.classify(ErrorKind::TemplateNotFound))?;

        let resources: Arc<dyn ResourceResolver> = Arc::new(StoreResources {
            store: Arc::clone(&self.store),
            runtime: Handle::current(),
        });
        let engine = Arc::clone(&self.engine);
        let origin = location.to_string();
        let base_uri = resource_uri(location);
        tokio::task::spawn_blocking(move || {
            CompiledTemplate::compile(engine.as_ref(), &bytes, &base_uri, origin, resources)
        })
        .await
        .map_err(|err| {
            ClassifiedError::new(
                ErrorKind::TemplateCompilationFailed,
                format!("template {} compilation was interrupted", location),
            )
            .with_detail(err.to_string())
        })?
    }
}
