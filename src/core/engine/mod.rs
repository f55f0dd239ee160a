//! The seam between the mapper and the XSLT processor that runs its templates.
//!
//! The mapper does not interpret XSLT itself. An [`XsltEngine`] compiles stylesheet bytes into a
//! [`PreparedStylesheet`]; the adapter around it only binds parameters and extension objects,
//! routes `xsl:import` and `document()` through a [`ResourceResolver`], and maps the processor's
//! diagnostics onto [`EngineError`]. The shipped engine is [`LibXslt`].

mod ffi;
pub mod libxslt;
pub mod output;

pub use libxslt::LibXslt;
pub use output::{OutputEncoding, OutputMethod, OutputSettings};

use crate::core::registry::ParameterRegistry;
use crate::core::store::is_plain_segment;
use crate::core::types::StoreLocation;
use roxmltree::Document;
use std::sync::{Arc, OnceLock};

/// Deepest element nesting accepted in input documents, templates and loaded resources.
pub const MAX_DOCUMENT_DEPTH: usize = 2048;

const STORE_URI_SCHEME: &str = "store:/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    Compile(String),

    /// Inline script blocks are never compiled.
    #[error("embedded {language} script blocks are not supported")]
    ScriptBlock { language: String },

    #[error("{0}")]
    Input(String),

    #[error("document nests {depth} elements deep; the limit is {limit}")]
    DepthExceeded { depth: usize, limit: usize },

    #[error("{0}")]
    Runtime(String),

    #[error("engine worker failed: {0}")]
    Worker(String),
}

/// Result of one transformation, serialized by the engine in the declared output encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub bytes: Vec<u8>,
    pub method: OutputMethod,
    /// Diagnostics the engine emitted during a successful run, `xsl:message` text included.
    pub messages: Vec<String>,
}

/// Supplies the bytes behind `xsl:import`, `xsl:include` and `document()` URIs.
pub trait ResourceResolver: Send + Sync {
    /// `None` when the resource does not exist or cannot be read.
    fn load(&self, uri: &str) -> Option<Vec<u8>>;
}

/// Resolver for stylesheets that have no store behind them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResources;

impl ResourceResolver for NoResources {
    fn load(&self, _uri: &str) -> Option<Vec<u8>> {
        None
    }
}

pub trait XsltEngine: Send + Sync {
    fn engine_name(&self) -> &'static str;

    fn engine_version(&self) -> String;

    /// `base_uri` anchors relative `xsl:import` and `document()` references.
    fn compile(
        &self,
        source: &[u8],
        base_uri: &str,
        resources: Arc<dyn ResourceResolver>,
    ) -> Result<Arc<dyn PreparedStylesheet>, EngineError>;
}

/// A compiled stylesheet. Immutable; transforms may run concurrently.
pub trait PreparedStylesheet: Send + Sync {
    fn output(&self) -> &OutputSettings;

    fn transform(
        &self,
        input: &str,
        parameters: &ParameterRegistry,
    ) -> Result<EngineOutput, EngineError>;
}

/// Process-wide engine used when none is configured explicitly.
pub fn default_engine() -> Arc<dyn XsltEngine> {
    static ENGINE: OnceLock<Arc<dyn XsltEngine>> = OnceLock::new();
    Arc::clone(ENGINE.get_or_init(|| Arc::new(LibXslt::new())))
}

/// Absolute URI of a stored blob, e.g. `store:/mappers/dte/factura.xsl`.
pub fn resource_uri(location: &StoreLocation) -> String {
    format!("{}{}", STORE_URI_SCHEME, location)
}

/// Inverse of [`resource_uri`]: the first segment is the container, the last the blob name.
pub fn location_from_uri(uri: &str) -> Option<StoreLocation> {
    let path = uri.strip_prefix(STORE_URI_SCHEME)?;
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 || !segments.iter().all(|segment| is_plain_segment(segment)) {
        return None;
    }
    let (container, rest) = segments.split_first()?;
    let (name, directory) = rest.split_last()?;
    Some(StoreLocation::new(*container, directory.join("/"), *name))
}

/// Deepest element nesting in `document`, computed without recursion.
pub fn element_depth(document: &Document<'_>) -> usize {
    let mut depths: Vec<usize> = Vec::new();
    let mut deepest = 0;
    for node in document.descendants() {
        let parent = node
            .parent()
            .and_then(|parent| depths.get(parent.id().get_usize()).copied())
            .unwrap_or(0);
        let depth = if node.is_element() { parent + 1 } else { parent };
        let index = node.id().get_usize();
        if depths.len() <= index {
            depths.resize(index + 1, 0);
        }
        depths[index] = depth;
        deepest = deepest.max(depth);
    }
    deepest
}

/// Fail with [`EngineError::DepthExceeded`] when `document` nests deeper than the budget.
pub fn check_depth(document: &Document<'_>) -> Result<(), EngineError> {
    let depth = element_depth(document);
    if depth > MAX_DOCUMENT_DEPTH {
        return Err(EngineError::DepthExceeded {
            depth,
            limit: MAX_DOCUMENT_DEPTH,
        });
    }
    Ok(())
}
