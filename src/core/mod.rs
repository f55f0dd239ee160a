pub mod barcode;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod modules;
pub mod orchestrator;
pub mod registry;
pub mod store;
pub mod template;
pub mod transform;
pub mod types;

pub use barcode::{BarcodeGenerator, BarcodeSettings, BARCODE_PARAMETER};
pub use config::{ConfigLoader, ServiceConfig};
pub use document::{extract_required_node, RequiredNode, SourceDocument};
pub use engine::{LibXslt, OutputEncoding, XsltEngine};
pub use error::ClassifiedError;
pub use modules::{ModuleLoader, ModuleRuntime, RhaiModuleRuntime};
pub use orchestrator::{PipelineOutcome, PipelineResult, TransformPipeline};
pub use registry::{ExtensionTable, ParameterEntry, ParameterRegistry};
pub use store::{ContentStore, FileSystemStore, HttpBlobStore, InMemoryStore, StoreError};
pub use template::{CompiledTemplate, TemplateResolver};
pub use transform::{execute, TransformOutput};
pub use types::*;
