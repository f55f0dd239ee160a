//! The transform pipeline: template resolution, module registration, barcode injection and
//! execution, run strictly in that order with every failure classified.
//!
//! Each stage consumes the accumulator of the previous one and returns the next, so a stage can
//! only run once everything before it has succeeded:
//!
//! ```text
//! Idle -> TemplateResolved -> ModulesRegistered -> ParameterInjected -> Executed -> Succeeded
//!   \__________________________________________________________________________/
//!                                  any failure -> Failed
//! ```

use crate::core::barcode::BarcodeGenerator;
use crate::core::document::{extract_required_node, SourceDocument};
use crate::core::error::ClassifiedError;
use crate::core::modules::{ModuleLoader, ModuleRuntime};
use crate::core::registry::ParameterRegistry;
use crate::core::store::ContentStore;
use crate::core::template::{CompiledTemplate, TemplateResolver};
use crate::core::transform::{self, TransformOutput};
use crate::core::types::{ErrorKind, ModuleDescriptor, PipelineStage, SourceInput, TransformRequest};
use crate::core::engine::{OutputEncoding, XsltEngine};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;
use tokio::task::JoinError;

/// Final output of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub bytes: Vec<u8>,
    /// Base64 form of `bytes`, present when the request asked for it.
    pub base64: Option<String>,
    pub encoding: OutputEncoding,
    pub media_type: String,
    pub messages: Vec<String>,
}

impl PipelineResult {
    /// Content as returned to the caller: the base64 text when requested, otherwise the output
    /// decoded with the template's output encoding.
    pub fn content(&self) -> String {
        match &self.base64 {
            Some(encoded) => encoded.clone(),
            None => self.encoding.decode(&self.bytes),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum PipelineOutcome {
    Succeeded(PipelineResult),
    Failed(ClassifiedError),
}

impl PipelineOutcome {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineOutcome::Succeeded(_) => PipelineStage::Succeeded,
            PipelineOutcome::Failed(_) => PipelineStage::Failed,
        }
    }

    pub fn into_result(self) -> Result<PipelineResult, ClassifiedError> {
        match self {
            PipelineOutcome::Succeeded(result) => Ok(result),
            PipelineOutcome::Failed(err) => Err(err),
        }
    }
}

struct TemplateResolved {
    template: CompiledTemplate,
    input: SourceInput,
    modules: Vec<ModuleDescriptor>,
    encode_base64: bool,
}

struct ModulesRegistered {
    template: CompiledTemplate,
    input: SourceInput,
    parameters: ParameterRegistry,
    encode_base64: bool,
}

struct ParameterInjected {
    template: CompiledTemplate,
    document: SourceDocument,
    parameters: ParameterRegistry,
    encode_base64: bool,
}

struct Executed {
    output: TransformOutput,
    encode_base64: bool,
}

/// Runs transformation requests. Holds no per-run state; one instance serves concurrent runs.
#[derive(Clone)]
pub struct TransformPipeline {
    resolver: TemplateResolver,
    loader: Arc<ModuleLoader>,
    barcode: Arc<BarcodeGenerator>,
}

impl TransformPipeline {
    pub fn new(
        store: Arc<dyn ContentStore>,
        runtime: Arc<dyn ModuleRuntime>,
        barcode: BarcodeGenerator,
    ) -> Self {
        TransformPipeline {
            resolver: TemplateResolver::new(store.clone()),
            loader: Arc::new(ModuleLoader::new(store, runtime)),
            barcode: Arc::new(barcode),
        }
    }

    pub fn with_loader(mut self, loader: ModuleLoader) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// Compile templates with `engine` instead of the process-wide libxslt engine.
    pub fn with_engine(mut self, engine: Arc<dyn XsltEngine>) -> Self {
        self.resolver = self.resolver.with_engine(engine);
        self
    }

    pub async fn run(&self, request: TransformRequest) -> PipelineOutcome {
        match self.advance(request).await {
            Ok(result) => PipelineOutcome::Succeeded(result),
            Err(err) => PipelineOutcome::Failed(err),
        }
    }

    async fn advance(&self, request: TransformRequest) -> Result<PipelineResult, ClassifiedError> {
        let resolved = self
            .resolve_template(request)
            .await
            .map_err(|err| err.at_stage(PipelineStage::TemplateResolved))?;
        let registered = self
            .register_modules(resolved)
            .await
            .map_err(|err| err.at_stage(PipelineStage::ModulesRegistered))?;
        let injected = self
            .inject_parameter(registered)
            .await
            .map_err(|err| err.at_stage(PipelineStage::ParameterInjected))?;
        let executed = execute(injected)
            .await
            .map_err(|err| err.at_stage(PipelineStage::Executed))?;
        Ok(finish(executed))
    }

    async fn resolve_template(
        &self,
        request: TransformRequest,
    ) -> Result<TemplateResolved, ClassifiedError> {
        let template = self.resolver.resolve(&request.template).await?;
        Ok(TemplateResolved {
            template,
            input: request.input,
            modules: request.modules,
            encode_base64: request.encode_base64,
        })
    }

    async fn register_modules(
        &self,
        state: TemplateResolved,
    ) -> Result<ModulesRegistered, ClassifiedError> {
        let mut parameters = ParameterRegistry::new();
        self.loader
            .load(&state.modules, &mut parameters.extensions)
            .await?;
        Ok(ModulesRegistered {
            template: state.template,
            input: state.input,
            parameters,
            encode_base64: state.encode_base64,
        })
    }

    async fn inject_parameter(
        &self,
        state: ModulesRegistered,
    ) -> Result<ParameterInjected, ClassifiedError> {
        let document = SourceDocument::from_input(state.input)?;
        let node = extract_required_node(&document)?;

        let generator = self.barcode.clone();
        let entry = tokio::task::spawn_blocking(move || generator.generate(&node))
            .await
            .map_err(|err| worker_failed(ErrorKind::BarcodeGenerationFailed, err))??;

        let mut parameters = state.parameters;
        parameters.add_parameter(entry);
        Ok(ParameterInjected {
            template: state.template,
            document,
            parameters,
            encode_base64: state.encode_base64,
        })
    }
}

async fn execute(state: ParameterInjected) -> Result<Executed, ClassifiedError> {
    let ParameterInjected {
        template,
        document,
        parameters,
        encode_base64,
    } = state;
    let output =
        tokio::task::spawn_blocking(move || transform::execute(&template, &document, &parameters))
            .await
            .map_err(|err| worker_failed(ErrorKind::TransformExecutionFailed, err))??;
    Ok(Executed {
        output,
        encode_base64,
    })
}

fn finish(state: Executed) -> PipelineResult {
    let output = state.output;
    PipelineResult {
        base64: state.encode_base64.then(|| STANDARD.encode(&output.bytes)),
        bytes: output.bytes,
        encoding: output.encoding,
        media_type: output.media_type,
        messages: output.messages,
    }
}

fn worker_failed(kind: ErrorKind, err: JoinError) -> ClassifiedError {
    let message = if err.is_panic() {
        "worker panicked"
    } else {
        "worker was cancelled"
    };
    ClassifiedError::new(kind, message)
}
