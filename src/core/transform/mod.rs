//! Transform execution: run a compiled template over the input document.

use crate::core::document::SourceDocument;
use crate::core::engine::{EngineError, OutputEncoding};
use crate::core::error::ClassifiedError;
use crate::core::registry::ParameterRegistry;
use crate::core::template::CompiledTemplate;
use crate::core::types::ErrorKind;

/// Bytes produced by one execution, without any byte-order mark.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub bytes: Vec<u8>,
    pub encoding: OutputEncoding,
    pub media_type: String,
    /// Diagnostics of a successful run, such as non-terminating `xsl:message` text.
    pub messages: Vec<String>,
}

impl TransformOutput {
    /// Output decoded back to text with the template's output encoding.
    pub fn text(&self) -> String {
        self.encoding.decode(&self.bytes)
    }
}

/// Run `template` against `document`. Synchronous and CPU-bound.
pub fn execute(
    template: &CompiledTemplate,
    document: &SourceDocument,
    parameters: &ParameterRegistry,
) -> Result<TransformOutput, ClassifiedError> {
    let result = template
        .stylesheet()
        .transform(document.text(), parameters)
        .map_err(|err| execution_failed(template, err))?;

    let encoding = template.output_encoding();
    let mut bytes = result.bytes;
    strip_preamble(&mut bytes, encoding);

    Ok(TransformOutput {
        bytes,
        encoding,
        media_type: template.output().media_type(result.method),
        messages: result.messages,
    })
}

fn strip_preamble(bytes: &mut Vec<u8>, encoding: OutputEncoding) {
    let preamble = encoding.preamble();
    if !preamble.is_empty() && bytes.starts_with(preamble) {
        bytes.drain(..preamble.len());
    }
}

fn execution_failed(template: &CompiledTemplate, err: EngineError) -> ClassifiedError {
    let message = match &err {
        EngineError::DepthExceeded { .. } => {
            format!("input document nests too deeply for template {}", template.origin())
        }
        EngineError::Input(_) => format!("template {} cannot read the input document", template.origin()),
        _ => format!("template {} failed during execution", template.origin()),
    };
    ClassifiedError::with_source(ErrorKind::TransformExecutionFailed, message, Box::new(err))
        .with_context("template", template.origin().to_string())
}
