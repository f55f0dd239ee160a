use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure taxonomy of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedDocument,
    RequiredNodeMissing,
    TemplateNotFound,
    TemplateCompilationFailed,
    ModuleNotFound,
    ModuleInstantiationFailed,
    BarcodeGenerationFailed,
    TransformExecutionFailed,
    StoreUnavailable,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::MalformedDocument,
        ErrorKind::RequiredNodeMissing,
        ErrorKind::TemplateNotFound,
        ErrorKind::TemplateCompilationFailed,
        ErrorKind::ModuleNotFound,
        ErrorKind::ModuleInstantiationFailed,
        ErrorKind::BarcodeGenerationFailed,
        ErrorKind::TransformExecutionFailed,
        ErrorKind::StoreUnavailable,
    ];

    /// Whether the caller or the service is to blame for this kind of failure.
    pub fn status_class(self) -> StatusClass {
        match self {
            ErrorKind::MalformedDocument
            | ErrorKind::RequiredNodeMissing
            | ErrorKind::TemplateNotFound
            | ErrorKind::ModuleNotFound => StatusClass::CallerFault,
            ErrorKind::TemplateCompilationFailed
            | ErrorKind::ModuleInstantiationFailed
            | ErrorKind::BarcodeGenerationFailed
            | ErrorKind::TransformExecutionFailed
            | ErrorKind::StoreUnavailable => StatusClass::ServerFault,
        }
    }

    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::MalformedDocument => "XSLM-DOC-001",
            ErrorKind::RequiredNodeMissing => "XSLM-DOC-002",
            ErrorKind::TemplateNotFound => "XSLM-TPL-001",
            ErrorKind::TemplateCompilationFailed => "XSLM-TPL-002",
            ErrorKind::ModuleNotFound => "XSLM-MOD-001",
            ErrorKind::ModuleInstantiationFailed => "XSLM-MOD-002",
            ErrorKind::BarcodeGenerationFailed => "XSLM-BAR-001",
            ErrorKind::TransformExecutionFailed => "XSLM-EXE-001",
            ErrorKind::StoreUnavailable => "XSLM-STO-001",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Caller-visible class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusClass {
    CallerFault,
    ServerFault,
}

/// States of a pipeline run. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Idle,
    TemplateResolved,
    ModulesRegistered,
    ParameterInjected,
    Executed,
    Succeeded,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Address of a blob in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreLocation {
    pub container: String,
    pub directory: String,
    pub name: String,
}

impl StoreLocation {
    pub fn new(
        container: impl Into<String>,
        directory: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            directory: directory.into(),
            name: name.into(),
        }
    }

    /// Directory segments with empty components removed.
    pub fn directory_segments(&self) -> impl Iterator<Item = &str> {
        self.directory.split('/').filter(|segment| !segment.is_empty())
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/", self.container)?;
        for segment in self.directory_segments() {
            write!(f, "{}/", segment)?;
        }
        write!(f, "{}", self.name)
    }
}

/// One dynamically loadable helper module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub location: StoreLocation,
    pub namespace: String,
    pub class_name: String,
}

/// Input document as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    Text(String),
    Bytes(Vec<u8>),
}

/// One inbound transformation job.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub template: StoreLocation,
    pub input: SourceInput,
    pub modules: Vec<ModuleDescriptor>,
    pub encode_base64: bool,
}
