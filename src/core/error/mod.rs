use crate::core::types::{ErrorKind, PipelineStage, StatusClass};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A pipeline failure tagged with its [`ErrorKind`].
#[derive(Debug)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: Option<String>,
    pub stage: Option<PipelineStage>,
    pub context: HashMap<String, String>,
    pub occurred_at: DateTime<Utc>,
    pub source: Option<anyhow::Error>,
}

impl ClassifiedError {
    pub fn new<T: Into<String>>(kind: ErrorKind, message: T) -> Self {
        ClassifiedError {
            kind,
            message: message.into(),
            detail: None,
            stage: None,
            context: HashMap::new(),
            occurred_at: Utc::now(),
            source: None,
        }
    }

    pub fn with_source<T: Into<String>>(
        kind: ErrorKind,
        message: T,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        let mut error = ClassifiedError::new(kind, message);
        error.detail = Some(source.to_string());
        error.source = Some(anyhow::anyhow!(source));
        error
    }

    pub fn with_detail<T: Into<String>>(mut self, detail: T) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Record the stage the failure originated in; the first recorded stage sticks.
    pub fn at_stage(mut self, stage: PipelineStage) -> Self {
        if self.stage.is_none() {
            self.stage = Some(stage);
        }
        self
    }

    pub fn status_class(&self) -> StatusClass {
        self.kind.status_class()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn malformed_document<T: Into<String>>(message: T) -> Self {
        ClassifiedError::new(ErrorKind::MalformedDocument, message)
    }

    pub fn required_node_missing(tag: &str, found: usize) -> Self {
        ClassifiedError::new(
            ErrorKind::RequiredNodeMissing,
            format!("exactly one {} node is required, found {}", tag, found),
        )
        .with_context("found", found.to_string())
    }
}

impl std::fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code(), self.kind, self.message)?;
        if let Some(ref detail) = self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ClassifiedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn std::error::Error + 'static))
    }
}
