use crate::cli::Command;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Long-running HTTP service.
    Service,
    /// A single command whose result may be written to stdout.
    OneShot,
}

impl ExecutionContext {
    /// Returns `true` when stdout carries command output and must stay free of log lines.
    pub fn reserves_stdout(self) -> bool {
        matches!(self, ExecutionContext::OneShot)
    }
}

/// Derive the active execution context from a parsed CLI command.
pub fn detect_context(command: &Command) -> ExecutionContext {
    match command {
        Command::Serve(_) => ExecutionContext::Service,
        Command::Transform(_) | Command::CheckTemplate(_) => ExecutionContext::OneShot,
    }
}
