//! Tracing sinks: a console layer routed by execution context and an optional file layer.

pub mod console;
pub mod file;
