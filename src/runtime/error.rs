use thiserror::Error;

use crate::runtime::value::Value;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A language-level exception travelling up to the execution engine.
    #[error("{rendered}")]
    Raised { exception: Value, rendered: String },
    #[error("Intrinsic '{operation}' failed: {reason}")]
    Intrinsic {
        operation: &'static str,
        reason: String,
    },
    #[error("Maximum call depth of {limit} exceeded")]
    CallDepthExceeded { limit: usize },
    #[error("Base chain of type '{type_name}' is longer than {limit} links")]
    BaseChainTooDeep { type_name: String, limit: usize },
    #[error("Console {operation} failed: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },
    #[error("Invalid runtime configuration: {message}")]
    Config { message: String },
}

pub type RtResult<T> = Result<T, RuntimeError>;

impl RuntimeError {
    pub(crate) fn intrinsic(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Intrinsic {
            operation,
            reason: reason.into(),
        }
    }

    /// The exception value carried by a raised error, if any.
    pub fn exception(&self) -> Option<Value> {
        match self {
            Self::Raised { exception, .. } => Some(*exception),
            _ => None,
        }
    }
}
