//! A runtime for a small dynamically typed, Python-flavoured language.
//!
//! Everything the language can touch is an object in a [`Runtime`] heap and
//! is referred to through a copyable [`Value`] handle. Types are objects too,
//! operators dispatch through dunder members, errors are exception objects and
//! iteration runs on resumable generators.
pub mod builtins;
mod runtime;

pub use builtins::BuiltinFunction;
pub use runtime::config::RuntimeConfig;
pub use runtime::console::{BufferConsole, Console, StdConsole};
pub use runtime::context::{BuiltinTypes, Runtime};
pub use runtime::error::{RtResult, RuntimeError};
pub use runtime::exception::ExceptionKind;
pub use runtime::iteration::{Coroutine, Resume};
pub use runtime::operator::BinaryOp;
pub use runtime::value::Value;
