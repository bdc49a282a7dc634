//! Builtin exception hierarchy.
//!
//! Exception types are ordinary types deriving from `Exception`; kinds are
//! told apart purely by type identity. Raising produces
//! `RuntimeError::Raised`, which carries the exception value together with
//! its rendered `Name: message` text for hosts that only want to report it.

use std::fmt;

use tracing::debug;

use crate::runtime::context::{BuiltinTypes, Runtime};
use crate::runtime::dict::{OrderedDict, quote_text};
use crate::runtime::error::RuntimeError;
use crate::runtime::object::ObjectKind;
use crate::runtime::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    Exception,
    AttributeError,
    IndexError,
    KeyError,
    NameError,
    NotImplementedError,
    StopIteration,
    TypeError,
    ValueError,
}

impl ExceptionKind {
    pub const ALL: [Self; 9] = [
        Self::Exception,
        Self::AttributeError,
        Self::IndexError,
        Self::KeyError,
        Self::NameError,
        Self::NotImplementedError,
        Self::StopIteration,
        Self::TypeError,
        Self::ValueError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Exception => "Exception",
            Self::AttributeError => "AttributeError",
            Self::IndexError => "IndexError",
            Self::KeyError => "KeyError",
            Self::NameError => "NameError",
            Self::NotImplementedError => "NotImplementedError",
            Self::StopIteration => "StopIteration",
            Self::TypeError => "TypeError",
            Self::ValueError => "ValueError",
        }
    }

    pub fn type_in(self, types: &BuiltinTypes) -> Value {
        match self {
            Self::Exception => types.exception,
            Self::AttributeError => types.attribute_error,
            Self::IndexError => types.index_error,
            Self::KeyError => types.key_error,
            Self::NameError => types.name_error,
            Self::NotImplementedError => types.not_implemented_error,
            Self::StopIteration => types.stop_iteration,
            Self::TypeError => types.type_error,
            Self::ValueError => types.value_error,
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Runtime {
    /// Constructs an exception of `kind` from `args`, ready to be returned
    /// as an `Err`.
    ///
    /// The exception is built and rendered without dispatching to any
    /// member, so raising never fails and still works once the call depth
    /// limit is reached.
    pub fn raise(&mut self, kind: ExceptionKind, args: &[Value]) -> RuntimeError {
        let ty = kind.type_in(&self.types);
        let exception = self.obj_new(None, ty, OrderedDict::default());
        store_args(self, exception, args);
        if kind == ExceptionKind::StopIteration {
            store_stop_value(self, exception, args);
        }
        let message = self.plain_message(args);
        RuntimeError::Raised {
            exception,
            rendered: render(kind.name(), &message),
        }
    }

    /// Wraps an already constructed exception value.
    ///
    /// The message comes from the exception's `__str__`. When that fails the
    /// stored `args` are rendered natively instead.
    pub fn raise_value(&mut self, exception: Value) -> RuntimeError {
        let name = self.type_name(self.type_of(exception));
        let message = match self.to_text(exception) {
            Ok(message) => message,
            Err(error) => {
                debug!(%error, exception = %name, "`__str__` failed, rendering stored args");
                let items = self.exception_args(exception);
                self.plain_message(&items)
            }
        };
        RuntimeError::Raised {
            exception,
            rendered: render(&name, &message),
        }
    }

    /// `Exception.__str__` for primitive arguments, computed without calls.
    fn plain_message(&self, items: &[Value]) -> String {
        match items {
            [] => String::new(),
            [only] => match &self.heap.get(*only).kind {
                ObjectKind::Str(text) => text.to_string(),
                _ => self.plain_repr(*only),
            },
            _ => {
                let rendered: Vec<String> = items.iter().map(|&item| self.plain_repr(item)).collect();
                format!("({})", rendered.join(", "))
            }
        }
    }

    fn plain_repr(&self, value: Value) -> String {
        match &self.heap.get(value).kind {
            ObjectKind::Str(text) => quote_text(text),
            ObjectKind::Int(number) => number.to_string(),
            ObjectKind::Bool(true) => "True".to_string(),
            ObjectKind::Bool(false) => "False".to_string(),
            ObjectKind::None => "None".to_string(),
            ObjectKind::NotImplemented => "NotImplemented".to_string(),
            _ => format!("<{} object>", self.type_name(value)),
        }
    }

    fn raise_with_message(&mut self, kind: ExceptionKind, message: String) -> RuntimeError {
        let message = self.new_str(&message);
        self.raise(kind, &[message])
    }

    pub fn type_error(&mut self, message: impl Into<String>) -> RuntimeError {
        self.raise_with_message(ExceptionKind::TypeError, message.into())
    }

    pub fn value_error(&mut self, message: impl Into<String>) -> RuntimeError {
        self.raise_with_message(ExceptionKind::ValueError, message.into())
    }

    pub fn key_error(&mut self, message: impl Into<String>) -> RuntimeError {
        self.raise_with_message(ExceptionKind::KeyError, message.into())
    }

    pub fn index_error(&mut self, message: impl Into<String>) -> RuntimeError {
        self.raise_with_message(ExceptionKind::IndexError, message.into())
    }

    pub fn name_error(&mut self, name: &str) -> RuntimeError {
        self.raise_with_message(ExceptionKind::NameError, name.to_string())
    }

    pub fn attribute_error(&mut self, name: &str) -> RuntimeError {
        self.raise_with_message(ExceptionKind::AttributeError, name.to_string())
    }

    pub fn not_implemented_error(&mut self, message: impl Into<String>) -> RuntimeError {
        self.raise_with_message(ExceptionKind::NotImplementedError, message.into())
    }

    /// `StopIteration()` or `StopIteration(value)`.
    pub fn stop_iteration(&mut self, value: Option<Value>) -> RuntimeError {
        match value {
            Some(value) => self.raise(ExceptionKind::StopIteration, &[value]),
            None => self.raise(ExceptionKind::StopIteration, &[]),
        }
    }

    /// Whether `error` is a raised exception that is an instance of `ty`.
    pub fn is_exception(&self, error: &RuntimeError, ty: Value) -> bool {
        error
            .exception()
            .is_some_and(|exception| self.is_instance_of(exception, ty))
    }

    pub fn is_stop_iteration(&self, error: &RuntimeError) -> bool {
        self.is_exception(error, self.types.stop_iteration)
    }

    /// The `args` tuple an exception was constructed with.
    pub fn exception_args(&self, exception: Value) -> Vec<Value> {
        self.getattr_raw(exception, "args")
            .and_then(|args| self.tuple_items(args))
            .map(|items| items.to_vec())
            .unwrap_or_default()
    }
}

pub(crate) fn install(rt: &mut Runtime) {
    let exception = rt.types.exception;
    rt.define_native(exception, "__init__", |rt, args| {
        let Some((&receiver, rest)) = args.split_first() else {
            return Err(rt.type_error("`Exception.__init__` needs a receiver"));
        };
        store_args(rt, receiver, rest);
        Ok(rt.none())
    });
    rt.define_native(exception, "__str__", |rt, args| {
        rt.expect_args("Exception.__str__", args, 1..=1)?;
        let items = rt.exception_args(args[0]);
        let rendered = match items.as_slice() {
            [] => String::new(),
            [only] => rt.to_text(*only)?,
            _ => {
                let tuple = rt.new_tuple(items);
                rt.repr(tuple)?
            }
        };
        Ok(rt.new_str(&rendered))
    });
    rt.define_native(exception, "__repr__", |rt, args| {
        rt.expect_args("Exception.__repr__", args, 1..=1)?;
        let name = rt.type_name(rt.type_of(args[0]));
        let mut rendered = Vec::new();
        for item in rt.exception_args(args[0]) {
            rendered.push(rt.repr(item)?);
        }
        Ok(rt.new_str(&format!("{name}({})", rendered.join(", "))))
    });

    let stop_iteration = rt.types.stop_iteration;
    rt.define_native(stop_iteration, "__init__", |rt, args| {
        let Some((&receiver, rest)) = args.split_first() else {
            return Err(rt.type_error("`StopIteration.__init__` needs a receiver"));
        };
        store_args(rt, receiver, rest);
        store_stop_value(rt, receiver, rest);
        Ok(rt.none())
    });
}

fn store_args(rt: &mut Runtime, exception: Value, args: &[Value]) {
    let tuple = rt.new_tuple(args.to_vec());
    rt.set_attribute(exception, "args", tuple);
}

fn store_stop_value(rt: &mut Runtime, exception: Value, args: &[Value]) {
    let value = args.first().copied().unwrap_or(rt.none());
    rt.set_attribute(exception, "value", value);
}

fn render(name: &str, message: &str) -> String {
    if message.is_empty() {
        name.to_string()
    } else {
        format!("{name}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::ExceptionKind;
    use crate::runtime::config::RuntimeConfig;
    use crate::runtime::console::BufferConsole;
    use crate::runtime::context::Runtime;
    use crate::runtime::error::RuntimeError;

    #[test]
    fn renders_name_and_message() {
        let mut rt = Runtime::new();
        let error = rt.value_error("bad value");
        assert_eq!(error.to_string(), "ValueError: bad value");
        let error = rt.stop_iteration(None);
        assert_eq!(error.to_string(), "StopIteration");
        assert!(rt.is_stop_iteration(&error));
    }

    #[test]
    fn kinds_match_by_type_identity_and_share_the_root() {
        let mut rt = Runtime::new();
        let error = rt.key_error("'k'");
        let types = *rt.types();
        assert!(rt.is_exception(&error, types.key_error));
        assert!(rt.is_exception(&error, types.exception));
        assert!(!rt.is_exception(&error, types.value_error));
        assert!(!rt.is_exception(&RuntimeError::CallDepthExceeded { limit: 1 }, types.exception));
        for kind in ExceptionKind::ALL {
            let ty = kind.type_in(&types);
            assert_eq!(&*rt.type_name(ty), kind.name());
            assert!(rt.is_subtype(ty, types.exception));
        }
    }

    #[test]
    fn str_and_repr_follow_argument_count() {
        let mut rt = Runtime::new();
        let (one, two) = (rt.new_int(1), rt.new_str("two"));
        let none_args = rt.raise(ExceptionKind::Exception, &[]);
        let one_arg = rt.raise(ExceptionKind::Exception, &[one]);
        let two_args = rt.raise(ExceptionKind::TypeError, &[one, two]);
        let values: Vec<_> = [&none_args, &one_arg, &two_args]
            .iter()
            .map(|error| error.exception().expect("raised"))
            .collect();
        assert_eq!(rt.to_text(values[0]).expect("str"), "");
        assert_eq!(rt.to_text(values[1]).expect("str"), "1");
        assert_eq!(rt.to_text(values[2]).expect("str"), "(1, 'two')");
        assert_eq!(rt.repr(values[2]).expect("repr"), "TypeError(1, 'two')");
        assert_eq!(rt.repr(values[0]).expect("repr"), "Exception()");
        assert_eq!(two_args.to_string(), "TypeError: (1, 'two')");
    }

    #[test]
    fn stop_iteration_exposes_its_value() {
        let mut rt = Runtime::new();
        let seven = rt.new_int(7);
        let error = rt.stop_iteration(Some(seven));
        let exception = error.exception().expect("raised");
        assert_eq!(rt.get_attribute(exception, "value").expect("value"), seven);
        let error = rt.stop_iteration(None);
        let exception = error.exception().expect("raised");
        assert_eq!(rt.get_attribute(exception, "value").expect("value"), rt.none());
    }

    #[test]
    fn exception_types_are_constructible_like_any_type() {
        let mut rt = Runtime::new();
        let name_error = rt.types().name_error;
        let message = rt.new_str("x");
        let exception = rt.call(name_error, &[message]).expect("NameError('x')");
        assert!(rt.is_instance_of(exception, rt.types().exception));
        assert_eq!(rt.exception_args(exception), vec![message]);
        assert_eq!(rt.raise_value(exception).to_string(), "NameError: x");
    }

    #[test]
    fn raising_at_the_call_depth_limit_keeps_the_exception_kind() {
        let config = RuntimeConfig {
            max_call_depth: 8,
            ..RuntimeConfig::default()
        };
        let mut rt = Runtime::with_config(config, Box::new(BufferConsole::default()))
            .expect("valid config");
        let recurse = rt.new_function("recurse", |rt, args| match rt.call(args[0], args) {
            Err(RuntimeError::CallDepthExceeded { .. }) => Err(rt.type_error("too deep")),
            other => other,
        });
        let error = rt.call(recurse, &[recurse]).expect_err("must fail");
        assert!(rt.is_exception(&error, rt.types().type_error));
        assert_eq!(error.to_string(), "TypeError: too deep");
    }

    #[test]
    fn failing_str_falls_back_to_the_stored_args() {
        let mut rt = Runtime::new();
        let broken_str = rt.new_function("Broken.__str__", |rt, _args| Err(rt.value_error("no text")));
        let exception_type = rt.types().exception;
        let broken = rt
            .define_type("Broken", Some(exception_type), &[("__str__", broken_str)])
            .expect("Broken");
        let (message, code) = (rt.new_str("disk full"), rt.new_int(28));
        let single = rt.instantiate(broken, &[message]).expect("Broken('disk full')");
        assert_eq!(rt.raise_value(single).to_string(), "Broken: disk full");
        let pair = rt.instantiate(broken, &[message, code]).expect("Broken('disk full', 28)");
        assert_eq!(rt.raise_value(pair).to_string(), "Broken: ('disk full', 28)");
    }
}
