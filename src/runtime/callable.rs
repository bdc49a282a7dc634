//! Callable objects and the generic call path.
//!
//! Functions wrap a native closure. The execution engine registers compiled
//! function bodies the same way, so the runtime never needs to know how a
//! body runs. Everything that is not a function is called through the
//! `__call__` member of its type.

use std::fmt;
use std::ops::RangeInclusive;
use std::rc::Rc;

use crate::runtime::context::Runtime;
use crate::runtime::error::{RtResult, RuntimeError};
use crate::runtime::object::{Object, ObjectKind};
use crate::runtime::value::Value;

pub type NativeFn = Rc<dyn Fn(&mut Runtime, &[Value]) -> RtResult<Value>>;

#[derive(Clone)]
pub(crate) struct NativeFunction {
    pub(crate) name: Rc<str>,
    pub(crate) func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// A type member pre-filled with the receiver it was resolved through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BoundMethod {
    pub(crate) receiver: Value,
    pub(crate) function: Value,
}

impl Runtime {
    pub fn new_function<F>(&mut self, name: &str, func: F) -> Value
    where
        F: Fn(&mut Runtime, &[Value]) -> RtResult<Value> + 'static,
    {
        let function = NativeFunction {
            name: name.into(),
            func: Rc::new(func),
        };
        self.heap.alloc(Object::new(
            ObjectKind::Function(function),
            self.types.function,
        ))
    }

    /// Installs a native function as a member of `ty`.
    pub(crate) fn define_native<F>(&mut self, ty: Value, name: &str, func: F) -> Value
    where
        F: Fn(&mut Runtime, &[Value]) -> RtResult<Value> + 'static,
    {
        let qualified = format!("{}.{name}", self.type_name(ty));
        let function = self.new_function(&qualified, func);
        self.heap.get_mut(ty).attributes.insert(name, function);
        function
    }

    pub fn is_callable(&self, value: Value) -> bool {
        match self.heap.get(value).kind {
            ObjectKind::Function(_) | ObjectKind::BoundMethod(_) => true,
            _ => self.lookup_member(self.type_of(value), "__call__").is_some(),
        }
    }

    /// Invokes `callee` with `args`.
    ///
    /// Calls nest at most `max_call_depth` deep; the limit turns runaway
    /// recursion into an error instead of exhausting the native stack.
    pub fn call(&mut self, callee: Value, args: &[Value]) -> RtResult<Value> {
        let limit = self.config.max_call_depth;
        if self.call_depth >= limit {
            return Err(RuntimeError::CallDepthExceeded { limit });
        }
        self.call_depth += 1;
        let result = self.dispatch_call(callee, args);
        self.call_depth -= 1;
        result
    }

    fn dispatch_call(&mut self, callee: Value, args: &[Value]) -> RtResult<Value> {
        match &self.heap.get(callee).kind {
            ObjectKind::Function(function) => {
                let func = function.func.clone();
                func(self, args)
            }
            ObjectKind::BoundMethod(bound) => {
                let BoundMethod { receiver, function } = *bound;
                self.call(function, &prepend(receiver, args))
            }
            _ => {
                let ty = self.type_of(callee);
                let Some(hook) = self.lookup_member(ty, "__call__") else {
                    return Err(self.type_error("Call to uncallable object"));
                };
                self.call(hook, &prepend(callee, args))
            }
        }
    }

    /// Resolves `name` on `receiver` and calls the result.
    pub fn call_method(&mut self, receiver: Value, name: &str, args: &[Value]) -> RtResult<Value> {
        let method = self.get_attribute(receiver, name)?;
        self.call(method, args)
    }

    /// Raises `TypeError` unless `args.len()` lies within `arity`.
    pub(crate) fn expect_args(
        &mut self,
        name: &str,
        args: &[Value],
        arity: RangeInclusive<usize>,
    ) -> RtResult<()> {
        if arity.contains(&args.len()) {
            return Ok(());
        }
        let expected = if arity.start() == arity.end() {
            arity.start().to_string()
        } else {
            format!("{} to {}", arity.start(), arity.end())
        };
        Err(self.type_error(format!(
            "`{name}` expected {expected} arguments, got {}",
            args.len()
        )))
    }

    pub(crate) fn function_name(&self, value: Value) -> Option<Rc<str>> {
        match &self.heap.get(value).kind {
            ObjectKind::Function(function) => Some(function.name.clone()),
            ObjectKind::BoundMethod(bound) => self.function_name(bound.function),
            _ => None,
        }
    }
}

pub(crate) fn prepend(first: Value, rest: &[Value]) -> Vec<Value> {
    let mut args = Vec::with_capacity(rest.len() + 1);
    args.push(first);
    args.extend_from_slice(rest);
    args
}

pub(crate) fn install(rt: &mut Runtime) {
    let function = rt.types.function;
    rt.define_native(function, "__new__", |rt, _args| {
        Err(rt.not_implemented_error("functions are created by the execution engine"))
    });
    rt.define_native(function, "__call__", |rt, args| {
        let Some((&callee, rest)) = args.split_first() else {
            return Err(rt.type_error("`function.__call__` needs a receiver"));
        };
        rt.call(callee, rest)
    });
    rt.define_native(function, "__repr__", |rt, args| {
        rt.expect_args("function.__repr__", args, 1..=1)?;
        let rendered = match &rt.heap.get(args[0]).kind {
            ObjectKind::BoundMethod(bound) => {
                let name = rt.function_name(bound.function).unwrap_or_else(|| "?".into());
                format!("<bound method {name}>")
            }
            _ => match rt.function_name(args[0]) {
                Some(name) => format!("<function {name}>"),
                None => "<function>".to_string(),
            },
        };
        Ok(rt.new_str(&rendered))
    });
}
