//! The `Runtime` context and its bootstrap.
//!
//! Bootstrap order matters: the root `type` object is allocated with a
//! dangling type reference and patched to itself, then `object`, then every
//! other builtin type, the singletons, the `__name__` of each type, the
//! members of each builtin type and finally the global namespace.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::runtime::config::RuntimeConfig;
use crate::runtime::console::{Console, StdConsole};
use crate::runtime::dict::OrderedDict;
use crate::runtime::error::RtResult;
use crate::runtime::object::{Heap, Object, ObjectKind, TypeObject};
use crate::runtime::value::Value;
use crate::runtime::{
    callable, class, dict, exception, execution, int, iteration, list, none, range, string, tuple,
};

/// Handles of the builtin types.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTypes {
    pub object: Value,
    pub type_: Value,
    pub none: Value,
    pub not_implemented: Value,
    pub bool: Value,
    pub int: Value,
    pub str: Value,
    pub tuple: Value,
    pub dict: Value,
    pub list: Value,
    pub range: Value,
    pub function: Value,
    pub generator: Value,
    pub exception: Value,
    pub attribute_error: Value,
    pub index_error: Value,
    pub key_error: Value,
    pub name_error: Value,
    pub not_implemented_error: Value,
    pub stop_iteration: Value,
    pub type_error: Value,
    pub value_error: Value,
}

impl BuiltinTypes {
    pub(crate) fn all(&self) -> [Value; 22] {
        [
            self.object,
            self.type_,
            self.none,
            self.not_implemented,
            self.bool,
            self.int,
            self.str,
            self.tuple,
            self.dict,
            self.list,
            self.range,
            self.function,
            self.generator,
            self.exception,
            self.attribute_error,
            self.index_error,
            self.key_error,
            self.name_error,
            self.not_implemented_error,
            self.stop_iteration,
            self.type_error,
            self.value_error,
        ]
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Singletons {
    pub(crate) none: Value,
    pub(crate) not_implemented: Value,
    pub(crate) true_value: Value,
    pub(crate) false_value: Value,
}

pub struct Runtime {
    pub(crate) heap: Heap,
    pub(crate) types: BuiltinTypes,
    pub(crate) consts: Singletons,
    pub(crate) globals: OrderedDict,
    pub(crate) pins: FxHashMap<Value, usize>,
    pub(crate) console: Box<dyn Console>,
    pub(crate) config: RuntimeConfig,
    pub(crate) call_depth: usize,
}

impl Runtime {
    /// A runtime with default limits, wired to the process standard streams.
    pub fn new() -> Self {
        Self::bootstrap(RuntimeConfig::default(), Box::new(StdConsole))
    }

    pub fn with_config(config: RuntimeConfig, console: Box<dyn Console>) -> RtResult<Self> {
        config.validate()?;
        Ok(Self::bootstrap(config, console))
    }

    pub fn with_console(console: Box<dyn Console>) -> Self {
        Self::bootstrap(RuntimeConfig::default(), console)
    }

    fn bootstrap(config: RuntimeConfig, console: Box<dyn Console>) -> Self {
        let mut heap = Heap::default();
        let type_ = heap.alloc(type_object("type", Value::DANGLING, None));
        heap.patch_type(type_, type_);
        let object = heap.alloc(type_object("object", type_, None));
        heap.get_mut(type_).base = Some(object);

        let mut derive = |name: &str, base: Value| heap.alloc(type_object(name, type_, Some(base)));
        let none = derive("NoneType", object);
        let not_implemented = derive("NotImplementedType", object);
        let int = derive("int", object);
        let bool_ = derive("bool", object);
        let str_ = derive("str", object);
        let tuple_ = derive("tuple", object);
        let dict_ = derive("dict", object);
        let list_ = derive("list", object);
        let range_ = derive("range", object);
        let function = derive("function", object);
        let generator = derive("generator", object);
        let exception_ = derive("Exception", object);
        let types = BuiltinTypes {
            object,
            type_,
            none,
            not_implemented,
            bool: bool_,
            int,
            str: str_,
            tuple: tuple_,
            dict: dict_,
            list: list_,
            range: range_,
            function,
            generator,
            exception: exception_,
            attribute_error: derive("AttributeError", exception_),
            index_error: derive("IndexError", exception_),
            key_error: derive("KeyError", exception_),
            name_error: derive("NameError", exception_),
            not_implemented_error: derive("NotImplementedError", exception_),
            stop_iteration: derive("StopIteration", exception_),
            type_error: derive("TypeError", exception_),
            value_error: derive("ValueError", exception_),
        };

        let consts = Singletons {
            none: heap.alloc(Object::new(ObjectKind::None, none)),
            not_implemented: heap.alloc(Object::new(ObjectKind::NotImplemented, not_implemented)),
            true_value: heap.alloc(Object::new(ObjectKind::Bool(true), bool_)),
            false_value: heap.alloc(Object::new(ObjectKind::Bool(false), bool_)),
        };

        let mut rt = Self {
            heap,
            types,
            consts,
            globals: OrderedDict::default(),
            pins: FxHashMap::default(),
            console,
            config,
            call_depth: 0,
        };
        rt.name_builtin_types();
        class::install(&mut rt);
        callable::install(&mut rt);
        none::install(&mut rt);
        int::install(&mut rt);
        crate::runtime::bool::install(&mut rt);
        string::install(&mut rt);
        tuple::install(&mut rt);
        dict::install(&mut rt);
        list::install(&mut rt);
        range::install(&mut rt);
        iteration::install(&mut rt);
        exception::install(&mut rt);
        execution::seed_builtin_globals(&mut rt);
        debug!(objects = rt.heap.len(), "runtime bootstrapped");
        rt
    }

    fn name_builtin_types(&mut self) {
        let types: Vec<Value> = self
            .heap
            .handles()
            .filter(|&value| matches!(self.heap.get(value).kind, ObjectKind::Type(_)))
            .collect();
        for ty in types {
            let name = self.type_name(ty);
            let name = self.new_str(&name);
            self.setattr_raw(ty, "__name__", name);
        }
    }

    pub fn types(&self) -> &BuiltinTypes {
        &self.types
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn none(&self) -> Value {
        self.consts.none
    }

    pub fn not_implemented(&self) -> Value {
        self.consts.not_implemented
    }

    pub fn true_value(&self) -> Value {
        self.consts.true_value
    }

    pub fn false_value(&self) -> Value {
        self.consts.false_value
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.heap.len()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

fn type_object(name: &str, ty: Value, base: Option<Value>) -> Object {
    Object::new(ObjectKind::Type(TypeObject { name: name.into() }), ty).with_base(base)
}

#[cfg(test)]
mod tests {
    use super::Runtime;
    use crate::runtime::config::RuntimeConfig;
    use crate::runtime::console::BufferConsole;
    use crate::runtime::error::RuntimeError;

    #[test]
    fn type_is_its_own_type_and_derives_from_object() {
        let rt = Runtime::new();
        let types = *rt.types();
        assert_eq!(rt.type_of(types.type_), types.type_);
        assert_eq!(rt.base_of(types.type_), Some(types.object));
        assert_eq!(rt.base_of(types.object), None);
        assert_eq!(rt.type_of(types.object), types.type_);
        assert_eq!(rt.base_of(types.bool), Some(types.object));
        assert_eq!(rt.base_of(types.stop_iteration), Some(types.exception));
    }

    #[test]
    fn builtin_types_carry_their_names() {
        let rt = Runtime::new();
        let types = *rt.types();
        let name = rt.getattr_raw(types.int, "__name__").expect("int is named");
        assert_eq!(rt.str_value(name).as_deref(), Some("int"));
        assert_eq!(&*rt.type_name(types.type_error), "TypeError");
    }

    #[test]
    fn singletons_have_their_own_types() {
        let rt = Runtime::new();
        let types = *rt.types();
        assert_eq!(rt.type_of(rt.none()), types.none);
        assert_eq!(rt.type_of(rt.true_value()), types.bool);
        assert_eq!(rt.type_of(rt.not_implemented()), types.not_implemented);
        assert_ne!(rt.true_value(), rt.false_value());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = RuntimeConfig {
            max_call_depth: 0,
            ..RuntimeConfig::default()
        };
        let result = Runtime::with_config(config, Box::new(BufferConsole::default()));
        assert!(matches!(result, Err(RuntimeError::Config { .. })));
    }
}
