//! Types, instances and attribute resolution.
//!
//! A type is an ordinary object whose attribute map holds its members and
//! whose `base` links to the single type it derives from. Member tables stay
//! mutable after definition, so every lookup walks the chain at call time.

use std::rc::Rc;

use tracing::debug;

use crate::runtime::callable::prepend;
use crate::runtime::context::Runtime;
use crate::runtime::dict::OrderedDict;
use crate::runtime::error::{RtResult, RuntimeError};
use crate::runtime::object::{Object, ObjectKind, TypeObject};
use crate::runtime::value::Value;

impl Runtime {
    pub fn type_of(&self, value: Value) -> Value {
        self.heap.get(value).ty
    }

    pub fn base_of(&self, ty: Value) -> Option<Value> {
        self.heap.get(ty).base
    }

    pub fn is_type(&self, value: Value) -> bool {
        matches!(self.heap.get(value).kind, ObjectKind::Type(_))
    }

    /// Name of `value` when it is a type, otherwise the name of its type.
    pub fn type_name(&self, value: Value) -> Rc<str> {
        match &self.heap.get(value).kind {
            ObjectKind::Type(ty) => ty.name.clone(),
            _ => self.type_name(self.type_of(value)),
        }
    }

    /// `value` followed by every base it derives from.
    ///
    /// Bases only ever point at types that already existed when the derived
    /// type was created, so the walk always terminates.
    pub(crate) fn base_chain(&self, value: Value) -> impl Iterator<Item = Value> + '_ {
        std::iter::successors(Some(value), move |&current| self.heap.get(current).base)
    }

    /// Finds `name` in the attribute maps along `ty`'s base chain.
    ///
    /// The member is returned as stored; nothing is bound.
    pub fn lookup_member(&self, ty: Value, name: &str) -> Option<Value> {
        self.base_chain(ty)
            .find_map(|link| self.heap.get(link).attributes.get(name))
    }

    pub fn is_subtype(&self, ty: Value, base: Value) -> bool {
        self.base_chain(ty).any(|link| link == base)
    }

    pub fn is_instance_of(&self, value: Value, ty: Value) -> bool {
        self.is_subtype(self.type_of(value), ty)
    }

    /// Resolves `name` on `value`; `None` on a miss.
    ///
    /// The object's own map (and base chain) wins over members of its type.
    /// Plain functions found on the type are bound to `value`.
    pub fn get_attribute_or(&mut self, value: Value, name: &str) -> Option<Value> {
        if let Some(found) = self.lookup_member(value, name) {
            return Some(found);
        }
        let member = self.lookup_member(self.type_of(value), name)?;
        if matches!(self.heap.get(member).kind, ObjectKind::Function(_)) {
            return Some(self.bind(value, member));
        }
        Some(member)
    }

    pub fn get_attribute(&mut self, value: Value, name: &str) -> RtResult<Value> {
        match self.get_attribute_or(value, name) {
            Some(found) => Ok(found),
            None => Err(self.attribute_error(name)),
        }
    }

    pub fn get_attribute_default(&mut self, value: Value, name: &str, default: Value) -> Value {
        self.get_attribute_or(value, name).unwrap_or(default)
    }

    pub fn set_attribute(&mut self, value: Value, name: &str, attribute: Value) {
        self.setattr_raw(value, name, attribute);
    }

    pub fn del_attribute(&mut self, value: Value, name: &str) -> RtResult<()> {
        match self.delattr_raw(value, name) {
            Some(_) => Ok(()),
            None => Err(self.attribute_error(name)),
        }
    }

    /// Creates a new type deriving from `base` (`object` when absent).
    ///
    /// `members` seed the type's attribute map; `__name__` is always set.
    pub fn define_type(
        &mut self,
        name: &str,
        base: Option<Value>,
        members: &[(&str, Value)],
    ) -> RtResult<Value> {
        let base = base.unwrap_or(self.types.object);
        if !self.is_type(base) {
            let got = self.type_name(base);
            return Err(self.type_error(format!("base must be a type, not {got}")));
        }
        let limit = self.config.max_base_chain;
        if self.base_chain(base).count() >= limit {
            return Err(RuntimeError::BaseChainTooDeep {
                type_name: name.to_string(),
                limit,
            });
        }

        let mut attributes: OrderedDict = members.iter().copied().collect();
        let name_value = self.new_str(name);
        attributes.insert("__name__", name_value);
        let ty = self.heap.alloc(
            Object::new(
                ObjectKind::Type(TypeObject { name: name.into() }),
                self.types.type_,
            )
            .with_base(Some(base))
            .with_attributes(attributes),
        );
        debug!(name, base = %self.type_name(base), "type defined");
        Ok(ty)
    }

    /// Two-phase construction: `__new__` allocates, `__init__` initializes.
    ///
    /// `__new__` is resolved on `ty` itself; `__init__` on the type of
    /// whatever `__new__` returned, and its result is discarded.
    pub fn instantiate(&mut self, ty: Value, args: &[Value]) -> RtResult<Value> {
        if !self.is_type(ty) {
            let got = self.type_name(ty);
            return Err(self.type_error(format!("cannot instantiate a {got} object")));
        }
        let Some(new) = self.lookup_member(ty, "__new__") else {
            let name = self.type_name(ty);
            return Err(self.type_error(format!("cannot create '{name}' instances")));
        };
        let object = self.call(new, &prepend(ty, args))?;
        if let Some(init) = self.lookup_member(self.type_of(object), "__init__") {
            self.call(init, &prepend(object, args))?;
        }
        Ok(object)
    }
}

pub(crate) fn install(rt: &mut Runtime) {
    install_object(rt);
    install_type(rt);
}

fn install_object(rt: &mut Runtime) {
    let object = rt.types.object;
    rt.define_native(object, "__new__", |rt, args| {
        let Some(&cls) = args.first() else {
            return Err(rt.type_error("`object.__new__` needs a type"));
        };
        if !rt.is_type(cls) {
            return Err(rt.type_error("`object.__new__` needs a type"));
        }
        Ok(rt.obj_new(None, cls, OrderedDict::default()))
    });
    rt.define_native(object, "__init__", |rt, _args| Ok(rt.none()));
    rt.define_native(object, "__repr__", |rt, args| {
        rt.expect_args("object.__repr__", args, 1..=1)?;
        let name = rt.type_name(rt.type_of(args[0]));
        Ok(rt.new_str(&format!("<{name} object>")))
    });
    rt.define_native(object, "__str__", |rt, args| {
        rt.expect_args("object.__str__", args, 1..=1)?;
        let rendered = rt.repr(args[0])?;
        Ok(rt.new_str(&rendered))
    });
    rt.define_native(object, "__eq__", |rt, args| {
        rt.expect_args("object.__eq__", args, 2..=2)?;
        if args[0] == args[1] {
            Ok(rt.true_value())
        } else {
            Ok(rt.not_implemented())
        }
    });
    rt.define_native(object, "__ne__", |rt, args| {
        rt.expect_args("object.__ne__", args, 2..=2)?;
        if args[0] == args[1] {
            Ok(rt.false_value())
        } else {
            Ok(rt.not_implemented())
        }
    });
}

fn install_type(rt: &mut Runtime) {
    let type_ = rt.types.type_;
    rt.define_native(type_, "__call__", |rt, args| {
        let Some((&cls, rest)) = args.split_first() else {
            return Err(rt.type_error("`type.__call__` needs a receiver"));
        };
        if cls == rt.types.type_ && rest.len() == 1 {
            return Ok(rt.type_of(rest[0]));
        }
        rt.instantiate(cls, rest)
    });
    // `type(name, base, members)` defines a new type at run time.
    rt.define_native(type_, "__new__", |rt, args| {
        rt.expect_args("type.__new__", args, 4..=4)?;
        let Some(name) = rt.str_value(args[1]) else {
            return Err(rt.type_error("type name must be a str"));
        };
        let base = if rt.is_none(args[2]) {
            None
        } else {
            Some(args[2])
        };
        let members: Vec<(Rc<str>, Value)> = match rt.dict_storage(args[3]) {
            Some(entries) => entries.iter().map(|(key, value)| (key.clone(), value)).collect(),
            None => return Err(rt.type_error("type members must be a dict")),
        };
        let members: Vec<(&str, Value)> = members.iter().map(|(key, value)| (&**key, *value)).collect();
        rt.define_type(&name, base, &members)
    });
    rt.define_native(type_, "__init__", |rt, _args| Ok(rt.none()));
    for name in ["__repr__", "__str__"] {
        rt.define_native(type_, name, |rt, args| {
            rt.expect_args("type.__repr__", args, 1..=1)?;
            let name = rt.type_name(args[0]);
            Ok(rt.new_str(&format!("<class '{name}'>")))
        });
    }
}
