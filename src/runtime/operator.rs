//! Operator dispatch and the value protocols built on it.
//!
//! A binary operator first tries the forward hook on the left operand's type,
//! then the reflected hook on the right operand's type. A hook declines by
//! returning the `NotImplemented` sentinel.

use std::fmt;

use tracing::trace;

use crate::runtime::context::Runtime;
use crate::runtime::error::RtResult;
use crate::runtime::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    Mod,
    Pow,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }

    /// Forward and reflected hook names.
    pub fn hooks(self) -> (&'static str, &'static str) {
        match self {
            Self::Add => ("__add__", "__radd__"),
            Self::Sub => ("__sub__", "__rsub__"),
            Self::Mul => ("__mul__", "__rmul__"),
            Self::FloorDiv => ("__floordiv__", "__rfloordiv__"),
            Self::Mod => ("__mod__", "__rmod__"),
            Self::Pow => ("__pow__", "__rpow__"),
            Self::Lt => ("__lt__", "__gt__"),
            Self::Gt => ("__gt__", "__lt__"),
            Self::Le => ("__le__", "__ge__"),
            Self::Ge => ("__ge__", "__le__"),
            Self::Eq => ("__eq__", "__eq__"),
            Self::Ne => ("__ne__", "__ne__"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Runtime {
    pub fn binary_op(&mut self, op: BinaryOp, left: Value, right: Value) -> RtResult<Value> {
        if let Some(result) = self.try_hooks(op.hooks(), left, right)? {
            return Ok(result);
        }
        match op {
            BinaryOp::Eq => {
                trace!("`==` falling back to identity");
                Ok(self.new_bool(left == right))
            }
            BinaryOp::Ne => {
                let equal = self.binary_op(BinaryOp::Eq, left, right)?;
                let equal = self.truthy(equal)?;
                Ok(self.new_bool(!equal))
            }
            BinaryOp::FloorDiv | BinaryOp::Mod => {
                let Some(pair) = self.try_hooks(("__divmod__", "__rdivmod__"), left, right)? else {
                    return Err(self.type_error(format!("`{op}` is not implemented")));
                };
                trace!(%op, "falling back to divmod");
                let component = self.new_int(if op == BinaryOp::FloorDiv { 0 } else { 1 });
                self.get_item(pair, component)
            }
            _ => Err(self.type_error(format!("`{op}` is not implemented"))),
        }
    }

    fn try_hooks(
        &mut self,
        (forward, reflected): (&str, &str),
        left: Value,
        right: Value,
    ) -> RtResult<Option<Value>> {
        let sentinel = self.not_implemented();
        if let Some(hook) = self.lookup_member(self.type_of(left), forward) {
            let result = self.call(hook, &[left, right])?;
            if result != sentinel {
                return Ok(Some(result));
            }
        }
        if let Some(hook) = self.lookup_member(self.type_of(right), reflected) {
            let result = self.call(hook, &[right, left])?;
            if result != sentinel {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// `==` reduced to a Rust `bool`.
    pub fn values_equal(&mut self, left: Value, right: Value) -> RtResult<bool> {
        let result = self.binary_op(BinaryOp::Eq, left, right)?;
        self.truthy(result)
    }

    pub fn negate(&mut self, value: Value) -> RtResult<Value> {
        if let Some(hook) = self.lookup_member(self.type_of(value), "__neg__") {
            let result = self.call(hook, &[value])?;
            if result != self.not_implemented() {
                return Ok(result);
            }
        }
        let name = self.type_name(self.type_of(value));
        Err(self.type_error(format!("bad operand type for unary -: '{name}'")))
    }

    /// `(x // y, x % y)`, preferring a `__divmod__` hook when one answers.
    pub fn divmod(&mut self, left: Value, right: Value) -> RtResult<Value> {
        if let Some(pair) = self.try_hooks(("__divmod__", "__rdivmod__"), left, right)? {
            return Ok(pair);
        }
        let quotient = self.binary_op(BinaryOp::FloorDiv, left, right)?;
        let remainder = self.binary_op(BinaryOp::Mod, left, right)?;
        Ok(self.new_tuple(vec![quotient, remainder]))
    }

    /// Truthiness: `__bool__` if the type has one, else a non-zero
    /// `__len__`, else true.
    pub fn truthy(&mut self, value: Value) -> RtResult<bool> {
        let ty = self.type_of(value);
        if let Some(hook) = self.lookup_member(ty, "__bool__") {
            let result = self.call(hook, &[value])?;
            return match self.bool_value(result) {
                Some(flag) => Ok(flag),
                None => Err(self.type_error("__bool__ should return bool")),
            };
        }
        if self.lookup_member(ty, "__len__").is_some() {
            return Ok(self.len(value)? != 0);
        }
        Ok(true)
    }

    pub fn logical_not(&mut self, value: Value) -> RtResult<Value> {
        let truth = self.truthy(value)?;
        Ok(self.new_bool(!truth))
    }

    pub fn len(&mut self, value: Value) -> RtResult<usize> {
        let Some(hook) = self.lookup_member(self.type_of(value), "__len__") else {
            let name = self.type_name(self.type_of(value));
            return Err(self.type_error(format!("object of type '{name}' has no len()")));
        };
        let result = self.call(hook, &[value])?;
        match self.int_value(result) {
            Some(len) if len >= 0 => Ok(len as usize),
            Some(_) => Err(self.value_error("__len__() should return >= 0")),
            None => Err(self.type_error("__len__ should return int")),
        }
    }

    pub fn repr(&mut self, value: Value) -> RtResult<String> {
        self.render_with(value, "__repr__")
    }

    /// `str(value)`.
    pub fn to_text(&mut self, value: Value) -> RtResult<String> {
        self.render_with(value, "__str__")
    }

    fn render_with(&mut self, value: Value, hook: &str) -> RtResult<String> {
        let Some(method) = self.lookup_member(self.type_of(value), hook) else {
            return Err(self.type_error(format!("object has no {hook}")));
        };
        let result = self.call(method, &[value])?;
        match self.str_value(result) {
            Some(text) => Ok(text.to_string()),
            None => Err(self.type_error(format!("{hook} returned non-string"))),
        }
    }

    /// `container[key]` through the container type's `__getitem__`.
    pub fn get_item(&mut self, container: Value, key: Value) -> RtResult<Value> {
        let Some(hook) = self.lookup_member(self.type_of(container), "__getitem__") else {
            let name = self.type_name(self.type_of(container));
            return Err(self.type_error(format!("'{name}' object is not subscriptable")));
        };
        self.call(hook, &[container, key])
    }

    pub fn set_item(&mut self, container: Value, key: Value, value: Value) -> RtResult<()> {
        let Some(hook) = self.lookup_member(self.type_of(container), "__setitem__") else {
            let name = self.type_name(self.type_of(container));
            return Err(self.type_error(format!(
                "'{name}' object does not support item assignment"
            )));
        };
        self.call(hook, &[container, key, value])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::BinaryOp;
    use crate::runtime::context::Runtime;
    use crate::runtime::iteration::Resume;

    #[test]
    fn uses_reflected_hook_when_forward_declines() {
        let mut rt = Runtime::new();
        let radd = rt.new_function("Meters.__radd__", |rt, _args| Ok(rt.new_str("reflected")));
        let meters = rt
            .define_type("Meters", None, &[("__radd__", radd)])
            .expect("Meters");
        let length = rt.instantiate(meters, &[]).expect("Meters()");
        let one = rt.new_int(1);
        let result = rt.binary_op(BinaryOp::Add, one, length).expect("1 + Meters()");
        assert_eq!(rt.str_value(result).as_deref(), Some("reflected"));
    }

    #[test]
    fn unsupported_operands_raise_type_error() {
        let mut rt = Runtime::new();
        let (one, text) = (rt.new_int(1), rt.new_str("a"));
        let error = rt.binary_op(BinaryOp::Sub, one, text).expect_err("int - str");
        assert_eq!(error.to_string(), "TypeError: `-` is not implemented");
        let error = rt.negate(text).expect_err("-str");
        assert_eq!(error.to_string(), "TypeError: bad operand type for unary -: 'str'");
    }

    #[test]
    fn equality_falls_back_to_identity() {
        let mut rt = Runtime::new();
        let plain = rt.define_type("Plain", None, &[]).expect("Plain");
        let a = rt.instantiate(plain, &[]).expect("Plain()");
        let b = rt.instantiate(plain, &[]).expect("Plain()");
        assert!(rt.values_equal(a, a).expect("a == a"));
        assert!(!rt.values_equal(a, b).expect("a == b"));
        let ne = rt.binary_op(BinaryOp::Ne, a, b).expect("a != b");
        assert_eq!(ne, rt.true_value());
        let one = rt.new_int(1);
        assert!(!rt.values_equal(a, one).expect("a == 1"));
    }

    #[test]
    fn comparison_hooks_reflect_to_their_mirror() {
        let mut rt = Runtime::new();
        let ge = rt.new_function("Big.__ge__", |rt, _args| Ok(rt.true_value()));
        let big = rt.define_type("Big", None, &[("__ge__", ge)]).expect("Big");
        let value = rt.instantiate(big, &[]).expect("Big()");
        let one = rt.new_int(1);
        let result = rt.binary_op(BinaryOp::Le, one, value).expect("1 <= Big()");
        assert_eq!(result, rt.true_value());
    }

    #[test]
    fn floor_div_and_mod_fall_back_to_divmod() {
        let mut rt = Runtime::new();
        let divmod = rt.new_function("Pair.__divmod__", |rt, _args| {
            let (q, r) = (rt.new_int(3), rt.new_int(4));
            Ok(rt.new_tuple(vec![q, r]))
        });
        let pair = rt.define_type("Pair", None, &[("__divmod__", divmod)]).expect("Pair");
        let value = rt.instantiate(pair, &[]).expect("Pair()");
        let two = rt.new_int(2);
        let quotient = rt.binary_op(BinaryOp::FloorDiv, value, two).expect("//");
        let remainder = rt.binary_op(BinaryOp::Mod, value, two).expect("%");
        assert_eq!(rt.int_value(quotient), Some(3));
        assert_eq!(rt.int_value(remainder), Some(4));
    }

    #[test]
    fn truthiness_consults_bool_then_len() {
        let mut rt = Runtime::new();
        let zero = rt.new_int(0);
        assert!(!rt.truthy(zero).expect("bool(0)"));
        let none = rt.none();
        assert!(!rt.truthy(none).expect("bool(None)"));
        let empty = rt.new_tuple(vec![]);
        assert!(!rt.truthy(empty).expect("bool(())"));
        let plain = rt.define_type("Plain", None, &[]).expect("Plain");
        let value = rt.instantiate(plain, &[]).expect("Plain()");
        assert!(rt.truthy(value).expect("bool(Plain())"));
        assert_eq!(rt.logical_not(value).expect("not"), rt.false_value());

        let bad = rt.new_function("Bad.__bool__", |rt, _args| Ok(rt.new_int(1)));
        let bad_type = rt.define_type("Bad", None, &[("__bool__", bad)]).expect("Bad");
        let value = rt.instantiate(bad_type, &[]).expect("Bad()");
        let error = rt.truthy(value).expect_err("non-bool result");
        assert_eq!(error.to_string(), "TypeError: __bool__ should return bool");
    }

    #[test]
    fn divmod_builds_a_pair_from_floor_div_and_mod() {
        let mut rt = Runtime::new();
        let (seven, two) = (rt.new_int(-7), rt.new_int(2));
        let pair = rt.divmod(seven, two).expect("divmod");
        assert_eq!(rt.repr(pair).expect("repr"), "(-4, 1)");
    }

    #[test]
    fn len_requires_a_len_hook() {
        let mut rt = Runtime::new();
        let one = rt.new_int(1);
        let error = rt.len(one).expect_err("int has no len");
        assert_eq!(error.to_string(), "TypeError: object of type 'int' has no len()");
        let generator = rt.new_native_generator(|_rt| Ok(Resume::Complete(None)));
        assert!(rt.len(generator).is_err());
    }
}
