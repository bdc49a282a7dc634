//! `int`: 64-bit signed integers.
//!
//! Arithmetic is checked; overflow and division by zero raise `ValueError`.
//! Every binary member answers `NotImplemented` when the other operand is
//! not an int so that the reflected hook gets its turn.

use crate::runtime::context::Runtime;
use crate::runtime::error::RtResult;
use crate::runtime::intrinsic::{int_floor_div, int_mod};
use crate::runtime::value::Value;

type IntBinary = fn(&mut Runtime, i64, i64) -> RtResult<Value>;

fn binary_members() -> [(&'static str, IntBinary); 13] {
    [
        ("__eq__", |rt, l, r| Ok(rt.new_bool(l == r))),
        ("__ne__", |rt, l, r| Ok(rt.new_bool(l != r))),
        ("__lt__", |rt, l, r| Ok(rt.new_bool(l < r))),
        ("__le__", |rt, l, r| Ok(rt.new_bool(l <= r))),
        ("__gt__", |rt, l, r| Ok(rt.new_bool(l > r))),
        ("__ge__", |rt, l, r| Ok(rt.new_bool(l >= r))),
        ("__add__", |rt, l, r| checked(rt, "+", l.checked_add(r))),
        ("__sub__", |rt, l, r| checked(rt, "-", l.checked_sub(r))),
        ("__mul__", |rt, l, r| checked(rt, "*", l.checked_mul(r))),
        ("__floordiv__", |rt, l, r| {
            non_zero(rt, r)?;
            checked(rt, "//", int_floor_div(l, r))
        }),
        ("__mod__", |rt, l, r| {
            non_zero(rt, r)?;
            checked(rt, "%", int_mod(l, r))
        }),
        ("__pow__", |rt, l, r| {
            if r < 0 {
                return Err(rt.value_error("negative exponents are not supported"));
            }
            let result = u32::try_from(r).ok().and_then(|exp| l.checked_pow(exp));
            checked(rt, "**", result)
        }),
        ("__divmod__", |rt, l, r| {
            non_zero(rt, r)?;
            let quotient = checked(rt, "//", int_floor_div(l, r))?;
            let remainder = checked(rt, "%", int_mod(l, r))?;
            Ok(rt.new_tuple(vec![quotient, remainder]))
        }),
    ]
}

fn checked(rt: &mut Runtime, symbol: &str, result: Option<i64>) -> RtResult<Value> {
    match result {
        Some(value) => Ok(rt.new_int(value)),
        None => Err(rt.value_error(format!("integer overflow in `{symbol}`"))),
    }
}

fn non_zero(rt: &mut Runtime, divisor: i64) -> RtResult<()> {
    if divisor == 0 {
        return Err(rt.value_error("integer division or modulo by zero"));
    }
    Ok(())
}

impl Runtime {
    fn int_receiver(&mut self, name: &str, value: Value) -> RtResult<i64> {
        match self.int_value(value) {
            Some(int) => Ok(int),
            None => Err(self.type_error(format!("`{name}` requires an int receiver"))),
        }
    }
}

pub(crate) fn install(rt: &mut Runtime) {
    let int = rt.types.int;
    rt.define_native(int, "__new__", |rt, args| {
        rt.expect_args("int.__new__", args, 1..=2)?;
        let Some(&value) = args.get(1) else {
            return Ok(rt.new_int(0));
        };
        let Some(hook) = rt.lookup_member(rt.type_of(value), "__int__") else {
            let name = rt.type_name(rt.type_of(value));
            return Err(rt.type_error(format!("cannot convert '{name}' to int")));
        };
        let result = rt.call(hook, &[value])?;
        if rt.int_value(result).is_none() {
            return Err(rt.type_error("__int__ returned non-int"));
        }
        Ok(result)
    });
    rt.define_native(int, "__int__", |rt, args| {
        rt.expect_args("int.__int__", args, 1..=1)?;
        rt.int_receiver("int.__int__", args[0])?;
        Ok(args[0])
    });
    rt.define_native(int, "__bool__", |rt, args| {
        rt.expect_args("int.__bool__", args, 1..=1)?;
        let value = rt.int_receiver("int.__bool__", args[0])?;
        Ok(rt.new_bool(value != 0))
    });
    rt.define_native(int, "__neg__", |rt, args| {
        rt.expect_args("int.__neg__", args, 1..=1)?;
        let value = rt.int_receiver("int.__neg__", args[0])?;
        checked(rt, "-", value.checked_neg())
    });
    for name in ["__str__", "__repr__"] {
        rt.define_native(int, name, |rt, args| {
            rt.expect_args("int.__str__", args, 1..=1)?;
            let value = rt.int_receiver("int.__str__", args[0])?;
            Ok(rt.new_str(&value.to_string()))
        });
    }
    for (name, op) in binary_members() {
        rt.define_native(int, name, move |rt, args| {
            rt.expect_args(name, args, 2..=2)?;
            let left = rt.int_receiver(name, args[0])?;
            match rt.int_value(args[1]) {
                Some(right) => op(rt, left, right),
                None => Ok(rt.not_implemented()),
            }
        });
    }
}
