use crate::runtime::context::Runtime;
use crate::runtime::error::RtResult;
use crate::runtime::value::Value;

/// `bool` has exactly two instances; `bool(x)` is the truthiness of `x`.
pub(crate) fn install(rt: &mut Runtime) {
    let bool_type = rt.types.bool;
    rt.define_native(bool_type, "__new__", |rt, args| {
        rt.expect_args("bool.__new__", args, 1..=2)?;
        match args.get(1) {
            Some(&value) => {
                let truth = rt.truthy(value)?;
                Ok(rt.new_bool(truth))
            }
            None => Ok(rt.false_value()),
        }
    });
    rt.define_native(bool_type, "__bool__", |rt, args| {
        rt.expect_args("bool.__bool__", args, 1..=1)?;
        Ok(args[0])
    });
    rt.define_native(bool_type, "__int__", |rt, args| {
        rt.expect_args("bool.__int__", args, 1..=1)?;
        let flag = rt.expect_bool(args[0])?;
        Ok(rt.new_int(i64::from(flag)))
    });
    for name in ["__str__", "__repr__"] {
        rt.define_native(bool_type, name, |rt, args| {
            rt.expect_args("bool.__str__", args, 1..=1)?;
            let flag = rt.expect_bool(args[0])?;
            Ok(rt.new_str(if flag { "True" } else { "False" }))
        });
    }
}

impl Runtime {
    fn expect_bool(&mut self, value: Value) -> RtResult<bool> {
        match self.bool_value(value) {
            Some(flag) => Ok(flag),
            None => Err(self.type_error("expected a bool receiver")),
        }
    }
}
