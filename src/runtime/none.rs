use crate::runtime::context::Runtime;

/// Members of `NoneType` and `NotImplementedType`; both construct their
/// singleton instead of allocating.
pub(crate) fn install(rt: &mut Runtime) {
    let none = rt.types.none;
    rt.define_native(none, "__new__", |rt, _args| Ok(rt.none()));
    rt.define_native(none, "__bool__", |rt, args| {
        rt.expect_args("NoneType.__bool__", args, 1..=1)?;
        Ok(rt.false_value())
    });
    rt.define_native(none, "__repr__", |rt, args| {
        rt.expect_args("NoneType.__repr__", args, 1..=1)?;
        Ok(rt.new_str("None"))
    });

    let not_implemented = rt.types.not_implemented;
    rt.define_native(not_implemented, "__new__", |rt, _args| Ok(rt.not_implemented()));
    rt.define_native(not_implemented, "__repr__", |rt, args| {
        rt.expect_args("NotImplementedType.__repr__", args, 1..=1)?;
        Ok(rt.new_str("NotImplemented"))
    });
}
