//! `tuple`: immutable sequences, also the backing store of `list`.

use crate::runtime::context::Runtime;
use crate::runtime::error::RtResult;
use crate::runtime::iteration::yield_each;
use crate::runtime::value::Value;

impl Runtime {
    /// Turns a possibly negative index into a position inside `0..len`.
    pub(crate) fn normalize_index(&mut self, what: &str, index: Value, len: usize) -> RtResult<usize> {
        let Some(raw) = self.int_value(index) else {
            let got = self.type_name(self.type_of(index));
            return Err(self.type_error(format!("{what} indices must be int, not {got}")));
        };
        let len = len as i64;
        let position = if raw < 0 { raw + len } else { raw };
        if !(0..len).contains(&position) {
            return Err(self.index_error(format!("{what} index out of range")));
        }
        Ok(position as usize)
    }

    fn tuple_receiver(&mut self, name: &str, value: Value) -> RtResult<Vec<Value>> {
        match self.tuple_items(value) {
            Some(items) => Ok(items.to_vec()),
            None => Err(self.type_error(format!("`{name}` requires a tuple receiver"))),
        }
    }

    /// Elementwise `==` over two equally long sequences.
    pub(crate) fn items_equal(&mut self, left: &[Value], right: &[Value]) -> RtResult<bool> {
        if left.len() != right.len() {
            return Ok(false);
        }
        for (&l, &r) in left.iter().zip(right) {
            if !self.values_equal(l, r)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) fn render_items(&mut self, items: &[Value]) -> RtResult<Vec<String>> {
        items.iter().map(|&item| self.repr(item)).collect()
    }
}

pub(crate) fn install(rt: &mut Runtime) {
    let tuple = rt.types.tuple;
    rt.define_native(tuple, "__new__", |rt, args| {
        rt.expect_args("tuple.__new__", args, 1..=2)?;
        let items = match args.get(1) {
            Some(&iterable) => rt.collect(iterable)?,
            None => Vec::new(),
        };
        Ok(rt.new_tuple(items))
    });
    rt.define_native(tuple, "__len__", |rt, args| {
        rt.expect_args("tuple.__len__", args, 1..=1)?;
        let items = rt.tuple_receiver("tuple.__len__", args[0])?;
        Ok(rt.new_int(items.len() as i64))
    });
    rt.define_native(tuple, "__getitem__", |rt, args| {
        rt.expect_args("tuple.__getitem__", args, 2..=2)?;
        let items = rt.tuple_receiver("tuple.__getitem__", args[0])?;
        let position = rt.normalize_index("tuple", args[1], items.len())?;
        rt.tuple_idx(args[0], position)
    });
    rt.define_native(tuple, "__eq__", |rt, args| {
        rt.expect_args("tuple.__eq__", args, 2..=2)?;
        let left = rt.tuple_receiver("tuple.__eq__", args[0])?;
        let Some(right) = rt.tuple_items(args[1]) else {
            return Ok(rt.not_implemented());
        };
        let equal = rt.items_equal(&left, &right)?;
        Ok(rt.new_bool(equal))
    });
    rt.define_native(tuple, "__add__", |rt, args| {
        rt.expect_args("tuple.__add__", args, 2..=2)?;
        rt.tuple_receiver("tuple.__add__", args[0])?;
        if rt.tuple_items(args[1]).is_none() {
            return Ok(rt.not_implemented());
        }
        rt.tuple_concat(args[0], args[1])
    });
    rt.define_native(tuple, "__iter__", |rt, args| {
        rt.expect_args("tuple.__iter__", args, 1..=1)?;
        let items = rt.tuple_receiver("tuple.__iter__", args[0])?;
        Ok(yield_each(rt, items))
    });
    rt.define_native(tuple, "__repr__", |rt, args| {
        rt.expect_args("tuple.__repr__", args, 1..=1)?;
        let items = rt.tuple_receiver("tuple.__repr__", args[0])?;
        let rendered = rt.render_items(&items)?;
        let body = match rendered.as_slice() {
            [only] => format!("{only},"),
            _ => rendered.join(", "),
        };
        Ok(rt.new_str(&format!("({body})")))
    });
}
