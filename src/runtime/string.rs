//! `str`: immutable text indexed by character.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::runtime::context::Runtime;
use crate::runtime::dict::quote_text;
use crate::runtime::error::RtResult;
use crate::runtime::intrinsic::{str_find, str_len, str_slice, str_to_int};
use crate::runtime::iteration::Resume;
use crate::runtime::value::Value;

impl Runtime {
    fn str_receiver(&mut self, name: &str, value: Value) -> RtResult<Rc<str>> {
        match self.str_value(value) {
            Some(text) => Ok(text),
            None => Err(self.type_error(format!("`{name}` requires a str receiver"))),
        }
    }

    fn int_argument(&mut self, name: &str, argument: &str, value: Value) -> RtResult<i64> {
        match self.int_value(value) {
            Some(int) => Ok(int),
            None => Err(self.type_error(format!("`{name}` requires `{argument}` to be int"))),
        }
    }

    fn str_argument(&mut self, name: &str, argument: &str, value: Value) -> RtResult<Rc<str>> {
        match self.str_value(value) {
            Some(text) => Ok(text),
            None => Err(self.type_error(format!("`{name}` requires `{argument}` to be str"))),
        }
    }
}

fn compare_members() -> [(&'static str, fn(Ordering) -> bool); 4] {
    [
        ("__lt__", Ordering::is_lt),
        ("__le__", Ordering::is_le),
        ("__gt__", Ordering::is_gt),
        ("__ge__", Ordering::is_ge),
    ]
}

pub(crate) fn install(rt: &mut Runtime) {
    let str_type = rt.types.str;
    rt.define_native(str_type, "__new__", |rt, args| {
        rt.expect_args("str.__new__", args, 1..=2)?;
        match args.get(1) {
            Some(&value) => {
                let text = rt.to_text(value)?;
                Ok(rt.new_str(&text))
            }
            None => Ok(rt.new_str("")),
        }
    });
    rt.define_native(str_type, "__str__", |rt, args| {
        rt.expect_args("str.__str__", args, 1..=1)?;
        rt.str_receiver("str.__str__", args[0])?;
        Ok(args[0])
    });
    rt.define_native(str_type, "__repr__", |rt, args| {
        rt.expect_args("str.__repr__", args, 1..=1)?;
        let text = rt.str_receiver("str.__repr__", args[0])?;
        Ok(rt.new_str(&quote_text(&text)))
    });
    rt.define_native(str_type, "__len__", |rt, args| {
        rt.expect_args("str.__len__", args, 1..=1)?;
        let text = rt.str_receiver("str.__len__", args[0])?;
        Ok(rt.new_int(str_len(&text) as i64))
    });
    rt.define_native(str_type, "__bool__", |rt, args| {
        rt.expect_args("str.__bool__", args, 1..=1)?;
        let text = rt.str_receiver("str.__bool__", args[0])?;
        Ok(rt.new_bool(!text.is_empty()))
    });
    rt.define_native(str_type, "__getitem__", |rt, args| {
        rt.expect_args("str.__getitem__", args, 2..=2)?;
        let text = rt.str_receiver("str.__getitem__", args[0])?;
        let index = rt.normalize_index("str", args[1], str_len(&text))? as i64;
        let ch = str_slice(&text, index, index + 1, 1)?;
        Ok(rt.new_str(&ch))
    });
    rt.define_native(str_type, "slice", |rt, args| {
        rt.expect_args("str.slice", args, 3..=4)?;
        let text = rt.str_receiver("str.slice", args[0])?;
        let start = rt.int_argument("str.slice", "start", args[1])?;
        let end = rt.int_argument("str.slice", "end", args[2])?;
        let step = match args.get(3) {
            Some(&step) => rt.int_argument("str.slice", "step", step)?,
            None => 1,
        };
        if step == 0 {
            return Err(rt.value_error("`str.slice` step cannot be zero"));
        }
        let sliced = str_slice(&text, start, end, step)?;
        Ok(rt.new_str(&sliced))
    });
    rt.define_native(str_type, "find", |rt, args| {
        rt.expect_args("str.find", args, 2..=4)?;
        let text = rt.str_receiver("str.find", args[0])?;
        let needle = rt.str_argument("str.find", "sub", args[1])?;
        let len = str_len(&text) as i64;
        let mut start = match args.get(2) {
            Some(&start) => rt.int_argument("str.find", "start", start)?,
            None => 0,
        };
        let end = match args.get(3) {
            Some(&end) => rt.int_argument("str.find", "end", end)?,
            None => len,
        };
        if start < 0 {
            start += len;
        }
        Ok(rt.new_int(str_find(&text, &needle, start, end)))
    });
    rt.define_native(str_type, "__int__", |rt, args| {
        rt.expect_args("str.__int__", args, 1..=1)?;
        let text = rt.str_receiver("str.__int__", args[0])?;
        match str_to_int(&text) {
            Some(value) => Ok(rt.new_int(value)),
            None => Err(rt.value_error("`str.__int__` requires self to be /[0-9]+/")),
        }
    });
    rt.define_native(str_type, "join", |rt, args| {
        rt.expect_args("str.join", args, 2..=2)?;
        let separator = rt.str_receiver("str.join", args[0])?;
        let mut joined = String::new();
        let mut first = true;
        rt.for_each(args[1], |rt, item| {
            let piece = rt.str_argument("str.join", "items", item)?;
            if !first {
                joined.push_str(&separator);
            }
            first = false;
            joined.push_str(&piece);
            Ok(())
        })?;
        Ok(rt.new_str(&joined))
    });
    rt.define_native(str_type, "__add__", |rt, args| {
        rt.expect_args("str.__add__", args, 2..=2)?;
        let left = rt.str_receiver("str.__add__", args[0])?;
        let Some(right) = rt.str_value(args[1]) else {
            return Ok(rt.not_implemented());
        };
        Ok(rt.new_str(&format!("{left}{right}")))
    });
    rt.define_native(str_type, "__eq__", |rt, args| {
        rt.expect_args("str.__eq__", args, 2..=2)?;
        let left = rt.str_receiver("str.__eq__", args[0])?;
        match rt.str_value(args[1]) {
            Some(right) => Ok(rt.new_bool(left == right)),
            None => Ok(rt.not_implemented()),
        }
    });
    for (name, accepts) in compare_members() {
        rt.define_native(str_type, name, move |rt, args| {
            rt.expect_args(name, args, 2..=2)?;
            let left = rt.str_receiver(name, args[0])?;
            match rt.str_value(args[1]) {
                Some(right) => Ok(rt.new_bool(accepts(left.cmp(&right)))),
                None => Ok(rt.not_implemented()),
            }
        });
    }
    rt.define_native(str_type, "__iter__", |rt, args| {
        rt.expect_args("str.__iter__", args, 1..=1)?;
        let text = rt.str_receiver("str.__iter__", args[0])?;
        let chars: Vec<char> = text.chars().collect();
        let mut chars = chars.into_iter();
        Ok(rt.new_native_generator(move |rt| {
            Ok(match chars.next() {
                Some(ch) => Resume::Yield(rt.new_str(ch.encode_utf8(&mut [0; 4]))),
                None => Resume::Complete(None),
            })
        }))
    });
}
