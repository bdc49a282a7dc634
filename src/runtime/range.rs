//! `range`: lazily produced arithmetic progressions.

use crate::runtime::context::Runtime;
use crate::runtime::error::RtResult;
use crate::runtime::iteration::Resume;
use crate::runtime::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub(crate) start: i64,
    pub(crate) end: i64,
    pub(crate) step: i64,
}

impl Bounds {
    fn contains_next(self, value: i64) -> bool {
        if self.step > 0 {
            value < self.end
        } else {
            value > self.end
        }
    }

    pub(crate) fn len(self) -> u64 {
        if !self.contains_next(self.start) {
            return 0;
        }
        let distance = self.end.abs_diff(self.start);
        let step = self.step.unsigned_abs();
        distance.div_ceil(step)
    }
}

impl Runtime {
    fn range_bounds(&mut self, name: &str, range: Value) -> RtResult<Bounds> {
        let field = |rt: &Self, key: &str| {
            rt.getattr_raw(range, key)
                .and_then(|value| rt.int_value(value))
        };
        match (field(self, "start"), field(self, "end"), field(self, "step")) {
            (Some(start), Some(end), Some(step)) if step != 0 => Ok(Bounds { start, end, step }),
            _ => Err(self.type_error(format!("`{name}` requires an initialized range"))),
        }
    }
}

pub(crate) fn install(rt: &mut Runtime) {
    let range = rt.types.range;
    rt.define_native(range, "__init__", |rt, args| {
        rt.expect_args("range.__init__", args, 2..=4)?;
        let receiver = args[0];
        let (start, end) = match args.len() {
            2 => (rt.new_int(0), args[1]),
            _ => (args[1], args[2]),
        };
        let step = match args.get(3) {
            Some(&step) => step,
            None => rt.new_int(1),
        };
        for (field, value) in [("start", start), ("end", end), ("step", step)] {
            if rt.int_value(value).is_none() {
                return Err(rt.type_error(format!("`range` {field} should be int")));
            }
        }
        if rt.int_value(step) == Some(0) {
            return Err(rt.value_error("`range` step cannot be zero"));
        }
        rt.setattr_raw(receiver, "start", start);
        rt.setattr_raw(receiver, "end", end);
        rt.setattr_raw(receiver, "step", step);
        Ok(rt.none())
    });
    rt.define_native(range, "__iter__", |rt, args| {
        rt.expect_args("range.__iter__", args, 1..=1)?;
        let bounds = rt.range_bounds("range.__iter__", args[0])?;
        let mut next = Some(bounds.start);
        Ok(rt.new_native_generator(move |rt| match next {
            Some(current) if bounds.contains_next(current) => {
                next = current.checked_add(bounds.step);
                Ok(Resume::Yield(rt.new_int(current)))
            }
            _ => Ok(Resume::Complete(None)),
        }))
    });
    rt.define_native(range, "__len__", |rt, args| {
        rt.expect_args("range.__len__", args, 1..=1)?;
        let bounds = rt.range_bounds("range.__len__", args[0])?;
        match i64::try_from(bounds.len()) {
            Ok(len) => Ok(rt.new_int(len)),
            Err(_) => Err(rt.value_error("range length does not fit in an int")),
        }
    });
    rt.define_native(range, "__repr__", |rt, args| {
        rt.expect_args("range.__repr__", args, 1..=1)?;
        let Bounds { start, end, step } = rt.range_bounds("range.__repr__", args[0])?;
        let rendered = if step == 1 {
            format!("range({start}, {end})")
        } else {
            format!("range({start}, {end}, {step})")
        };
        Ok(rt.new_str(&rendered))
    });
}
