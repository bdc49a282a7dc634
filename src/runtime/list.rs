//! `list`: a mutable sequence stored as one tuple cell in attribute `xs`.
//!
//! Tuples never change, so every mutation splices the current cell into a
//! new tuple and stores that back. Iterators keep whatever cell was current
//! when they were created.

use std::rc::Rc;

use crate::runtime::context::Runtime;
use crate::runtime::dict::OrderedDict;
use crate::runtime::error::RtResult;
use crate::runtime::iteration::yield_each;
use crate::runtime::value::Value;

const CELL: &str = "xs";

impl Runtime {
    pub fn new_list(&mut self, items: Vec<Value>) -> Value {
        let cell = self.new_tuple(items);
        let ty = self.types.list;
        self.obj_new(None, ty, [(CELL, cell)].into_iter().collect::<OrderedDict>())
    }

    /// Current items of a list, or `None` for anything else.
    pub fn list_items(&self, value: Value) -> Option<Rc<[Value]>> {
        if !self.is_instance_of(value, self.types.list) {
            return None;
        }
        self.tuple_items(self.getattr_raw(value, CELL)?)
    }

    fn list_cell(&mut self, name: &str, list: Value) -> RtResult<(Value, Rc<[Value]>)> {
        let cell = self.getattr_raw(list, CELL);
        match cell.and_then(|cell| Some((cell, self.tuple_items(cell)?))) {
            Some(found) => Ok(found),
            None => Err(self.type_error(format!("`{name}` requires an initialized list"))),
        }
    }

    fn list_splice(
        &mut self,
        name: &str,
        list: Value,
        start: usize,
        end: usize,
        replacement: &[Value],
    ) -> RtResult<Value> {
        let (cell, _) = self.list_cell(name, list)?;
        let (spliced, removed) = self.tuple_splice(cell, start, end, replacement)?;
        self.setattr_raw(list, CELL, spliced);
        Ok(removed)
    }
}

pub(crate) fn install(rt: &mut Runtime) {
    let list = rt.types.list;
    rt.define_native(list, "__init__", |rt, args| {
        rt.expect_args("list.__init__", args, 1..=2)?;
        let items = match args.get(1) {
            Some(&iterable) => rt.collect(iterable)?,
            None => Vec::new(),
        };
        let cell = rt.new_tuple(items);
        rt.setattr_raw(args[0], CELL, cell);
        Ok(rt.none())
    });
    rt.define_native(list, "append", |rt, args| {
        rt.expect_args("list.append", args, 2..=2)?;
        let (_, items) = rt.list_cell("list.append", args[0])?;
        let end = items.len();
        rt.list_splice("list.append", args[0], end, end, &[args[1]])?;
        Ok(rt.none())
    });
    rt.define_native(list, "pop", |rt, args| {
        rt.expect_args("list.pop", args, 1..=1)?;
        let (_, items) = rt.list_cell("list.pop", args[0])?;
        if items.is_empty() {
            return Err(rt.index_error("`list.pop` on empty list"));
        }
        let end = items.len();
        let removed = rt.list_splice("list.pop", args[0], end - 1, end, &[])?;
        rt.tuple_idx(removed, 0)
    });
    rt.define_native(list, "clear", |rt, args| {
        rt.expect_args("list.clear", args, 1..=1)?;
        let (_, items) = rt.list_cell("list.clear", args[0])?;
        rt.list_splice("list.clear", args[0], 0, items.len(), &[])?;
        Ok(rt.none())
    });
    rt.define_native(list, "copy", |rt, args| {
        rt.expect_args("list.copy", args, 1..=1)?;
        let (_, items) = rt.list_cell("list.copy", args[0])?;
        Ok(rt.new_list(items.to_vec()))
    });
    rt.define_native(list, "__len__", |rt, args| {
        rt.expect_args("list.__len__", args, 1..=1)?;
        let (_, items) = rt.list_cell("list.__len__", args[0])?;
        Ok(rt.new_int(items.len() as i64))
    });
    rt.define_native(list, "__bool__", |rt, args| {
        rt.expect_args("list.__bool__", args, 1..=1)?;
        let (_, items) = rt.list_cell("list.__bool__", args[0])?;
        Ok(rt.new_bool(!items.is_empty()))
    });
    rt.define_native(list, "__getitem__", |rt, args| {
        rt.expect_args("list.__getitem__", args, 2..=2)?;
        let (cell, items) = rt.list_cell("list.__getitem__", args[0])?;
        let position = rt.normalize_index("list", args[1], items.len())?;
        rt.tuple_idx(cell, position)
    });
    rt.define_native(list, "__setitem__", |rt, args| {
        rt.expect_args("list.__setitem__", args, 3..=3)?;
        let (_, items) = rt.list_cell("list.__setitem__", args[0])?;
        let position = rt.normalize_index("list", args[1], items.len())?;
        rt.list_splice("list.__setitem__", args[0], position, position + 1, &[args[2]])?;
        Ok(rt.none())
    });
    rt.define_native(list, "__iter__", |rt, args| {
        rt.expect_args("list.__iter__", args, 1..=1)?;
        let (_, items) = rt.list_cell("list.__iter__", args[0])?;
        Ok(yield_each(rt, items.to_vec()))
    });
    rt.define_native(list, "__eq__", |rt, args| {
        rt.expect_args("list.__eq__", args, 2..=2)?;
        let (_, left) = rt.list_cell("list.__eq__", args[0])?;
        let Some(right) = rt.list_items(args[1]) else {
            return Ok(rt.not_implemented());
        };
        let equal = rt.items_equal(&left, &right)?;
        Ok(rt.new_bool(equal))
    });
    rt.define_native(list, "__repr__", |rt, args| {
        rt.expect_args("list.__repr__", args, 1..=1)?;
        let (_, items) = rt.list_cell("list.__repr__", args[0])?;
        let rendered = rt.render_items(&items)?;
        Ok(rt.new_str(&format!("[{}]", rendered.join(", "))))
    });
}
