//! Primitive operations the rest of the runtime is built from.
//!
//! These never dispatch through types: they look at primitive payloads
//! directly and report misuse as `RuntimeError::Intrinsic`. User-visible
//! argument checking happens one layer up, in the builtin type members,
//! before any of these are reached.

use std::rc::Rc;

use crate::runtime::context::Runtime;
use crate::runtime::dict::OrderedDict;
use crate::runtime::error::{RtResult, RuntimeError};
use crate::runtime::object::{Object, ObjectKind};
use crate::runtime::value::Value;

impl Runtime {
    pub fn new_int(&mut self, value: i64) -> Value {
        self.heap
            .alloc(Object::new(ObjectKind::Int(value), self.types.int))
    }

    pub fn new_bool(&self, value: bool) -> Value {
        if value {
            self.consts.true_value
        } else {
            self.consts.false_value
        }
    }

    pub fn new_str(&mut self, value: &str) -> Value {
        self.heap
            .alloc(Object::new(ObjectKind::Str(value.into()), self.types.str))
    }

    pub fn new_tuple(&mut self, items: Vec<Value>) -> Value {
        self.heap
            .alloc(Object::new(ObjectKind::Tuple(items.into()), self.types.tuple))
    }

    /// Allocates mapping storage typed as `ty` (the builtin `dict` or a subtype).
    pub(crate) fn new_dict_of(&mut self, ty: Value, entries: OrderedDict) -> Value {
        self.heap.alloc(Object::new(ObjectKind::Dict(entries), ty))
    }

    pub fn new_dict(&mut self) -> Value {
        let ty = self.types.dict;
        self.new_dict_of(ty, OrderedDict::default())
    }

    /// Allocates a bare object: optional base, its type and initial attributes.
    pub(crate) fn obj_new(&mut self, base: Option<Value>, ty: Value, attributes: OrderedDict) -> Value {
        self.heap.alloc(
            Object::new(ObjectKind::Instance, ty)
                .with_base(base)
                .with_attributes(attributes),
        )
    }

    pub fn is_none(&self, value: Value) -> bool {
        value == self.consts.none
    }

    pub fn int_value(&self, value: Value) -> Option<i64> {
        match self.heap.get(value).kind {
            ObjectKind::Int(int) => Some(int),
            _ => None,
        }
    }

    pub fn bool_value(&self, value: Value) -> Option<bool> {
        match self.heap.get(value).kind {
            ObjectKind::Bool(flag) => Some(flag),
            _ => None,
        }
    }

    pub fn str_value(&self, value: Value) -> Option<Rc<str>> {
        match &self.heap.get(value).kind {
            ObjectKind::Str(text) => Some(text.clone()),
            _ => None,
        }
    }

    pub fn tuple_items(&self, value: Value) -> Option<Rc<[Value]>> {
        match &self.heap.get(value).kind {
            ObjectKind::Tuple(items) => Some(items.clone()),
            _ => None,
        }
    }

    pub(crate) fn expect_tuple_primitive(
        &self,
        operation: &'static str,
        value: Value,
    ) -> RtResult<Rc<[Value]>> {
        self.tuple_items(value).ok_or_else(|| {
            RuntimeError::intrinsic(operation, format!("expected tuple, got {}", self.primitive_name(value)))
        })
    }

    pub(crate) fn primitive_name(&self, value: Value) -> &'static str {
        self.heap.get(value).kind.primitive_name()
    }

    pub(crate) fn tuple_idx(&self, tuple: Value, index: usize) -> RtResult<Value> {
        let items = self.expect_tuple_primitive("tuple_idx", tuple)?;
        items.get(index).copied().ok_or_else(|| {
            RuntimeError::intrinsic("tuple_idx", format!("index {index} out of range for length {}", items.len()))
        })
    }

    pub(crate) fn tuple_concat(&mut self, left: Value, right: Value) -> RtResult<Value> {
        let left = self.expect_tuple_primitive("tuple_concat", left)?;
        let right = self.expect_tuple_primitive("tuple_concat", right)?;
        let items = left.iter().chain(right.iter()).copied().collect();
        Ok(self.new_tuple(items))
    }

    /// Replaces `start..end` of `tuple` with `replacement`.
    ///
    /// Returns the new tuple and the removed slice; the input tuple is left
    /// untouched.
    pub(crate) fn tuple_splice(
        &mut self,
        tuple: Value,
        start: usize,
        end: usize,
        replacement: &[Value],
    ) -> RtResult<(Value, Value)> {
        let items = self.expect_tuple_primitive("tuple_splice", tuple)?;
        let (spliced, removed) = splice_items(&items, start, end, replacement)?;
        let spliced = self.new_tuple(spliced);
        let removed = self.new_tuple(removed);
        Ok((spliced, removed))
    }

    pub(crate) fn dict_storage(&self, value: Value) -> Option<&OrderedDict> {
        match &self.heap.get(value).kind {
            ObjectKind::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    pub(crate) fn dict_storage_mut(&mut self, value: Value) -> RtResult<&mut OrderedDict> {
        let name = self.primitive_name(value);
        match &mut self.heap.get_mut(value).kind {
            ObjectKind::Dict(entries) => Ok(entries),
            _ => Err(RuntimeError::intrinsic(
                "dict_storage",
                format!("expected dict, got {name}"),
            )),
        }
    }

    /// Raw read of an object's own attribute map.
    pub(crate) fn getattr_raw(&self, object: Value, name: &str) -> Option<Value> {
        self.heap.get(object).attributes.get(name)
    }

    pub(crate) fn setattr_raw(&mut self, object: Value, name: &str, value: Value) {
        self.heap.get_mut(object).attributes.insert(name, value);
    }

    pub(crate) fn delattr_raw(&mut self, object: Value, name: &str) -> Option<Value> {
        self.heap.get_mut(object).attributes.remove(name)
    }

    pub(crate) fn write_console(&mut self, text: &str) -> RtResult<()> {
        self.console.write(text).map_err(|error| RuntimeError::Io {
            operation: "write",
            message: error.to_string(),
        })
    }

    pub(crate) fn flush_console(&mut self) -> RtResult<()> {
        self.console.flush().map_err(|error| RuntimeError::Io {
            operation: "flush",
            message: error.to_string(),
        })
    }

    pub(crate) fn read_console_line(&mut self) -> RtResult<Option<String>> {
        self.console.read_line().map_err(|error| RuntimeError::Io {
            operation: "read",
            message: error.to_string(),
        })
    }
}

pub(crate) fn splice_items(
    items: &[Value],
    start: usize,
    end: usize,
    replacement: &[Value],
) -> RtResult<(Vec<Value>, Vec<Value>)> {
    if start > end || end > items.len() {
        return Err(RuntimeError::intrinsic(
            "tuple_splice",
            format!("invalid range {start}..{end} for length {}", items.len()),
        ));
    }
    let mut spliced = Vec::with_capacity(items.len() - (end - start) + replacement.len());
    spliced.extend_from_slice(&items[..start]);
    spliced.extend_from_slice(replacement);
    spliced.extend_from_slice(&items[end..]);
    Ok((spliced, items[start..end].to_vec()))
}

/// Floor division; `None` on a zero divisor or overflow.
pub(crate) fn int_floor_div(left: i64, right: i64) -> Option<i64> {
    let quotient = left.checked_div(right)?;
    if left % right != 0 && ((left < 0) != (right < 0)) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

/// Modulo whose sign follows the divisor; `None` on a zero divisor.
pub(crate) fn int_mod(left: i64, right: i64) -> Option<i64> {
    let remainder = left.checked_rem(right)?;
    if remainder != 0 && ((remainder < 0) != (right < 0)) {
        Some(remainder + right)
    } else {
        Some(remainder)
    }
}

pub(crate) fn str_len(text: &str) -> usize {
    text.chars().count()
}

/// Character slice with clamped bounds.
pub(crate) fn str_slice(text: &str, start: i64, end: i64, step: i64) -> RtResult<String> {
    if step == 0 {
        return Err(RuntimeError::intrinsic("str_slice", "zero step"));
    }
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len() as i64;
    let mut out = String::new();
    let mut next = Some(if step > 0 { start.max(0) } else { start.min(len - 1) });
    while let Some(index) = next {
        let in_range = if step > 0 {
            index < len && index < end
        } else {
            index >= 0 && index > end
        };
        if !in_range {
            break;
        }
        out.push(chars[index as usize]);
        // Stepping past the i64 range ends the slice.
        next = index.checked_add(step);
    }
    Ok(out)
}

/// Position of `needle` in `haystack` searching from `start`, or -1.
///
/// `end` bounds where a match may begin, not where it may finish: the last
/// candidate start is `min(end, len(haystack) - len(needle))`, so a match
/// starting at or before `end` counts even when it runs past `end`.
/// `str_find("banana", "an", 0, 2)` is 1.
pub(crate) fn str_find(haystack: &str, needle: &str, start: i64, end: i64) -> i64 {
    let hay: Vec<char> = haystack.chars().collect();
    let pattern: Vec<char> = needle.chars().collect();
    if hay.len() < pattern.len() {
        return -1;
    }
    let last_start = end.min((hay.len() - pattern.len()) as i64);
    let mut position = start.max(0);
    while position <= last_start {
        let from = position as usize;
        if hay[from..from + pattern.len()] == pattern[..] {
            return position;
        }
        position += 1;
    }
    -1
}

/// Parses a non-empty run of ASCII digits.
pub(crate) fn str_to_int(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
