//! Mark-sweep reclamation of unreachable objects.
//!
//! Roots are the builtin types, the singletons, the globals, every pinned
//! handle and the extra handles passed to `collect_garbage`. Collection only
//! runs at points the host chooses and never while a native call or a
//! generator resume is in progress, because handles on the native stack are
//! not roots.

use tracing::debug;

use crate::runtime::context::Runtime;
use crate::runtime::error::{RtResult, RuntimeError};
use crate::runtime::object::{Object, ObjectKind};
use crate::runtime::value::Value;

fn visit_children(object: &Object, visit: &mut dyn FnMut(Value)) {
    visit(object.ty);
    if let Some(base) = object.base {
        visit(base);
    }
    for (_, value) in object.attributes.iter() {
        visit(value);
    }
    match &object.kind {
        ObjectKind::Tuple(items) => {
            for &item in items.iter() {
                visit(item);
            }
        }
        ObjectKind::Dict(entries) => {
            for (_, value) in entries.iter() {
                visit(value);
            }
        }
        ObjectKind::BoundMethod(bound) => {
            visit(bound.receiver);
            visit(bound.function);
        }
        ObjectKind::Generator(generator) => generator.trace(visit),
        ObjectKind::Type(_)
        | ObjectKind::Instance
        | ObjectKind::None
        | ObjectKind::NotImplemented
        | ObjectKind::Bool(_)
        | ObjectKind::Int(_)
        | ObjectKind::Str(_)
        | ObjectKind::Function(_) => {}
    }
}

impl Runtime {
    /// Keeps `value` alive across collections until a matching `unpin`.
    pub fn pin(&mut self, value: Value) {
        *self.pins.entry(value).or_default() += 1;
    }

    pub fn unpin(&mut self, value: Value) {
        if let Some(count) = self.pins.get_mut(&value) {
            *count -= 1;
            if *count == 0 {
                self.pins.remove(&value);
            }
        }
    }

    /// Whether `value` still names a live object.
    pub fn is_live(&self, value: Value) -> bool {
        self.heap.contains(value)
    }

    /// Frees every object unreachable from the roots plus `extra_roots` and
    /// returns how many were freed.
    ///
    /// Handles the host keeps outside the runtime must be pinned or passed
    /// in `extra_roots`; any other handle may be reclaimed.
    pub fn collect_garbage(&mut self, extra_roots: &[Value]) -> RtResult<usize> {
        if self.call_depth > 0 {
            return Err(RuntimeError::intrinsic(
                "collect_garbage",
                "native frames are still running",
            ));
        }
        let marked = self.mark(extra_roots);
        let freed = self.heap.sweep(&marked);
        debug!(freed, live = self.heap.len(), "garbage collected");
        Ok(freed)
    }

    fn mark(&self, extra_roots: &[Value]) -> Vec<bool> {
        let mut stack: Vec<Value> = self.types.all().to_vec();
        stack.extend([
            self.consts.none,
            self.consts.not_implemented,
            self.consts.true_value,
            self.consts.false_value,
        ]);
        stack.extend(self.globals.iter().map(|(_, value)| value));
        stack.extend(self.pins.keys().copied());
        stack.extend_from_slice(extra_roots);

        let mut marked = vec![false; self.heap.capacity()];
        while let Some(value) = stack.pop() {
            if !self.heap.contains(value) || marked[value.index()] {
                continue;
            }
            marked[value.index()] = true;
            visit_children(self.heap.get(value), &mut |child| stack.push(child));
        }
        marked
    }
}
