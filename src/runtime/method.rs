use crate::runtime::callable::BoundMethod;
use crate::runtime::context::Runtime;
use crate::runtime::object::{Object, ObjectKind};
use crate::runtime::value::Value;

impl Runtime {
    /// Wraps `function` so that calling the result prepends `receiver`.
    pub(crate) fn bind(&mut self, receiver: Value, function: Value) -> Value {
        self.heap.alloc(Object::new(
            ObjectKind::BoundMethod(BoundMethod { receiver, function }),
            self.types.function,
        ))
    }

    /// Receiver and function of a bound member.
    pub fn bound_parts(&self, value: Value) -> Option<(Value, Value)> {
        match self.heap.get(value).kind {
            ObjectKind::BoundMethod(BoundMethod { receiver, function }) => {
                Some((receiver, function))
            }
            _ => None,
        }
    }
}
