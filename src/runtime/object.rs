//! Heap storage for runtime objects.
//!
//! Every object is a slot in one arena owned by the `Runtime`. A slot lives
//! until a collection finds it unreachable. Types point at their base,
//! instances at their type, and bound methods at their receiver purely
//! through handles.

use std::rc::Rc;

use crate::runtime::callable::{BoundMethod, NativeFunction};
use crate::runtime::dict::OrderedDict;
use crate::runtime::iteration::Generator;
use crate::runtime::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TypeObject {
    pub(crate) name: Rc<str>,
}

/// Primitive payload carried by an object.
pub(crate) enum ObjectKind {
    Type(TypeObject),
    Instance,
    None,
    NotImplemented,
    Bool(bool),
    Int(i64),
    Str(Rc<str>),
    Tuple(Rc<[Value]>),
    Dict(OrderedDict),
    Function(NativeFunction),
    BoundMethod(BoundMethod),
    Generator(Generator),
}

impl ObjectKind {
    pub(crate) fn primitive_name(&self) -> &'static str {
        match self {
            Self::Type(_) => "type",
            Self::Instance => "instance",
            Self::None => "none",
            Self::NotImplemented => "not-implemented",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "str",
            Self::Tuple(_) => "tuple",
            Self::Dict(_) => "dict",
            Self::Function(_) => "function",
            Self::BoundMethod(_) => "method",
            Self::Generator(_) => "generator",
        }
    }
}

pub(crate) struct Object {
    pub(crate) kind: ObjectKind,
    pub(crate) ty: Value,
    pub(crate) base: Option<Value>,
    pub(crate) attributes: OrderedDict,
}

impl Object {
    pub(crate) fn new(kind: ObjectKind, ty: Value) -> Self {
        Self {
            kind,
            ty,
            base: None,
            attributes: OrderedDict::default(),
        }
    }

    pub(crate) fn with_base(mut self, base: Option<Value>) -> Self {
        self.base = base;
        self
    }

    pub(crate) fn with_attributes(mut self, attributes: OrderedDict) -> Self {
        self.attributes = attributes;
        self
    }
}

struct Slot {
    generation: u32,
    object: Option<Object>,
}

/// Slot arena with free-list reuse.
///
/// Freed slots bump their generation before going back on the free list, so
/// a handle to the previous occupant never names the new one. A slot whose
/// generation counter is exhausted is retired instead of reused.
#[derive(Default)]
pub(crate) struct Heap {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
}

impl Heap {
    pub(crate) fn alloc(&mut self, object: Object) -> Value {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.object = Some(object);
            return Value::new(index, slot.generation);
        }
        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        Value::new(self.slots.len() - 1, 0)
    }

    /// # Panics
    ///
    /// When `value` names a reclaimed object. Handles held outside the heap
    /// must be rooted across a collection.
    pub(crate) fn get(&self, value: Value) -> &Object {
        match self.slots.get(value.index()) {
            Some(Slot {
                generation,
                object: Some(object),
            }) if *generation == value.generation() => object,
            _ => panic!("stale object handle {value:?}"),
        }
    }

    pub(crate) fn get_mut(&mut self, value: Value) -> &mut Object {
        match self.slots.get_mut(value.index()) {
            Some(Slot {
                generation,
                object: Some(object),
            }) if *generation == value.generation() => object,
            _ => panic!("stale object handle {value:?}"),
        }
    }

    pub(crate) fn contains(&self, value: Value) -> bool {
        matches!(
            self.slots.get(value.index()),
            Some(Slot { generation, object: Some(_) }) if *generation == value.generation()
        )
    }

    /// Rewrites the type reference of a freshly allocated object.
    ///
    /// Only the bootstrap of the root `type` object uses this: it must be its
    /// own type, which cannot be expressed at allocation time.
    pub(crate) fn patch_type(&mut self, value: Value, ty: Value) {
        let object = self.get_mut(value);
        debug_assert_eq!(object.ty, Value::DANGLING, "type already assigned");
        object.ty = ty;
    }

    /// Handles of every live object, in slot order.
    pub(crate) fn handles(&self) -> impl Iterator<Item = Value> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.object.as_ref().map(|_| Value::new(index, slot.generation))
        })
    }

    /// Number of live objects.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Frees every live object whose slot is not marked and returns how many
    /// were freed.
    pub(crate) fn sweep(&mut self, marked: &[bool]) -> usize {
        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.object.is_none() || marked.get(index).copied().unwrap_or(false) {
                continue;
            }
            slot.object = None;
            freed += 1;
            if let Some(next) = slot.generation.checked_add(1) {
                slot.generation = next;
                self.free.push(index);
            }
        }
        self.live -= freed;
        freed
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }
}
