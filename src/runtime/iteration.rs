//! Iteration protocol and generators.
//!
//! An iterable answers `__iter__` with an iterator; an iterator answers
//! `__next__` with the next item or raises `StopIteration`. Generators wrap
//! a suspended computation (`Coroutine`) and translate its completion into
//! `StopIteration` only in `generator.__next__`.

use std::mem;

use tracing::debug;

use crate::runtime::context::Runtime;
use crate::runtime::error::{RtResult, RuntimeError};
use crate::runtime::object::{Object, ObjectKind};
use crate::runtime::value::Value;

/// Outcome of resuming a suspended computation once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Yield(Value),
    /// The computation finished, optionally with a final value.
    Complete(Option<Value>),
}

/// A computation that can be resumed until it completes.
///
/// The execution engine implements this for compiled generator bodies;
/// closures implement it directly.
pub trait Coroutine {
    fn resume(&mut self, rt: &mut Runtime) -> RtResult<Resume>;

    /// Reports every object the suspended computation still refers to, so
    /// the collector keeps them alive. Closures report nothing.
    fn trace(&self, _visit: &mut dyn FnMut(Value)) {}
}

impl<F> Coroutine for F
where
    F: FnMut(&mut Runtime) -> RtResult<Resume>,
{
    fn resume(&mut self, rt: &mut Runtime) -> RtResult<Resume> {
        self(rt)
    }
}

/// A closure plus the objects it captured.
struct Holding<F> {
    held: Vec<Value>,
    step: F,
}

impl<F> Coroutine for Holding<F>
where
    F: FnMut(&mut Runtime) -> RtResult<Resume>,
{
    fn resume(&mut self, rt: &mut Runtime) -> RtResult<Resume> {
        (self.step)(rt)
    }

    fn trace(&self, visit: &mut dyn FnMut(Value)) {
        self.held.iter().copied().for_each(visit);
    }
}

enum GeneratorState {
    Suspended(Box<dyn Coroutine>),
    Running,
    Stopped,
}

pub(crate) struct Generator {
    state: GeneratorState,
    final_value: Option<Value>,
}

impl Generator {
    fn new(coroutine: Box<dyn Coroutine>) -> Self {
        Self {
            state: GeneratorState::Suspended(coroutine),
            final_value: None,
        }
    }

    pub(crate) fn trace(&self, visit: &mut dyn FnMut(Value)) {
        if let GeneratorState::Suspended(coroutine) = &self.state {
            coroutine.trace(visit);
        }
        if let Some(value) = self.final_value {
            visit(value);
        }
    }
}

impl Runtime {
    pub fn new_generator<C>(&mut self, coroutine: C) -> Value
    where
        C: Coroutine + 'static,
    {
        self.heap.alloc(Object::new(
            ObjectKind::Generator(Generator::new(Box::new(coroutine))),
            self.types.generator,
        ))
    }

    /// `new_generator` for a closure, with its signature inferred.
    ///
    /// Objects the closure captures are invisible to the collector; use
    /// `new_native_generator_holding` when it captures any.
    pub fn new_native_generator<F>(&mut self, step: F) -> Value
    where
        F: FnMut(&mut Runtime) -> RtResult<Resume> + 'static,
    {
        self.new_generator(step)
    }

    /// A closure generator that keeps `held` alive until it stops.
    pub fn new_native_generator_holding<F>(&mut self, held: Vec<Value>, step: F) -> Value
    where
        F: FnMut(&mut Runtime) -> RtResult<Resume> + 'static,
    {
        self.new_generator(Holding { held, step })
    }

    fn generator_mut(&mut self, value: Value) -> RtResult<&mut Generator> {
        let name = self.primitive_name(value);
        match &mut self.heap.get_mut(value).kind {
            ObjectKind::Generator(generator) => Ok(generator),
            _ => Err(RuntimeError::intrinsic(
                "gen_next",
                format!("expected generator, got {name}"),
            )),
        }
    }

    pub fn is_generator(&self, value: Value) -> bool {
        matches!(self.heap.get(value).kind, ObjectKind::Generator(_))
    }

    /// `Some(final value)` once the generator has stopped.
    pub fn generator_result(&self, value: Value) -> Option<Option<Value>> {
        match &self.heap.get(value).kind {
            ObjectKind::Generator(Generator {
                state: GeneratorState::Stopped,
                final_value,
            }) => Some(*final_value),
            _ => None,
        }
    }

    /// Resumes `generator` once.
    ///
    /// A stopped generator raises `StopIteration()` without resuming. When
    /// the computation completes or fails the generator stops for good.
    pub fn advance_generator(&mut self, generator: Value) -> RtResult<Value> {
        let slot = self.generator_mut(generator)?;
        let mut coroutine = match mem::replace(&mut slot.state, GeneratorState::Running) {
            GeneratorState::Suspended(coroutine) => coroutine,
            GeneratorState::Stopped => {
                slot.state = GeneratorState::Stopped;
                return Err(self.stop_iteration(None));
            }
            GeneratorState::Running => {
                return Err(self.value_error("generator already executing"));
            }
        };

        self.call_depth += 1;
        let outcome = coroutine.resume(self);
        self.call_depth -= 1;
        let slot = self.generator_mut(generator)?;
        match outcome {
            Ok(Resume::Yield(value)) => {
                slot.state = GeneratorState::Suspended(coroutine);
                Ok(value)
            }
            Ok(Resume::Complete(value)) => {
                slot.state = GeneratorState::Stopped;
                slot.final_value = value;
                debug!(?generator, "generator completed");
                Err(self.stop_iteration(value))
            }
            Err(error) => {
                slot.state = GeneratorState::Stopped;
                debug!(?generator, %error, "generator failed");
                Err(error)
            }
        }
    }

    pub fn iter(&mut self, iterable: Value) -> RtResult<Value> {
        let Some(hook) = self.lookup_member(self.type_of(iterable), "__iter__") else {
            return Err(self.type_error("Call `iter` on non-iterable type"));
        };
        self.call(hook, &[iterable])
    }

    pub fn next(&mut self, iterator: Value) -> RtResult<Value> {
        let Some(hook) = self.lookup_member(self.type_of(iterator), "__next__") else {
            return Err(self.type_error("Call `next` on non-iterator type"));
        };
        self.call(hook, &[iterator])
    }

    /// `next(iterator)`, with `StopIteration` turned into `None`.
    pub fn next_item(&mut self, iterator: Value) -> RtResult<Option<Value>> {
        match self.next(iterator) {
            Ok(value) => Ok(Some(value)),
            Err(error) if self.is_stop_iteration(&error) => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub fn next_or(&mut self, iterator: Value, default: Value) -> RtResult<Value> {
        Ok(self.next_item(iterator)?.unwrap_or(default))
    }

    pub fn for_each<F>(&mut self, iterable: Value, mut f: F) -> RtResult<()>
    where
        F: FnMut(&mut Runtime, Value) -> RtResult<()>,
    {
        let iterator = self.iter(iterable)?;
        while let Some(item) = self.next_item(iterator)? {
            f(self, item)?;
        }
        Ok(())
    }

    pub fn collect(&mut self, iterable: Value) -> RtResult<Vec<Value>> {
        let mut items = Vec::new();
        self.for_each(iterable, |_rt, item| {
            items.push(item);
            Ok(())
        })?;
        Ok(items)
    }
}

/// Generator over a fixed list of values.
pub(crate) fn yield_each(rt: &mut Runtime, items: Vec<Value>) -> Value {
    let mut pending = items.clone().into_iter();
    rt.new_native_generator_holding(items, move |_rt| {
        Ok(match pending.next() {
            Some(item) => Resume::Yield(item),
            None => Resume::Complete(None),
        })
    })
}

pub(crate) fn install(rt: &mut Runtime) {
    let generator = rt.types.generator;
    rt.define_native(generator, "__new__", |rt, _args| {
        Err(rt.not_implemented_error("generators are created by generator functions"))
    });
    rt.define_native(generator, "__iter__", |rt, args| {
        rt.expect_args("generator.__iter__", args, 1..=1)?;
        Ok(args[0])
    });
    rt.define_native(generator, "__next__", |rt, args| {
        rt.expect_args("generator.__next__", args, 1..=1)?;
        if !rt.is_generator(args[0]) {
            return Err(rt.type_error("`generator.__next__` requires a generator"));
        }
        rt.advance_generator(args[0])
    });
}
