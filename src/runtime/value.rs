use std::fmt;

/// Handle to an object living in the runtime heap.
///
/// Handles are plain slot indices, so copying one never copies the object and
/// two handles compare equal exactly when they name the same object. This is
/// the identity relation the language exposes as `is`. A slot freed by the
/// collector is reused under a new generation, which keeps a handle to the
/// old occupant distinct from handles to the new one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value {
    index: usize,
    generation: u32,
}

impl Value {
    /// Placeholder used while the root `type` object is being allocated.
    pub(crate) const DANGLING: Value = Value {
        index: usize::MAX,
        generation: 0,
    };

    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self::new(index, 0)
    }

    pub(crate) fn index(self) -> usize {
        self.index
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }

    /// Identity number, as returned by the `id` builtin.
    ///
    /// Unique among live objects; a reclaimed object's number may be reused.
    pub fn id(self) -> usize {
        self.index
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "Value(#{})", self.index)
        } else {
            write!(f, "Value(#{}@{})", self.index, self.generation)
        }
    }
}
