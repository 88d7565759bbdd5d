//! Builder offsets.

use std::marker::PhantomData;

/// Position of a finished object in a buffer under construction.
///
/// Measured in bytes from the end of the buffer, so it stays valid while the
/// buffer grows backward. The type parameter records what kind of object it
/// refers to (`StringTag`, `TableTag`, `VectorTag<T>`).
pub struct WipOffset<T>(u32, PhantomData<fn() -> T>);

impl<T> WipOffset<T> {
    pub fn new(value: u32) -> Self {
        Self(value, PhantomData)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl<T> Clone for WipOffset<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WipOffset<T> {}

impl<T> PartialEq for WipOffset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for WipOffset<T> {}

impl<T> std::hash::Hash for WipOffset<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> std::fmt::Debug for WipOffset<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WipOffset({})", self.0)
    }
}
