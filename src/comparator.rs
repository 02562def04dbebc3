//! Strict less-than predicates used to order registry values.
//!
//! A registry and every resolver that computes hints for it must be built
//! with the same comparator, otherwise the hints a resolver produces are not
//! guaranteed to be accepted.

/// A strict weak ordering over `V`.
pub trait Comparator<V: ?Sized> {
    /// Returns `true` when `a` orders strictly below `b`.
    fn less(&self, a: &V, b: &V) -> bool;

    /// Returns `true` when neither value orders below the other.
    fn ties(&self, a: &V, b: &V) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Orders values by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<V: Ord + ?Sized> Comparator<V> for NaturalOrder {
    fn less(&self, a: &V, b: &V) -> bool {
        a < b
    }
}

impl<V: ?Sized, F> Comparator<V> for F
where
    F: Fn(&V, &V) -> bool,
{
    fn less(&self, a: &V, b: &V) -> bool {
        self(a, b)
    }
}
