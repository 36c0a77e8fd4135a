//! Pluggable equality over identifiers
//!
//! Ordered lists compare their elements by a derived identifier rather than
//! by structural equality. The comparison is an [`Equivalence`] value handed
//! to the list, so identifier types never need a particular `Eq` impl.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::marker::PhantomData;

/// An equality relation with a compatible hash.
///
/// Implementations must guarantee that `equivalent(a, b)` implies
/// `hash_of(a) == hash_of(b)`.
pub trait Equivalence<A: ?Sized>: Send + Sync {
    /// Whether `a` and `b` denote the same identifier
    fn equivalent(&self, a: &A, b: &A) -> bool;

    /// Hash of `value`, consistent with [`Equivalence::equivalent`]
    fn hash_of(&self, value: &A) -> u64;
}

/// Equivalence that delegates to `Eq` and `Hash`.
pub struct EqualsEquivalence<A: ?Sized>(PhantomData<fn(&A)>);

impl<A: ?Sized> EqualsEquivalence<A> {
    /// Create the equivalence
    pub const fn new() -> Self {
        Self(PhantomData)
    }

    /// Compare values of type `B` by projecting them onto `A` first.
    pub const fn map<B: ?Sized>(self, project: fn(&B) -> &A) -> MappedEquivalence<B, A> {
        MappedEquivalence {
            project,
            inner: self,
        }
    }
}

impl<A: ?Sized> Default for EqualsEquivalence<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> Clone for EqualsEquivalence<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ?Sized> Copy for EqualsEquivalence<A> {}

impl<A: ?Sized> std::fmt::Debug for EqualsEquivalence<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EqualsEquivalence")
    }
}

impl<A> Equivalence<A> for EqualsEquivalence<A>
where
    A: Eq + Hash + ?Sized,
{
    fn equivalent(&self, a: &A, b: &A) -> bool {
        a == b
    }

    fn hash_of(&self, value: &A) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }
}

/// Equivalence over `B` derived from [`EqualsEquivalence`] over a projection.
pub struct MappedEquivalence<B: ?Sized, A: ?Sized> {
    project: fn(&B) -> &A,
    inner: EqualsEquivalence<A>,
}

impl<B: ?Sized, A: ?Sized> Clone for MappedEquivalence<B, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized, A: ?Sized> Copy for MappedEquivalence<B, A> {}

impl<B: ?Sized, A: ?Sized> std::fmt::Debug for MappedEquivalence<B, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MappedEquivalence")
    }
}

impl<B, A> Equivalence<B> for MappedEquivalence<B, A>
where
    B: ?Sized,
    A: Eq + Hash + ?Sized,
{
    fn equivalent(&self, a: &B, b: &B) -> bool {
        self.inner.equivalent((self.project)(a), (self.project)(b))
    }

    fn hash_of(&self, value: &B) -> u64 {
        self.inner.hash_of((self.project)(value))
    }
}

/// String equivalence that ignores ASCII case.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreAsciiCase;

impl Equivalence<str> for IgnoreAsciiCase {
    fn equivalent(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    fn hash_of(&self, value: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        for byte in value.bytes() {
            hasher.write_u8(byte.to_ascii_lowercase());
        }
        hasher.finish()
    }
}

/// A value paired with an equivalence so it can live in a `HashSet`.
pub struct EquivalenceKey<'a, A: ?Sized> {
    value: &'a A,
    equivalence: &'a dyn Equivalence<A>,
}

impl<'a, A: ?Sized> EquivalenceKey<'a, A> {
    /// Wrap `value` under `equivalence`
    pub fn new(value: &'a A, equivalence: &'a dyn Equivalence<A>) -> Self {
        Self { value, equivalence }
    }

    /// The wrapped value
    pub fn value(&self) -> &'a A {
        self.value
    }
}

impl<A: ?Sized> PartialEq for EquivalenceKey<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        self.equivalence.equivalent(self.value, other.value)
    }
}

impl<A: ?Sized> Eq for EquivalenceKey<'_, A> {}

impl<A: ?Sized> Hash for EquivalenceKey<'_, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.equivalence.hash_of(self.value));
    }
}
