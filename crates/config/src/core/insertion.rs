//! Two-stage insertion into ordered lists
//!
//! Inserting a batch is negotiated in two steps. The caller first fixes the
//! batch's internal order with a [`PrecedenceOrderStep`], then picks where
//! the batch lands in the existing list with a [`ListInsertionStep`]. The
//! splicing and duplicate checking live here once; callers vary only the
//! identifier projection and the function that wraps the final list.

use super::equivalence::{Equivalence, EquivalenceKey};
use super::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Order in which a batch of elements is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// First element has the highest precedence
    #[default]
    HighestToLowest,
    /// First element has the lowest precedence
    LowestToHighest,
}

impl Precedence {
    /// Put `elements` into highest-to-lowest order
    pub fn normalize<E>(self, mut elements: Vec<E>) -> Vec<E> {
        if self == Precedence::LowestToHighest {
            elements.reverse();
        }
        elements
    }
}

/// First step: declare the order of the elements being added.
#[must_use = "choose a precedence to continue"]
pub struct PrecedenceOrderStep<T, E> {
    elements: Vec<E>,
    next: Box<dyn FnOnce(Vec<E>) -> T>,
}

impl<T, E> PrecedenceOrderStep<T, E> {
    /// Stage `elements`; `next` receives them in highest-to-lowest order
    pub fn new(elements: Vec<E>, next: impl FnOnce(Vec<E>) -> T + 'static) -> Self {
        Self {
            elements,
            next: Box::new(next),
        }
    }

    /// The elements were given highest precedence first
    pub fn from_highest_to_lowest_precedence(self) -> T {
        self.with(Precedence::HighestToLowest)
    }

    /// The elements were given lowest precedence first
    pub fn from_lowest_to_highest_precedence(self) -> T {
        self.with(Precedence::LowestToHighest)
    }

    /// The elements were given in `precedence` order
    pub fn with(self, precedence: Precedence) -> T {
        (self.next)(precedence.normalize(self.elements))
    }
}

impl<T, E: fmt::Debug> fmt::Debug for PrecedenceOrderStep<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrecedenceOrderStep")
            .field("elements", &self.elements)
            .finish_non_exhaustive()
    }
}

/// Second step: place an order-fixed batch relative to the existing list.
///
/// Every placement checks afterwards that no two elements share an
/// identifier, and hands the spliced list to the wrap function.
#[must_use = "choose a placement to finish the insertion"]
pub struct ListInsertionStep<R, E, I: ?Sized> {
    current: Vec<E>,
    inserted: Vec<E>,
    identify: fn(&E) -> &I,
    equivalence: Arc<dyn Equivalence<I>>,
    wrap: Box<dyn FnOnce(Vec<E>) -> R>,
}

impl<R, E, I> ListInsertionStep<R, E, I>
where
    R: 'static,
    E: 'static,
    I: fmt::Display + ?Sized + 'static,
{
    /// Start inserting `inserted` into `current`.
    ///
    /// Returns the precedence step; its result is the placement step.
    pub fn prepare(
        current: Vec<E>,
        inserted: Vec<E>,
        identify: fn(&E) -> &I,
        equivalence: Arc<dyn Equivalence<I>>,
        wrap: impl FnOnce(Vec<E>) -> R + 'static,
    ) -> PrecedenceOrderStep<Self, E> {
        PrecedenceOrderStep::new(inserted, move |inserted| Self {
            current,
            inserted,
            identify,
            equivalence,
            wrap: Box::new(wrap),
        })
    }

    /// Batch becomes the highest-precedence prefix
    pub fn at_beginning(self) -> ConfigResult<R> {
        self.splice(0, 0)
    }

    /// Batch becomes the lowest-precedence suffix
    pub fn at_end(self) -> ConfigResult<R> {
        let end = self.current.len();
        self.splice(end, end)
    }

    /// Batch lands immediately above the element identified by `id`
    pub fn before(self, id: &I) -> ConfigResult<R> {
        let index = self.position(id)?;
        self.splice(index, index)
    }

    /// Batch lands immediately below the element identified by `id`
    pub fn after(self, id: &I) -> ConfigResult<R> {
        let index = self.position(id)? + 1;
        self.splice(index, index)
    }

    /// Batch takes the place of the element identified by `id`
    pub fn replacing(self, id: &I) -> ConfigResult<R> {
        let index = self.position(id)?;
        self.splice(index, index + 1)
    }

    /// Apply `f` to whatever the wrap function produces
    pub fn map_result<R2: 'static>(
        self,
        f: impl FnOnce(R) -> R2 + 'static,
    ) -> ListInsertionStep<R2, E, I> {
        let wrap = self.wrap;
        ListInsertionStep {
            current: self.current,
            inserted: self.inserted,
            identify: self.identify,
            equivalence: self.equivalence,
            wrap: Box::new(move |elements| f(wrap(elements))),
        }
    }

    /// Elements already in the list
    pub fn current(&self) -> &[E] {
        &self.current
    }

    /// Elements being inserted, highest precedence first
    pub fn inserted(&self) -> &[E] {
        &self.inserted
    }

    /// First element matching `id`, looked up before any splicing
    fn position(&self, id: &I) -> ConfigResult<usize> {
        self.current
            .iter()
            .position(|e| self.equivalence.equivalent((self.identify)(e), id))
            .ok_or_else(|| ConfigError::no_such_identifier(id.to_string()))
    }

    /// Replace `current[start..end]` with the batch
    fn splice(self, start: usize, end: usize) -> ConfigResult<R> {
        let Self {
            mut current,
            inserted,
            identify,
            equivalence,
            wrap,
        } = self;
        current.splice(start..end, inserted);
        Self::finish(current, identify, &*equivalence, wrap)
    }

    fn finish(
        elements: Vec<E>,
        identify: fn(&E) -> &I,
        equivalence: &dyn Equivalence<I>,
        wrap: Box<dyn FnOnce(Vec<E>) -> R>,
    ) -> ConfigResult<R> {
        check_no_duplicates(&elements, identify, equivalence)?;
        Ok(wrap(elements))
    }
}

impl<R, E: fmt::Debug, I: ?Sized> fmt::Debug for ListInsertionStep<R, E, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListInsertionStep")
            .field("current", &self.current)
            .field("inserted", &self.inserted)
            .finish_non_exhaustive()
    }
}

/// Fail with the first identifier that occurs twice in `elements`
pub fn check_no_duplicates<E, I>(
    elements: &[E],
    identify: fn(&E) -> &I,
    equivalence: &dyn Equivalence<I>,
) -> ConfigResult<()>
where
    I: fmt::Display + ?Sized,
{
    let mut seen = HashSet::with_capacity(elements.len());
    for element in elements {
        let id = identify(element);
        if !seen.insert(EquivalenceKey::new(id, equivalence)) {
            return Err(ConfigError::duplicate_identifier(id.to_string()));
        }
    }
    Ok(())
}
