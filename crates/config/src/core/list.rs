//! Ordered source list

use super::equivalence::{EqualsEquivalence, Equivalence};
use super::insertion::{ListInsertionStep, Precedence, PrecedenceOrderStep, check_no_duplicates};
use super::source::{NamedSource, SourceName, name_of};
use super::ConfigResult;
use std::fmt;
use std::sync::Arc;

/// Placement step that produces a new [`SourceList`]
pub type SourceListInsertion = ListInsertionStep<SourceList, NamedSource, SourceName>;

/// Named sources ordered from highest to lowest precedence.
///
/// The list is immutable: every edit returns a new list and leaves the
/// receiver as it was. No two sources share a name under the list's
/// equivalence.
#[derive(Clone)]
pub struct SourceList {
    sources: Arc<[NamedSource]>,
    equivalence: Arc<dyn Equivalence<SourceName>>,
}

impl SourceList {
    /// Empty list comparing names with `==`
    pub fn new() -> Self {
        Self::with_equivalence(Arc::new(EqualsEquivalence::<SourceName>::new()))
    }

    /// Empty list comparing names with `equivalence`
    pub fn with_equivalence(equivalence: Arc<dyn Equivalence<SourceName>>) -> Self {
        Self {
            sources: Arc::from(Vec::new()),
            equivalence,
        }
    }

    /// Empty list sharing `other`'s equivalence
    pub fn with_equivalence_of(other: &SourceList) -> Self {
        Self::with_equivalence(Arc::clone(&other.equivalence))
    }

    /// Build a list from sources given in `precedence` order
    pub fn from_sources(
        sources: Vec<NamedSource>,
        precedence: Precedence,
    ) -> ConfigResult<SourceList> {
        Self::new().insert(sources).with(precedence).at_beginning()
    }

    fn wrap(&self, sources: Vec<NamedSource>) -> SourceList {
        Self {
            sources: Arc::from(sources),
            equivalence: Arc::clone(&self.equivalence),
        }
    }

    /// Start inserting `sources`; choose their order, then their placement
    pub fn insert(&self, sources: Vec<NamedSource>) -> PrecedenceOrderStep<SourceListInsertion, NamedSource> {
        let this = self.clone();
        ListInsertionStep::prepare(
            self.sources.to_vec(),
            sources,
            name_of,
            Arc::clone(&self.equivalence),
            move |sources| this.wrap(sources),
        )
    }

    /// Insert `sources` as the new highest-precedence prefix
    pub fn insert_at_beginning(
        &self,
        sources: Vec<NamedSource>,
        precedence: Precedence,
    ) -> ConfigResult<SourceList> {
        self.insert(sources).with(precedence).at_beginning()
    }

    /// Insert `sources` as the new lowest-precedence suffix
    pub fn insert_at_end(
        &self,
        sources: Vec<NamedSource>,
        precedence: Precedence,
    ) -> ConfigResult<SourceList> {
        self.insert(sources).with(precedence).at_end()
    }

    /// Insert `sources` immediately above the source named `name`
    pub fn insert_before(
        &self,
        name: &SourceName,
        sources: Vec<NamedSource>,
        precedence: Precedence,
    ) -> ConfigResult<SourceList> {
        self.insert(sources).with(precedence).before(name)
    }

    /// Insert `sources` immediately below the source named `name`
    pub fn insert_after(
        &self,
        name: &SourceName,
        sources: Vec<NamedSource>,
        precedence: Precedence,
    ) -> ConfigResult<SourceList> {
        self.insert(sources).with(precedence).after(name)
    }

    /// Put `sources` in place of the source named `name`
    pub fn replace(
        &self,
        name: &SourceName,
        sources: Vec<NamedSource>,
        precedence: Precedence,
    ) -> ConfigResult<SourceList> {
        self.insert(sources).with(precedence).replacing(name)
    }

    /// Drop every source named `name`; an absent name is not an error
    #[must_use = "remove returns a new list"]
    pub fn remove(&self, name: &SourceName) -> SourceList {
        let kept: Vec<NamedSource> = self
            .sources
            .iter()
            .filter(|s| !self.equivalence.equivalent(s.name(), name))
            .cloned()
            .collect();
        if kept.len() != self.sources.len() {
            tracing::trace!(action = "remove", source = %name, "Removed source from list");
        }
        self.wrap(kept)
    }

    /// Sources from highest to lowest precedence
    pub fn from_highest_to_lowest_precedence(&self) -> &[NamedSource] {
        &self.sources
    }

    /// Iterate from highest to lowest precedence
    pub fn iter(&self) -> std::slice::Iter<'_, NamedSource> {
        self.sources.iter()
    }

    /// Source names from highest to lowest precedence
    pub fn names(&self) -> Vec<SourceName> {
        self.sources.iter().map(|s| s.name().clone()).collect()
    }

    /// Source named `name`, if present
    pub fn get(&self, name: &SourceName) -> Option<&NamedSource> {
        self.sources
            .iter()
            .find(|s| self.equivalence.equivalent(s.name(), name))
    }

    /// Whether a source named `name` is present
    pub fn contains(&self, name: &SourceName) -> bool {
        self.get(name).is_some()
    }

    /// Number of sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the list has no sources
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Re-check the uniqueness invariant
    pub fn validate(&self) -> ConfigResult<()> {
        check_no_duplicates(&self.sources, name_of, &*self.equivalence)
    }
}

impl Default for SourceList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a SourceList {
    type Item = &'a NamedSource;
    type IntoIter = std::slice::Iter<'a, NamedSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for SourceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sources.iter().map(NamedSource::name)).finish()
    }
}

impl fmt::Display for SourceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, source) in self.sources.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{source}")?;
        }
        f.write_str("]")
    }
}
