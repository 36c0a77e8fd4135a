//! Capability bindings handed to sources at load time
//!
//! A [`Bindings`] value maps a type to exactly one instance of that type.
//! Sources pull optional capabilities (parse options, a resource loader, the
//! tree resolved so far) out of it and fall back to defaults when absent.

use super::{ParseOptions, ResolveOptions, Tree};
use crate::loaders::{DirectoryResources, ResourceLoader};
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
struct Binding {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// Immutable type-keyed capability map.
///
/// Every modifier returns a new value; the receiver is never changed, so a
/// `Bindings` can be shared freely between threads.
#[derive(Clone, Default)]
pub struct Bindings {
    entries: Arc<HashMap<TypeId, Binding>>,
}

/// The tree resolved by the previous load pass.
///
/// Bound by [`crate::ConfigFactory::load`] between its two passes so that
/// sources can read settings produced by other sources.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrentTree(pub Tree);

impl CurrentTree {
    /// The wrapped tree
    pub fn tree(&self) -> &Tree {
        &self.0
    }
}

impl Bindings {
    /// Bindings with nothing bound
    pub fn none() -> Self {
        Self::default()
    }

    /// The default capability set.
    ///
    /// Binds a [`ResourceLoader`] over the working directory (when it can be
    /// determined), default [`ParseOptions`] and [`ResolveOptions`], and an
    /// empty [`CurrentTree`].
    pub fn defaults() -> Self {
        let mut bindings = Self::none()
            .set(ParseOptions::defaults())
            .set(ResolveOptions::defaults())
            .set(CurrentTree(Tree::empty()));

        match std::env::current_dir() {
            Ok(dir) => {
                let loader: Arc<dyn ResourceLoader> = Arc::new(DirectoryResources::new([dir]));
                bindings = bindings.set(loader);
            }
            Err(e) => {
                tracing::debug!(error = %e, "No working directory, resource loader left unbound");
            }
        }
        bindings
    }

    /// The instance bound for `T`, if any
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|binding| Arc::clone(&binding.value).downcast::<T>().ok())
    }

    /// Whether something is bound for `T`
    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// A copy with `value` bound for `T`, replacing any previous binding
    #[must_use = "bindings are immutable, use the returned value"]
    pub fn set<T>(&self, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.set_arc(Arc::new(value))
    }

    /// Like [`Bindings::set`] for an already shared instance
    #[must_use = "bindings are immutable, use the returned value"]
    pub fn set_arc<T>(&self, value: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        let mut entries = (*self.entries).clone();
        entries.insert(
            TypeId::of::<T>(),
            Binding {
                type_name: type_name::<T>(),
                value,
            },
        );
        Self {
            entries: Arc::new(entries),
        }
    }

    /// A copy without a binding for `T`
    #[must_use = "bindings are immutable, use the returned value"]
    pub fn remove<T: Any>(&self) -> Self {
        if !self.contains::<T>() {
            return self.clone();
        }
        let mut entries = (*self.entries).clone();
        entries.remove(&TypeId::of::<T>());
        Self {
            entries: Arc::new(entries),
        }
    }

    /// A copy holding both sets of bindings; entries of `other` win
    #[must_use = "bindings are immutable, use the returned value"]
    pub fn merge(&self, other: &Bindings) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let mut entries = (*self.entries).clone();
        entries.extend(
            other
                .entries
                .iter()
                .map(|(id, binding)| (*id, binding.clone())),
        );
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Number of bound capabilities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type names of the bound capabilities, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|b| b.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_names()).finish()
    }
}
