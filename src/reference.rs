//! Rebindable handle to a component.

use crate::entity::Entity;
use crate::storage::Container;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A handle `(entity, storage)` that re-resolves on every dereference
/// rather than caching a pointer to the component value itself, since
/// removal elsewhere in the same storage can relocate any element via
/// swap-with-back.
///
/// Carries a raw pointer to the `Container<T>` the registry lazily created
/// for `T`: that allocation is heap-owned by the registry and never moves
/// or frees for as long as the registry that created it is alive, so the
/// pointer stays valid across any structural change to *other* component
/// types, or to this storage's own internal layout. It does not stay valid
/// past the owning registry's lifetime.
pub struct Reference<T> {
    entity: Entity,
    container: Option<*mut Container<T>>,
}

impl<T> Reference<T> {
    pub(crate) fn new(entity: Entity, container: *mut Container<T>) -> Self {
        Self {
            entity,
            container: Some(container),
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn is_valid(&self) -> bool {
        match self.container {
            Some(ptr) => !self.entity.is_null() && unsafe { (*ptr).contains(self.entity) },
            None => false,
        }
    }

    pub fn get(&self) -> &T {
        assert!(self.is_valid(), "Reference: dereferencing an invalid reference");
        unsafe { (*self.container.unwrap()).get(self.entity) }
    }

    pub fn get_mut(&mut self) -> &mut T {
        assert!(self.is_valid(), "Reference: dereferencing an invalid reference");
        unsafe { (*self.container.unwrap()).get_mut(self.entity) }
    }
}

impl<T> Default for Reference<T> {
    fn default() -> Self {
        Self {
            entity: Entity::NULL,
            container: None,
        }
    }
}

impl<T> Clone for Reference<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Reference<T> {}

impl<T> PartialEq for Reference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity && self.container == other.container
    }
}

impl<T> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("entity", &self.entity)
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl<T> Deref for Reference<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T> DerefMut for Reference<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Component, Registry};

    #[derive(Debug)]
    struct Health(i32);
    impl Component for Health {}

    #[test]
    fn default_reference_is_invalid() {
        let r: crate::Reference<Health> = Default::default();
        assert!(!r.is_valid());
    }

    #[test]
    fn reference_tracks_relocation() {
        let mut registry = Registry::new();
        let a = registry.create();
        let b = registry.create();
        registry.emplace(a, Health(1));
        registry.emplace(b, Health(2));

        let reference = registry.create_reference::<Health>(a);
        assert!(reference.is_valid());
        assert_eq!(reference.get().0, 1);

        // Removing b swaps a's slot if a is not last; either way, a's
        // reference must still resolve to a's own value.
        registry.remove::<Health>(b);
        assert!(reference.is_valid());
        assert_eq!(reference.get().0, 1);
    }

    #[test]
    fn reference_invalid_after_destroy() {
        let mut registry = Registry::new();
        let a = registry.create();
        registry.emplace(a, Health(1));
        let reference = registry.create_reference::<Health>(a);
        registry.destroy(a);
        assert!(!reference.is_valid());
    }
}
