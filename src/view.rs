//! View / each-iterator: intersects several component storages, minus any
//! excluded ones, driven by whichever included storage is currently
//! smallest.

use crate::component::Component;
use crate::entity::Entity;
use crate::registry::Registry;
use std::marker::PhantomData;

/// Implemented for tuples of 1-8 component types. Generated by
/// `impl_view_tuple!` below, mirroring the arity-by-arity tuple trait
/// pattern used throughout this crate's query machinery.
pub trait ViewTuple<'r> {
    type Output;

    /// Creates empty storages for every named type that has never been used.
    fn ensure_storages(registry: &mut Registry);

    /// The dense id slice of whichever included storage is currently
    /// smallest - the axis the view iterates.
    fn driver_ids(registry: &'r Registry) -> &'r [Entity];

    fn contains_all(registry: &Registry, entity: Entity) -> bool;

    fn fetch(registry: &'r Registry, entity: Entity) -> Self::Output;
}

/// Implemented for the exclusion type list. `()` means "nothing excluded".
pub trait ExcludeTuple {
    fn ensure_storages(registry: &mut Registry);
    fn contains_any(registry: &Registry, entity: Entity) -> bool;
}

impl ExcludeTuple for () {
    fn ensure_storages(_registry: &mut Registry) {}

    fn contains_any(_registry: &Registry, _entity: Entity) -> bool {
        false
    }
}

macro_rules! impl_view_tuple {
    ($first:ident $(, $rest:ident)*) => {
        impl<'r, $first: Component, $($rest: Component),*> ViewTuple<'r> for ($first, $($rest,)*) {
            type Output = (Entity, &'r $first, $(&'r $rest),*);

            fn ensure_storages(registry: &mut Registry) {
                registry.ensure_storage::<$first>();
                $(registry.ensure_storage::<$rest>();)*
            }

            fn driver_ids(registry: &'r Registry) -> &'r [Entity] {
                let mut best_len = registry.storage_len::<$first>();
                let mut best = registry.storage_dense_ids::<$first>();

                $(
                    let len = registry.storage_len::<$rest>();
                    if len < best_len {
                        best_len = len;
                        best = registry.storage_dense_ids::<$rest>();
                    }
                )*

                best
            }

            fn contains_all(registry: &Registry, entity: Entity) -> bool {
                registry.contains::<$first>(entity) $(&& registry.contains::<$rest>(entity))*
            }

            fn fetch(registry: &'r Registry, entity: Entity) -> Self::Output {
                (
                    entity,
                    registry
                        .try_get::<$first>(entity)
                        .expect("view: entity unexpectedly missing component during fetch"),
                    $(registry
                        .try_get::<$rest>(entity)
                        .expect("view: entity unexpectedly missing component during fetch")),*
                )
            }
        }

        impl<$first: Component, $($rest: Component),*> ExcludeTuple for ($first, $($rest,)*) {
            fn ensure_storages(registry: &mut Registry) {
                registry.ensure_storage::<$first>();
                $(registry.ensure_storage::<$rest>();)*
            }

            fn contains_any(registry: &Registry, entity: Entity) -> bool {
                registry.contains::<$first>(entity) $(|| registry.contains::<$rest>(entity))*
            }
        }
    };
}

impl_view_tuple!(A);
impl_view_tuple!(A, B);
impl_view_tuple!(A, B, C);
impl_view_tuple!(A, B, C, D);
impl_view_tuple!(A, B, C, D, E);
impl_view_tuple!(A, B, C, D, E, F);
impl_view_tuple!(A, B, C, D, E, F, G);
impl_view_tuple!(A, B, C, D, E, F, G, H);

/// Lazy intersection of the component types in `T`, minus any in `E`.
pub struct View<'r, T, E = ()> {
    registry: &'r Registry,
    _marker: PhantomData<(T, E)>,
}

impl<'r, T, E> View<'r, T, E>
where
    T: ViewTuple<'r>,
    E: ExcludeTuple,
{
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            _marker: PhantomData,
        }
    }

    /// Iterates matching entity ids.
    pub fn iter(&self) -> ViewIter<'r, T, E> {
        ViewIter {
            registry: self.registry,
            ids: T::driver_ids(self.registry).iter(),
            _marker: PhantomData,
        }
    }

    /// Iterates `(entity, &T1, .., &Tn)` tuples, fetching each component
    /// fresh from its storage on every step.
    pub fn each(&self) -> EachIter<'r, T, E> {
        EachIter { inner: self.iter() }
    }
}

impl<'r, T, E> IntoIterator for View<'r, T, E>
where
    T: ViewTuple<'r>,
    E: ExcludeTuple,
{
    type Item = Entity;
    type IntoIter = ViewIter<'r, T, E>;

    fn into_iter(self) -> Self::IntoIter {
        ViewIter {
            registry: self.registry,
            ids: T::driver_ids(self.registry).iter(),
            _marker: PhantomData,
        }
    }
}

pub struct ViewIter<'r, T, E> {
    registry: &'r Registry,
    ids: std::slice::Iter<'r, Entity>,
    _marker: PhantomData<(T, E)>,
}

impl<'r, T, E> Iterator for ViewIter<'r, T, E>
where
    T: ViewTuple<'r>,
    E: ExcludeTuple,
{
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        for &id in self.ids.by_ref() {
            if T::contains_all(self.registry, id) && !E::contains_any(self.registry, id) {
                return Some(id);
            }
        }
        None
    }
}

pub struct EachIter<'r, T: ViewTuple<'r>, E> {
    inner: ViewIter<'r, T, E>,
}

impl<'r, T, E> Iterator for EachIter<'r, T, E>
where
    T: ViewTuple<'r>,
    E: ExcludeTuple,
{
    type Item = T::Output;

    fn next(&mut self) -> Option<T::Output> {
        let id = self.inner.next()?;
        Some(T::fetch(self.inner.registry, id))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Component, Registry};

    #[derive(Debug)]
    struct A(i32);
    impl Component for A {}
    #[derive(Debug)]
    struct B(i32);
    impl Component for B {}
    #[derive(Debug)]
    struct X;
    impl Component for X {}

    #[test]
    fn single_type_view_iterates_dense_order() {
        let mut registry = Registry::new();
        let mut evens = Vec::new();
        for i in 0..100 {
            let e = registry.create();
            if i % 2 == 0 {
                registry.emplace(e, A(i));
                evens.push(e);
            }
        }

        let seen: Vec<_> = registry.view::<(A,)>().iter().collect();
        assert_eq!(seen, evens);
    }

    #[test]
    fn two_type_intersection() {
        let mut registry = Registry::new();
        let entities: Vec<_> = (0..10).map(|_| registry.create()).collect();
        for &e in &entities[0..6] {
            registry.emplace(e, A(0));
        }
        for &e in &entities[3..9] {
            registry.emplace(e, B(0));
        }

        let mut seen: Vec<_> = registry.view::<(A, B)>().iter().map(|e| e.id()).collect();
        seen.sort();
        assert_eq!(seen, vec![3, 4, 5]);
    }

    #[test]
    fn exclusion_removes_matches() {
        let mut registry = Registry::new();
        let entities: Vec<_> = (0..10).map(|_| registry.create()).collect();
        for &e in &entities[0..6] {
            registry.emplace(e, A(0));
        }
        for &e in &entities[3..9] {
            registry.emplace(e, B(0));
        }
        registry.emplace(entities[4], X);

        let mut seen: Vec<_> = registry
            .view_with_exclude::<(A, B), (X,)>()
            .iter()
            .map(|e| e.id())
            .collect();
        seen.sort();
        assert_eq!(seen, vec![3, 5]);
    }

    #[test]
    fn each_fetches_matching_components() {
        let mut registry = Registry::new();
        let e1 = registry.create();
        registry.emplace(e1, A(1));
        registry.emplace(e1, B(2));
        let e2 = registry.create();
        registry.emplace(e2, A(3));

        let mut total = 0;
        for (_, a, b) in registry.view::<(A, B)>().each() {
            total += a.0 + b.0;
        }
        assert_eq!(total, 3);
    }

    #[test]
    fn view_over_unused_type_is_empty() {
        let mut registry = Registry::new();
        registry.create();
        assert_eq!(registry.view::<(A,)>().iter().count(), 0);
    }
}
