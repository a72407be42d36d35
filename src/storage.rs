//! Type-erased component storage.

use crate::component::Component;
use crate::context::UpdateContext;
use crate::entity::Entity;
use crate::sparse_set::SparseSet;
use std::any::Any;

/// Capability interface the registry talks to without naming the concrete
/// component type it stores.
pub trait Storage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn contains(&self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn dense_ids(&self) -> &[Entity];
    fn destroy(&mut self, entity: Entity);
    fn type_name(&self) -> &'static str;
    fn debug_entry(&self, entity: Entity) -> Option<String>;

    fn start(&mut self);
    fn update(&mut self, ctx: &mut UpdateContext);
    fn on_collision_enter(&mut self, owner: Entity, other: Entity);
    fn on_collision_exit(&mut self, owner: Entity, other: Entity);
    fn on_trigger_enter(&mut self, owner: Entity, other: Entity);
    fn on_trigger_exit(&mut self, owner: Entity, other: Entity);
}

/// Concrete storage for one component type. Wraps a `SparseSet<Entity, T>`
/// and dispatches lifecycle hooks over its elements; collision/trigger
/// hooks target only the owning entity's value rather than every stored
/// component.
pub struct Container<T> {
    set: SparseSet<Entity, T>,
}

impl<T> Container<T> {
    pub fn new() -> Self {
        Self { set: SparseSet::new() }
    }

    pub fn emplace(&mut self, entity: Entity, value: T) -> &mut T {
        self.set.emplace(entity, value)
    }

    pub fn get(&self, entity: Entity) -> &T {
        self.set
            .get(entity)
            .expect("get: entity has no such component")
    }

    pub fn get_mut(&mut self, entity: Entity) -> &mut T {
        self.set
            .get_mut(entity)
            .expect("get: entity has no such component")
    }

    pub fn try_get(&self, entity: Entity) -> Option<&T> {
        self.set.get(entity)
    }

    pub fn try_get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.set.get_mut(entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.set.contains(entity)
    }

    pub fn remove(&mut self, entity: Entity) {
        self.set.remove(entity);
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn dense_ids(&self) -> &[Entity] {
        self.set.dense_ids()
    }

    pub fn entity_of(&self, value: &T) -> Entity {
        self.set.key_of(value)
    }
}

impl<T> Default for Container<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> Storage for Container<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn contains(&self, entity: Entity) -> bool {
        Container::contains(self, entity)
    }

    fn len(&self) -> usize {
        Container::len(self)
    }

    fn dense_ids(&self) -> &[Entity] {
        Container::dense_ids(self)
    }

    fn destroy(&mut self, entity: Entity) {
        if self.set.contains(entity) {
            self.set.remove(entity);
        }
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn debug_entry(&self, entity: Entity) -> Option<String> {
        self.set.get(entity).map(|v| format!("{:?}", v))
    }

    fn start(&mut self) {
        for value in self.set.values_mut() {
            value.start();
        }
    }

    fn update(&mut self, ctx: &mut UpdateContext) {
        for value in self.set.values_mut() {
            value.update(ctx);
        }
    }

    fn on_collision_enter(&mut self, owner: Entity, other: Entity) {
        if let Some(value) = self.set.get_mut(owner) {
            value.on_collision_enter(other);
        }
    }

    fn on_collision_exit(&mut self, owner: Entity, other: Entity) {
        if let Some(value) = self.set.get_mut(owner) {
            value.on_collision_exit(other);
        }
    }

    fn on_trigger_enter(&mut self, owner: Entity, other: Entity) {
        if let Some(value) = self.set.get_mut(owner) {
            value.on_trigger_enter(other);
        }
    }

    fn on_trigger_exit(&mut self, owner: Entity, other: Entity) {
        if let Some(value) = self.set.get_mut(owner) {
            value.on_trigger_exit(other);
        }
    }
}
