//! Update context passed to every component's `update` hook.

use crate::entity::Entity;

/// Carries what a component's `update` hook is allowed to touch: the
/// elapsed time, an opaque handle to host services, and a channel to queue
/// its own entity's destruction for the end of the current tick.
pub struct UpdateContext<'a> {
    pub time_delta: f32,
    pub external_services: Option<*mut ()>,
    deferred: &'a mut Vec<Entity>,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(
        time_delta: f32,
        external_services: Option<*mut ()>,
        deferred: &'a mut Vec<Entity>,
    ) -> Self {
        Self {
            time_delta,
            external_services,
            deferred,
        }
    }

    /// Queues `entity` for destruction at the end of the registry's current
    /// `update` call, after every storage has been dispatched to.
    pub fn late_destroy(&mut self, entity: Entity) {
        self.deferred.push(entity);
    }
}
