//! Component trait.
//!
//! A component has no runtime behavior beyond storage unless it opts into
//! one of the hooks below: one supertrait bound for identity plus several
//! defaulted no-op methods, so dispatch at the storage level is a direct,
//! statically resolved call rather than a runtime "does T implement this"
//! check.
use crate::context::UpdateContext;
use crate::entity::Entity;
use std::any::Any;
use std::fmt::Debug;

pub trait Component: Any + Send + Sync + Debug {
    /// Called once per component instance by `Registry::start`.
    fn start(&mut self) {}

    /// Called once per component instance by `Registry::update`.
    fn update(&mut self, ctx: &mut UpdateContext) {
        let _ = ctx;
    }

    fn on_collision_enter(&mut self, other: Entity) {
        let _ = other;
    }

    fn on_collision_exit(&mut self, other: Entity) {
        let _ = other;
    }

    fn on_trigger_enter(&mut self, other: Entity) {
        let _ = other;
    }

    fn on_trigger_exit(&mut self, other: Entity) {
        let _ = other;
    }
}
