//! Sparse-set entity-component-system registry.
//!
//! A [`Registry`] owns entities (bare, non-generational integers) and their
//! components, stored one sparse set per component type. [`View`]s iterate
//! the intersection of several component types (optionally excluding
//! others) by driving from whichever included storage is currently
//! smallest. Components may opt into lifecycle hooks (`start`, `update`,
//! collision/trigger callbacks) by implementing the corresponding
//! [`Component`] methods; types that don't override them pay no runtime
//! branch for the absence.
//!
//! # Example
//! ```
//! use covey::{Component, Registry};
//!
//! #[derive(Debug)]
//! struct Position { x: f32, y: f32 }
//! impl Component for Position {}
//!
//! #[derive(Debug)]
//! struct Velocity { x: f32, y: f32 }
//! impl Component for Velocity {}
//!
//! let mut registry = Registry::new();
//! let e = registry.create();
//! registry.emplace(e, Position { x: 0.0, y: 0.0 });
//! registry.emplace(e, Velocity { x: 1.0, y: 0.0 });
//!
//! for (entity, pos, vel) in registry.view::<(Position, Velocity)>().each() {
//!     let _ = (entity, pos, vel);
//! }
//! ```

mod component;
mod context;
mod entity;
mod heap;
mod reference;
mod registry;
mod sparse_set;
mod storage;
mod type_id;
mod view;

pub use component::Component;
pub use context::UpdateContext;
pub use entity::Entity;
pub use reference::Reference;
pub use registry::{EntityIter, Registry};
pub use view::{EachIter, ExcludeTuple, View, ViewIter, ViewTuple};

/// Re-exports for `use covey::prelude::*;`.
pub mod prelude {
    pub use crate::{Component, Entity, Reference, Registry, UpdateContext, View};
}
