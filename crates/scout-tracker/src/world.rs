//! The seam between the cache and the live world.
//!
//! The live world is owned and mutated by the simulation thread. It is shared
//! with the cache as a [`SharedWorld`]: the simulation takes the write lock to
//! mutate, the cache takes the read lock to enumerate. Everything the cache
//! knows about live objects is read through [`WorldSource`].

use std::sync::{Arc, RwLock};

use scout_types::{EntityId, LiveObject, Vec3};
use serde::{Deserialize, Serialize};

/// The agent doing the observing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Identity of the object the agent controls.
    pub id: EntityId,
    pub position: Vec3,
}

/// Read access to the live world.
pub trait WorldSource: Send + Sync {
    /// `false` while no world is loaded (menus, between dimensions, ...).
    fn has_world(&self) -> bool;

    /// The observing agent, if it is currently in the world.
    fn observer(&self) -> Option<Observer>;

    /// Every dynamic object, in the world's own enumeration order.
    fn live_objects(&self) -> impl Iterator<Item = &LiveObject>;

    /// Whether `id` is still alive right now.
    fn is_alive(&self, id: EntityId) -> bool;
}

/// The world behind the global read/write lock shared with the simulation.
pub type SharedWorld<W> = Arc<RwLock<W>>;

/// Wrap `world` in a fresh [`SharedWorld`].
pub fn share<W: WorldSource>(world: W) -> SharedWorld<W> {
    Arc::new(RwLock::new(world))
}
