//! In-process simulated world for tests and offline inspection.
//!
//! [`SimWorld`] is a plain list of [`LiveObject`]s plus an optional observer.
//! It implements [`WorldSource`], so the whole cache can run headless: in
//! unit tests, in CI, and from the `scout` CLI against a JSON snapshot.
//!
//! # Example
//!
//! ```rust
//! use scout_tracker::sim::SimWorld;
//! use scout_tracker::WorldSource;
//! use scout_types::{CreatureKind, LiveObject, Vec3};
//!
//! let world = SimWorld::new()
//!     .with_observer(1, Vec3::ZERO)
//!     .with_object(LiveObject::creature(2, CreatureKind::Zombie, Vec3::new(4.0, 0.0, 0.0)));
//!
//! assert!(world.has_world());
//! assert_eq!(world.live_objects().count(), 1);
//! ```
//!
//! # Snapshot format
//!
//! ```json
//! {
//!   "loaded": true,
//!   "observer": { "id": 1, "position": { "x": 0.0, "y": 64.0, "z": 0.0 } },
//!   "objects": [
//!     { "id": 7, "position": { "x": 3.0, "y": 64.0, "z": 1.0 },
//!       "kind": { "type": "item_drop", "item": "stick" } }
//!   ]
//! }
//! ```

use std::path::Path;

use scout_types::{EntityId, LiveObject, ScoutError, Vec3};
use serde::{Deserialize, Serialize};

use crate::world::{Observer, WorldSource};

fn loaded_by_default() -> bool {
    true
}

/// A fully in-memory world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimWorld {
    #[serde(default = "loaded_by_default")]
    pub loaded: bool,
    #[serde(default)]
    pub observer: Option<Observer>,
    #[serde(default)]
    pub objects: Vec<LiveObject>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    /// A loaded world with no observer and no objects.
    pub fn new() -> Self {
        Self {
            loaded: true,
            observer: None,
            objects: Vec::new(),
        }
    }

    /// The "main menu": no world at all.
    pub fn unloaded() -> Self {
        Self {
            loaded: false,
            ..Self::new()
        }
    }

    pub fn with_observer(mut self, id: u64, position: Vec3) -> Self {
        self.observer = Some(Observer {
            id: EntityId(id),
            position,
        });
        self
    }

    pub fn with_object(mut self, object: LiveObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn with_objects(mut self, objects: impl IntoIterator<Item = LiveObject>) -> Self {
        self.objects.extend(objects);
        self
    }

    // ── Mutation, as the simulation thread would do it ───────────────────────

    pub fn spawn(&mut self, object: LiveObject) {
        self.objects.push(object);
    }

    /// Remove `id` from the world entirely. Returns the removed object.
    pub fn despawn(&mut self, id: EntityId) -> Option<LiveObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(idx))
    }

    /// Mark `id` dead while leaving it enumerable. Returns whether it existed.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.object_mut(id) {
            Some(o) => {
                o.alive = false;
                true
            }
            None => false,
        }
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut LiveObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn move_observer(&mut self, position: Vec3) {
        if let Some(observer) = &mut self.observer {
            observer.position = position;
        }
    }

    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    // ── Snapshots ────────────────────────────────────────────────────────────

    pub fn from_json(raw: &str) -> Result<Self, ScoutError> {
        serde_json::from_str(raw).map_err(|e| ScoutError::Snapshot(e.to_string()))
    }

    /// Read a JSON snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self, ScoutError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw).map_err(|e| match e {
            ScoutError::Snapshot(msg) => {
                ScoutError::Snapshot(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn to_json(&self) -> Result<String, ScoutError> {
        serde_json::to_string_pretty(self).map_err(|e| ScoutError::Snapshot(e.to_string()))
    }
}

impl WorldSource for SimWorld {
    fn has_world(&self) -> bool {
        self.loaded
    }

    fn observer(&self) -> Option<Observer> {
        self.observer
    }

    fn live_objects(&self) -> impl Iterator<Item = &LiveObject> {
        self.objects.iter()
    }

    fn is_alive(&self, id: EntityId) -> bool {
        self.objects.iter().any(|o| o.id == id && o.alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_types::{CreatureKind, ObjectKind};

    #[test]
    fn despawned_objects_are_not_alive() {
        let mut world = SimWorld::new().with_object(LiveObject::item_drop(3, "stick", Vec3::ZERO));
        assert!(world.is_alive(EntityId(3)));
        assert!(world.despawn(EntityId(3)).is_some());
        assert!(!world.is_alive(EntityId(3)));
        assert!(world.despawn(EntityId(3)).is_none());
    }

    #[test]
    fn killed_objects_stay_enumerable() {
        let mut world =
            SimWorld::new().with_object(LiveObject::creature(5, CreatureKind::Cow, Vec3::ZERO));
        assert!(world.kill(EntityId(5)));
        assert!(!world.is_alive(EntityId(5)));
        assert_eq!(world.live_objects().count(), 1);
        assert!(!world.kill(EntityId(99)));
    }

    #[test]
    fn move_observer_without_observer_is_a_no_op() {
        let mut world = SimWorld::new();
        world.move_observer(Vec3::new(1.0, 2.0, 3.0));
        assert!(world.observer().is_none());
    }

    #[test]
    fn snapshot_defaults_fill_missing_fields() {
        let raw = r#"{
            "observer": { "id": 1, "position": { "x": 0.0, "y": 64.0, "z": 0.0 } },
            "objects": [
                { "id": 7, "position": { "x": 3.0, "y": 64.0, "z": 1.0 },
                  "kind": { "type": "item_drop", "item": "stick" } },
                { "id": 8, "position": { "x": 1.0, "y": 64.0, "z": 1.0 },
                  "kind": { "type": "creature", "kind": "zombie" } }
            ]
        }"#;
        let world = SimWorld::from_json(raw).unwrap();
        assert!(world.loaded);
        assert_eq!(world.objects.len(), 2);
        assert!(world.objects.iter().all(|o| o.alive));
        assert!(matches!(
            world.objects[0].kind,
            ObjectKind::ItemDrop { count: 1, .. }
        ));
    }

    #[test]
    fn malformed_snapshot_is_a_snapshot_error() {
        let err = SimWorld::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ScoutError::Snapshot(_)));
    }

    #[test]
    fn json_round_trip_preserves_world() {
        let world = SimWorld::new()
            .with_observer(1, Vec3::new(0.0, 64.0, 0.0))
            .with_object(LiveObject::player(2, "Steve", Vec3::new(5.0, 64.0, 5.0)));
        let back = SimWorld::from_json(&world.to_json().unwrap()).unwrap();
        assert_eq!(back, world);
    }

    #[test]
    fn load_reports_missing_files_as_io() {
        let err = SimWorld::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ScoutError::Io(_)));
    }
}
