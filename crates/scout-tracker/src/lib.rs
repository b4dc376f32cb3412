//! # scout-tracker
//!
//! The observation cache: a lazily refreshed, thread-safe snapshot of every
//! dynamic object in the world, organised for the queries an autonomous
//! agent's behaviour layer asks many times per tick.
//!
//! - [`world`] – the [`WorldSource`] seam and the shared world lock.
//! - [`cache`] – [`ObservationCache`]: refresh cycle, buckets and queries.
//! - [`config`] – [`CacheConfig`] tunables.
//! - [`sim`] – [`SimWorld`][sim::SimWorld], an in-memory world for tests and
//!   offline snapshot inspection.
//!
//! ```rust
//! use scout_tracker::{CacheConfig, ObservationCache, sim::SimWorld, world::share};
//! use scout_types::{Category, CreatureKind, LiveObject, Vec3};
//!
//! let world = share(
//!     SimWorld::new()
//!         .with_observer(1, Vec3::ZERO)
//!         .with_object(LiveObject::creature(2, CreatureKind::Zombie, Vec3::new(3.0, 0.0, 0.0))),
//! );
//! let cache = ObservationCache::new(world, CacheConfig::default());
//!
//! assert!(cache.entity_found(&[Category::Creature(CreatureKind::Zombie)]));
//! assert_eq!(cache.hostiles().len(), 1);
//! ```

pub mod cache;
pub mod config;
pub mod sim;
pub mod world;

pub use cache::{CacheSummary, ObservationCache, ObservedEntity, PlayerRecord};
pub use config::CacheConfig;
pub use world::{Observer, SharedWorld, WorldSource};
