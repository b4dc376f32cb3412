//! `scout-perception` – the pure building blocks of the observation cache.
//!
//! Nothing in this crate takes a lock or talks to the live world; every
//! component is a function of the data handed to it, which keeps the
//! classification and ranking policy testable in isolation.
//!
//! # Modules
//!
//! - [`classifier`] – [`classify`][classifier::classify]: squashes a concrete
//!   object kind into its canonical [`Category`][scout_types::Category].
//! - [`hostility`] – [`HostilityRules`][hostility::HostilityRules]: the
//!   kind-specific anger rules and the hostile-list admission check.
//! - [`blacklist`] – [`UnreachableBlacklist`][blacklist::UnreachableBlacklist]:
//!   a decaying negative cache of objects the behaviour layer could not reach.
//! - [`projectile`] – [`cache_projectile`][projectile::cache_projectile]:
//!   turns in-flight projectiles into simplified kinematic records.
//! - [`nearest`] – [`NearestSearch`][nearest::NearestSearch]: deterministic
//!   nearest-match search under caller-supplied gates and cost functions.

pub mod blacklist;
pub mod classifier;
pub mod hostility;
pub mod nearest;
pub mod projectile;

pub use blacklist::{BlacklistConfig, BlacklistEntry, UnreachableBlacklist, UnreachableReason};
pub use classifier::{classify, classify_object};
pub use hostility::HostilityRules;
pub use nearest::{
    CostFunction, Nearest, NearestSearch, Positioned, SquaredDistance, StraightLineDistance,
    WalkHeuristic,
};
pub use projectile::{CachedProjectile, DodgePolicy, GRAVITY_ACCEL, TrackAllProjectiles};
