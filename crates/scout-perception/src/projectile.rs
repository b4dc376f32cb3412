//! Projectile trajectory records.
//!
//! In-flight projectiles are reduced to a [`CachedProjectile`]: position,
//! velocity and a gravity term, which is all a dodge planner needs to
//! extrapolate the flight path. Projectiles that have come to rest embedded in
//! a surface are skipped, and so are projectiles the behaviour layer asks us
//! not to track (see [`DodgePolicy`]).

use scout_types::{LiveObject, ObjectKind, ProjectileKind, Vec3};
use serde::{Deserialize, Serialize};

/// Downward acceleration, in blocks per tick², applied to gravity-affected
/// projectiles.
pub const GRAVITY_ACCEL: f64 = 0.050_000_000_745_058_06;

/// Simplified kinematic state of one projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedProjectile {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Downward acceleration; `0.0` when the kind ignores gravity.
    pub gravity: f64,
    pub kind: ProjectileKind,
}

impl CachedProjectile {
    /// Position after `ticks` of ballistic flight (no drag).
    pub fn position_after(&self, ticks: f64) -> Vec3 {
        Vec3::new(
            self.position.x + self.velocity.x * ticks,
            self.position.y + self.velocity.y * ticks - 0.5 * self.gravity * ticks * ticks,
            self.position.z + self.velocity.z * ticks,
        )
    }
}

/// Behaviour-layer hook deciding which projectiles are not worth dodging.
///
/// Closures of the shape `Fn(&LiveObject) -> bool` implement this trait.
pub trait DodgePolicy: Send + Sync {
    /// Return `true` to leave `object` out of the projectile list.
    fn should_avoid_dodging(&self, object: &LiveObject) -> bool;
}

impl<F> DodgePolicy for F
where
    F: Fn(&LiveObject) -> bool + Send + Sync,
{
    fn should_avoid_dodging(&self, object: &LiveObject) -> bool {
        self(object)
    }
}

/// Default policy: every projectile is tracked.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackAllProjectiles;

impl DodgePolicy for TrackAllProjectiles {
    fn should_avoid_dodging(&self, _object: &LiveObject) -> bool {
        false
    }
}

/// Build the cached record for `object`, or `None` when it is not a
/// projectile, the policy opts out of it, or it is embedded in a surface.
pub fn cache_projectile(object: &LiveObject, policy: &dyn DodgePolicy) -> Option<CachedProjectile> {
    let ObjectKind::Projectile { kind, in_ground } = &object.kind else {
        return None;
    };
    if policy.should_avoid_dodging(object) {
        return None;
    }
    if in_ground.unwrap_or(false) {
        return None;
    }
    Some(CachedProjectile {
        position: object.position,
        velocity: object.velocity,
        gravity: if kind.affected_by_gravity() {
            GRAVITY_ACCEL
        } else {
            0.0
        },
        kind: *kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrow(in_ground: bool) -> LiveObject {
        LiveObject::new(
            1,
            Vec3::new(0.0, 70.0, 0.0),
            ObjectKind::Projectile {
                kind: ProjectileKind::Arrow,
                in_ground: Some(in_ground),
            },
        )
    }

    #[test]
    fn flying_arrow_is_cached_with_gravity() {
        let mut obj = arrow(false);
        obj.velocity = Vec3::new(1.0, 0.5, 0.0);
        let proj = cache_projectile(&obj, &TrackAllProjectiles).expect("cached");
        assert_eq!(proj.position, obj.position);
        assert_eq!(proj.velocity, obj.velocity);
        assert_eq!(proj.kind, ProjectileKind::Arrow);
        assert!((proj.gravity - GRAVITY_ACCEL).abs() < 1e-12);
    }

    #[test]
    fn embedded_arrow_is_skipped() {
        assert!(cache_projectile(&arrow(true), &TrackAllProjectiles).is_none());
    }

    #[test]
    fn gravity_free_kinds_have_zero_gravity() {
        let fireball = LiveObject::projectile(
            2,
            ProjectileKind::Fireball,
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
        );
        let proj = cache_projectile(&fireball, &TrackAllProjectiles).expect("cached");
        assert_eq!(proj.gravity, 0.0);
    }

    #[test]
    fn policy_can_opt_out() {
        let ignore_pearls =
            |o: &LiveObject| matches!(o.kind, ObjectKind::Projectile { kind: ProjectileKind::EnderPearl, .. });
        let pearl = LiveObject::projectile(3, ProjectileKind::EnderPearl, Vec3::ZERO, Vec3::ZERO);
        let egg = LiveObject::projectile(4, ProjectileKind::Egg, Vec3::ZERO, Vec3::ZERO);
        assert!(cache_projectile(&pearl, &ignore_pearls).is_none());
        assert!(cache_projectile(&egg, &ignore_pearls).is_some());
    }

    #[test]
    fn non_projectiles_are_ignored() {
        let item = LiveObject::item_drop(5, "arrow", Vec3::ZERO);
        assert!(cache_projectile(&item, &TrackAllProjectiles).is_none());
    }

    #[test]
    fn extrapolation_applies_gravity() {
        let proj = CachedProjectile {
            position: Vec3::new(0.0, 10.0, 0.0),
            velocity: Vec3::new(1.0, 0.0, 0.0),
            gravity: 0.1,
            kind: ProjectileKind::Snowball,
        };
        let p = proj.position_after(10.0);
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!((p.y - 5.0).abs() < 1e-9);
    }
}
