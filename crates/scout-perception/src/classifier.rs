//! Object classification.
//!
//! Maps a concrete [`ObjectKind`] to the [`Category`] bucket it is catalogued
//! under. Every player-like kind collapses into [`Category::PlayerLike`] so
//! that local and remote players share one bucket; all other kinds keep their
//! own concrete category.

use scout_types::{Category, LiveObject, ObjectKind};

/// Return the canonical category for `kind`. Total and stateless.
pub fn classify(kind: &ObjectKind) -> Category {
    match kind {
        ObjectKind::Player { .. } => Category::PlayerLike,
        ObjectKind::Creature { kind, .. } => Category::Creature(*kind),
        ObjectKind::ItemDrop { .. } => Category::DroppedItem,
        ObjectKind::Projectile { kind, .. } => Category::Projectile(*kind),
        ObjectKind::Other { kind } => Category::Other(*kind),
    }
}

/// Convenience wrapper over [`classify`] for a whole object.
pub fn classify_object(object: &LiveObject) -> Category {
    classify(&object.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_types::{CreatureKind, OtherKind, PlayerKind, ProjectileKind, Vec3};

    #[test]
    fn every_player_kind_squashes_to_player_like() {
        for kind in [PlayerKind::Local, PlayerKind::Remote] {
            let obj = ObjectKind::Player {
                kind,
                name: "steve".into(),
            };
            assert_eq!(classify(&obj), Category::PlayerLike);
        }
    }

    #[test]
    fn creatures_keep_their_concrete_kind() {
        let zombie = LiveObject::creature(1, CreatureKind::Zombie, Vec3::ZERO);
        let hoglin = LiveObject::creature(2, CreatureKind::Hoglin, Vec3::ZERO);
        assert_eq!(
            classify_object(&zombie),
            Category::Creature(CreatureKind::Zombie)
        );
        assert_ne!(classify_object(&zombie), classify_object(&hoglin));
    }

    #[test]
    fn items_projectiles_and_others_map_to_their_buckets() {
        let item = LiveObject::item_drop(1, "stick", Vec3::ZERO);
        let arrow = LiveObject::projectile(2, ProjectileKind::Arrow, Vec3::ZERO, Vec3::ZERO);
        let boat = LiveObject::other(3, OtherKind::Boat, Vec3::ZERO);
        assert_eq!(classify_object(&item), Category::DroppedItem);
        assert_eq!(
            classify_object(&arrow),
            Category::Projectile(ProjectileKind::Arrow)
        );
        assert_eq!(classify_object(&boat), Category::Other(OtherKind::Boat));
    }

    #[test]
    fn classification_is_deterministic() {
        let obj = LiveObject::creature(9, CreatureKind::Witch, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(classify_object(&obj), classify_object(&obj.clone()));
    }
}
