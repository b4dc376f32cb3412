//! [`HostilityRules`] – decides which creatures count as a threat.
//!
//! Hostility is composed from three checks, evaluated in order:
//!
//! 1. **Raw anger** ([`HostilityRules::is_angry_at_observer`]) – a
//!    kind-specific rule over the creature's observable state.
//! 2. **Line of sight** ([`HostilityRules::is_hostile_to_observer`]) – when the
//!    object reports whether it can see the observer, an angry object that
//!    cannot see the observer is not hostile.
//! 3. **Admission** ([`HostilityRules::admits`]) – only hostile-family
//!    creatures within the proximity radius enter the hostile list.
//!
//! # Kind-specific anger
//!
//! | Kind | Angry when |
//! |------|------------|
//! | Enderman | angry at the observer **and** in the generic angry state |
//! | Hoglin | always |
//! | Zombified piglin | anger timer running **and** angry at the observer |
//! | Piglin holding the trade item | never |
//! | anything else | always |
//!
//! The zombified-piglin rule is effectively inert: the two conditions are not
//! observed together in practice. It is kept as-is rather than simplified.

use scout_types::{CreatureKind, ItemKind, LiveObject, ObjectKind, Vec3};

/// The hostility policy, parameterised by the trade item that pacifies
/// piglins.
#[derive(Debug, Clone, PartialEq)]
pub struct HostilityRules {
    trade_item: ItemKind,
}

impl Default for HostilityRules {
    fn default() -> Self {
        Self::new(ItemKind::new("gold_ingot"))
    }
}

impl HostilityRules {
    pub fn new(trade_item: ItemKind) -> Self {
        Self { trade_item }
    }

    pub fn trade_item(&self) -> &ItemKind {
        &self.trade_item
    }

    /// Raw, kind-specific anger signal towards the observer.
    ///
    /// Objects that are not creatures fall through to the default branch and
    /// read as angry.
    pub fn is_angry_at_observer(&self, object: &LiveObject) -> bool {
        if let ObjectKind::Creature { kind, state } = &object.kind {
            match kind {
                CreatureKind::Enderman => return state.angry_at_observer && state.angry,
                CreatureKind::Hoglin => return true,
                CreatureKind::ZombifiedPiglin => {
                    return state.anger_time > 0 && state.angry_at_observer;
                }
                _ => {}
            }
        }
        !self.is_trading(object)
    }

    /// True for a piglin currently holding the trade item.
    pub fn is_trading(&self, object: &LiveObject) -> bool {
        match &object.kind {
            ObjectKind::Creature {
                kind: CreatureKind::Piglin,
                state,
            } => state.held_items.iter().any(|i| *i == self.trade_item),
            _ => false,
        }
    }

    /// Anger gated by line of sight, when the object exposes it.
    pub fn is_hostile_to_observer(&self, object: &LiveObject) -> bool {
        let angry = self.is_angry_at_observer(object);
        match object.creature_state().and_then(|s| s.can_see_observer) {
            Some(can_see) => angry && can_see,
            None => angry,
        }
    }

    /// Whether `object` belongs on the hostile list for an observer standing
    /// at `observer`, given the proximity radius `range`.
    pub fn admits(&self, object: &LiveObject, observer: Vec3, range: f64) -> bool {
        let ObjectKind::Creature { kind, .. } = &object.kind else {
            return false;
        };
        kind.is_hostile_family()
            && self.is_hostile_to_observer(object)
            && object.position.within(observer, range)
    }
}
