//! `scout-types` – shared vocabulary for the Scout perception cache.
//!
//! Every crate in the workspace talks in terms of these types: positions,
//! identities, the closed set of concrete object kinds the live world can
//! report, the canonical [`Category`] buckets those kinds are squashed into,
//! and the error enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Geometry & identity
// ────────────────────────────────────────────────────────────────────────────

/// A point or vector in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared straight-line distance to `other`.
    pub fn squared_distance_to(&self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Straight-line distance to `other`.
    pub fn distance_to(&self, other: Vec3) -> f64 {
        self.squared_distance_to(other).sqrt()
    }

    /// True when `other` lies strictly closer than `range`.
    pub fn within(&self, other: Vec3, range: f64) -> bool {
        self.squared_distance_to(other) < range * range
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

impl FromStr for Vec3 {
    type Err = ScoutError;

    /// Parse `"x,y,z"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(ScoutError::Parse(format!("expected x,y,z but got '{s}'")));
        };
        let num = |v: &str| {
            v.parse::<f64>()
                .map_err(|e| ScoutError::Parse(format!("bad coordinate '{v}': {e}")))
        };
        Ok(Vec3::new(num(*x)?, num(*y)?, num(*z)?))
    }
}

/// Identity of a live-world object, assigned by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Items
// ────────────────────────────────────────────────────────────────────────────

/// Named item identifier, e.g. `"gold_ingot"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKind(String);

impl ItemKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A set of interchangeable item kinds together with how many are wanted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTarget {
    matches: Vec<ItemKind>,
    count: u32,
}

impl ItemTarget {
    /// Count used when a bare item kind is promoted to a target.
    pub const ANY_AMOUNT: u32 = 9_999_999;

    pub fn new(matches: Vec<ItemKind>, count: u32) -> Self {
        Self { matches, count }
    }

    /// Item kinds that satisfy this target, in lookup order.
    pub fn matches(&self) -> &[ItemKind] {
        &self.matches
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl From<ItemKind> for ItemTarget {
    fn from(item: ItemKind) -> Self {
        Self::new(vec![item], Self::ANY_AMOUNT)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Concrete kinds
// ────────────────────────────────────────────────────────────────────────────

/// Player-like object kinds. All of them squash into [`Category::PlayerLike`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    /// The player object driven by this client.
    Local,
    /// Any other player visible in the world.
    Remote,
}

/// Creature kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureKind {
    Zombie,
    Skeleton,
    Creeper,
    Spider,
    Enderman,
    ZombifiedPiglin,
    Piglin,
    PiglinBrute,
    Hoglin,
    Zoglin,
    Blaze,
    Witch,
    Cow,
    Pig,
    Sheep,
    Chicken,
    Villager,
    IronGolem,
}

impl CreatureKind {
    pub const ALL: [CreatureKind; 18] = [
        CreatureKind::Zombie,
        CreatureKind::Skeleton,
        CreatureKind::Creeper,
        CreatureKind::Spider,
        CreatureKind::Enderman,
        CreatureKind::ZombifiedPiglin,
        CreatureKind::Piglin,
        CreatureKind::PiglinBrute,
        CreatureKind::Hoglin,
        CreatureKind::Zoglin,
        CreatureKind::Blaze,
        CreatureKind::Witch,
        CreatureKind::Cow,
        CreatureKind::Pig,
        CreatureKind::Sheep,
        CreatureKind::Chicken,
        CreatureKind::Villager,
        CreatureKind::IronGolem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreatureKind::Zombie => "zombie",
            CreatureKind::Skeleton => "skeleton",
            CreatureKind::Creeper => "creeper",
            CreatureKind::Spider => "spider",
            CreatureKind::Enderman => "enderman",
            CreatureKind::ZombifiedPiglin => "zombified_piglin",
            CreatureKind::Piglin => "piglin",
            CreatureKind::PiglinBrute => "piglin_brute",
            CreatureKind::Hoglin => "hoglin",
            CreatureKind::Zoglin => "zoglin",
            CreatureKind::Blaze => "blaze",
            CreatureKind::Witch => "witch",
            CreatureKind::Cow => "cow",
            CreatureKind::Pig => "pig",
            CreatureKind::Sheep => "sheep",
            CreatureKind::Chicken => "chicken",
            CreatureKind::Villager => "villager",
            CreatureKind::IronGolem => "iron_golem",
        }
    }

    /// Kinds that are candidates for the hostile list at all. Passive
    /// creatures are never considered, whatever their anger state.
    pub fn is_hostile_family(&self) -> bool {
        !matches!(
            self,
            CreatureKind::Cow
                | CreatureKind::Pig
                | CreatureKind::Sheep
                | CreatureKind::Chicken
                | CreatureKind::Villager
                | CreatureKind::IronGolem
        )
    }
}

/// Projectile kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    Arrow,
    Trident,
    Snowball,
    Egg,
    ThrownPotion,
    EnderPearl,
    LlamaSpit,
    Fireball,
    SmallFireball,
    DragonFireball,
    WitherSkull,
    ShulkerBullet,
}

impl ProjectileKind {
    pub const ALL: [ProjectileKind; 12] = [
        ProjectileKind::Arrow,
        ProjectileKind::Trident,
        ProjectileKind::Snowball,
        ProjectileKind::Egg,
        ProjectileKind::ThrownPotion,
        ProjectileKind::EnderPearl,
        ProjectileKind::LlamaSpit,
        ProjectileKind::Fireball,
        ProjectileKind::SmallFireball,
        ProjectileKind::DragonFireball,
        ProjectileKind::WitherSkull,
        ProjectileKind::ShulkerBullet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectileKind::Arrow => "arrow",
            ProjectileKind::Trident => "trident",
            ProjectileKind::Snowball => "snowball",
            ProjectileKind::Egg => "egg",
            ProjectileKind::ThrownPotion => "thrown_potion",
            ProjectileKind::EnderPearl => "ender_pearl",
            ProjectileKind::LlamaSpit => "llama_spit",
            ProjectileKind::Fireball => "fireball",
            ProjectileKind::SmallFireball => "small_fireball",
            ProjectileKind::DragonFireball => "dragon_fireball",
            ProjectileKind::WitherSkull => "wither_skull",
            ProjectileKind::ShulkerBullet => "shulker_bullet",
        }
    }

    /// Whether the projectile falls under gravity. Explosive and homing
    /// projectiles fly straight.
    pub fn affected_by_gravity(&self) -> bool {
        !matches!(
            self,
            ProjectileKind::Fireball
                | ProjectileKind::SmallFireball
                | ProjectileKind::DragonFireball
                | ProjectileKind::WitherSkull
                | ProjectileKind::ShulkerBullet
        )
    }

    /// Whether the projectile can come to rest embedded in a surface.
    pub fn is_persistent(&self) -> bool {
        matches!(self, ProjectileKind::Arrow | ProjectileKind::Trident)
    }
}

/// Everything else the world can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherKind {
    ExperienceOrb,
    Boat,
    Minecart,
    ArmorStand,
    FallingBlock,
    PrimedTnt,
}

impl OtherKind {
    pub const ALL: [OtherKind; 6] = [
        OtherKind::ExperienceOrb,
        OtherKind::Boat,
        OtherKind::Minecart,
        OtherKind::ArmorStand,
        OtherKind::FallingBlock,
        OtherKind::PrimedTnt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OtherKind::ExperienceOrb => "experience_orb",
            OtherKind::Boat => "boat",
            OtherKind::Minecart => "minecart",
            OtherKind::ArmorStand => "armor_stand",
            OtherKind::FallingBlock => "falling_block",
            OtherKind::PrimedTnt => "primed_tnt",
        }
    }
}

fn parse_kind<T: Copy>(all: &[T], name: &str, as_str: fn(&T) -> &'static str) -> Option<T> {
    all.iter().copied().find(|k| as_str(k) == name)
}

// ────────────────────────────────────────────────────────────────────────────
// Live objects
// ────────────────────────────────────────────────────────────────────────────

/// Observable state of a creature, as read from the simulation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureState {
    /// Generic "is angry" state.
    pub angry: bool,
    /// Explicit anger directed at the observer.
    pub angry_at_observer: bool,
    /// Remaining anger timer in ticks.
    pub anger_time: u32,
    /// Items currently held in either hand.
    pub held_items: Vec<ItemKind>,
    /// Line-of-sight to the observer; `None` when the object has no such
    /// capability.
    pub can_see_observer: Option<bool>,
}

/// Concrete kind of a live object together with the capabilities that kind
/// exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Player {
        kind: PlayerKind,
        name: String,
    },
    Creature {
        kind: CreatureKind,
        #[serde(default)]
        state: CreatureState,
    },
    ItemDrop {
        item: ItemKind,
        #[serde(default = "one")]
        count: u32,
    },
    Projectile {
        kind: ProjectileKind,
        /// Embedded-in-surface flag; only persistent projectiles report it.
        #[serde(default)]
        in_ground: Option<bool>,
    },
    Other {
        kind: OtherKind,
    },
}

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

/// One dynamic object as read from the live world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveObject {
    pub id: EntityId,
    pub position: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
    #[serde(default = "yes")]
    pub alive: bool,
    pub kind: ObjectKind,
}

impl LiveObject {
    pub fn new(id: u64, position: Vec3, kind: ObjectKind) -> Self {
        Self {
            id: EntityId(id),
            position,
            velocity: Vec3::ZERO,
            alive: true,
            kind,
        }
    }

    pub fn player(id: u64, name: impl Into<String>, position: Vec3) -> Self {
        Self::new(
            id,
            position,
            ObjectKind::Player {
                kind: PlayerKind::Remote,
                name: name.into(),
            },
        )
    }

    /// A creature with default (calm, sighted) state.
    pub fn creature(id: u64, kind: CreatureKind, position: Vec3) -> Self {
        Self::new(
            id,
            position,
            ObjectKind::Creature {
                kind,
                state: CreatureState {
                    can_see_observer: Some(true),
                    ..CreatureState::default()
                },
            },
        )
    }

    pub fn item_drop(id: u64, item: impl Into<ItemKind>, position: Vec3) -> Self {
        Self::new(
            id,
            position,
            ObjectKind::ItemDrop {
                item: item.into(),
                count: 1,
            },
        )
    }

    pub fn projectile(id: u64, kind: ProjectileKind, position: Vec3, velocity: Vec3) -> Self {
        let in_ground = kind.is_persistent().then_some(false);
        Self {
            velocity,
            ..Self::new(id, position, ObjectKind::Projectile { kind, in_ground })
        }
    }

    pub fn other(id: u64, kind: OtherKind, position: Vec3) -> Self {
        Self::new(id, position, ObjectKind::Other { kind })
    }

    /// Replace the creature state. No-op for non-creatures.
    pub fn with_creature_state(mut self, new_state: CreatureState) -> Self {
        if let ObjectKind::Creature { state, .. } = &mut self.kind {
            *state = new_state;
        }
        self
    }

    pub fn with_alive(mut self, alive: bool) -> Self {
        self.alive = alive;
        self
    }

    pub fn creature_state(&self) -> Option<&CreatureState> {
        match &self.kind {
            ObjectKind::Creature { state, .. } => Some(state),
            _ => None,
        }
    }

    pub fn item_kind(&self) -> Option<&ItemKind> {
        match &self.kind {
            ObjectKind::ItemDrop { item, .. } => Some(item),
            _ => None,
        }
    }

    pub fn player_name(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Player { name, .. } => Some(name),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Category
// ────────────────────────────────────────────────────────────────────────────

/// Canonical bucket an object is catalogued under.
///
/// Player-like kinds collapse into [`Category::PlayerLike`]; every other kind
/// keeps its own concrete bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "category", content = "kind", rename_all = "snake_case")]
pub enum Category {
    PlayerLike,
    Creature(CreatureKind),
    DroppedItem,
    Projectile(ProjectileKind),
    Other(OtherKind),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::PlayerLike => f.write_str("player"),
            Category::DroppedItem => f.write_str("item"),
            Category::Creature(k) => write!(f, "creature:{}", k.as_str()),
            Category::Projectile(k) => write!(f, "projectile:{}", k.as_str()),
            Category::Other(k) => write!(f, "other:{}", k.as_str()),
        }
    }
}

impl FromStr for Category {
    type Err = ScoutError;

    /// Parse the [`Display`](fmt::Display) form, e.g. `"creature:zombie"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ScoutError::Parse(format!("unknown category '{s}'"));
        let parsed = match s.split_once(':') {
            None if s == "player" => Some(Category::PlayerLike),
            None if s == "item" => Some(Category::DroppedItem),
            None => None,
            Some(("creature", k)) => {
                parse_kind(&CreatureKind::ALL, k, CreatureKind::as_str).map(Category::Creature)
            }
            Some(("projectile", k)) => parse_kind(&ProjectileKind::ALL, k, ProjectileKind::as_str)
                .map(Category::Projectile),
            Some(("other", k)) => {
                parse_kind(&OtherKind::ALL, k, OtherKind::as_str).map(Category::Other)
            }
            Some(_) => None,
        };
        parsed.ok_or_else(unknown)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Caller misuse of the query surface. Logged and answered with "nothing",
/// never propagated out of a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("asked for the drop position of zero items, most likely a typo")]
    NoItemTargets,

    #[error("asked for the closest entity of zero categories")]
    NoCategories,

    #[error("item {0} was never observed dropped; check item_dropped before asking for its location")]
    NeverDropped(ItemKind),
}

/// Workspace-wide error type for configuration and snapshot handling.
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Snapshot Error: {0}")]
    Snapshot(String),

    #[error("Parse Error: {0}")]
    Parse(String),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query Error: {0}")]
    Query(#[from] QueryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_distance_and_range() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!((a.squared_distance_to(b) - 25.0).abs() < 1e-9);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-9);
        assert!(a.within(b, 5.1));
        // Strict: exactly at range is out.
        assert!(!a.within(b, 5.0));
    }

    #[test]
    fn vec3_parses_comma_separated() {
        let v: Vec3 = "1, 2.5,-3".parse().unwrap();
        assert_eq!(v, Vec3::new(1.0, 2.5, -3.0));
        assert!("1,2".parse::<Vec3>().is_err());
        assert!("a,b,c".parse::<Vec3>().is_err());
    }

    #[test]
    fn bare_item_promotes_to_unbounded_target() {
        let target = ItemTarget::from(ItemKind::new("gold_ingot"));
        assert_eq!(target.matches(), &[ItemKind::new("gold_ingot")]);
        assert_eq!(target.count(), ItemTarget::ANY_AMOUNT);
    }

    #[test]
    fn passive_creatures_are_outside_hostile_family() {
        assert!(CreatureKind::Zombie.is_hostile_family());
        assert!(CreatureKind::Hoglin.is_hostile_family());
        assert!(CreatureKind::Zoglin.is_hostile_family());
        assert!(!CreatureKind::Cow.is_hostile_family());
        assert!(!CreatureKind::Villager.is_hostile_family());
    }

    #[test]
    fn explosive_projectiles_ignore_gravity() {
        assert!(ProjectileKind::Arrow.affected_by_gravity());
        assert!(!ProjectileKind::Fireball.affected_by_gravity());
        assert!(ProjectileKind::Trident.is_persistent());
        assert!(!ProjectileKind::Snowball.is_persistent());
    }

    #[test]
    fn projectile_constructor_sets_in_ground_only_for_persistent_kinds() {
        let arrow = LiveObject::projectile(1, ProjectileKind::Arrow, Vec3::ZERO, Vec3::ZERO);
        let ball = LiveObject::projectile(2, ProjectileKind::Snowball, Vec3::ZERO, Vec3::ZERO);
        assert!(matches!(
            arrow.kind,
            ObjectKind::Projectile {
                in_ground: Some(false),
                ..
            }
        ));
        assert!(matches!(
            ball.kind,
            ObjectKind::Projectile {
                in_ground: None,
                ..
            }
        ));
    }

    #[test]
    fn category_display_parses_back() {
        let cats = [
            Category::PlayerLike,
            Category::DroppedItem,
            Category::Creature(CreatureKind::ZombifiedPiglin),
            Category::Projectile(ProjectileKind::SmallFireball),
            Category::Other(OtherKind::Boat),
        ];
        for cat in cats {
            let parsed: Category = cat.to_string().parse().unwrap();
            assert_eq!(parsed, cat);
        }
        assert!("creature:dragon".parse::<Category>().is_err());
        assert!("nonsense".parse::<Category>().is_err());
    }

    #[test]
    fn live_object_deserializes_with_defaults() {
        let json = r#"{
            "id": 7,
            "position": {"x": 1.0, "y": 64.0, "z": -2.0},
            "kind": {"type": "creature", "kind": "enderman"}
        }"#;
        let obj: LiveObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.id, EntityId(7));
        assert!(obj.alive);
        assert_eq!(obj.velocity, Vec3::ZERO);
        let state = obj.creature_state().expect("creature");
        assert!(!state.angry_at_observer);
        assert_eq!(state.can_see_observer, None);
    }

    #[test]
    fn item_drop_count_defaults_to_one() {
        let json = r#"{"type": "item_drop", "item": "cobblestone"}"#;
        let kind: ObjectKind = serde_json::from_str(json).unwrap();
        assert_eq!(
            kind,
            ObjectKind::ItemDrop {
                item: ItemKind::new("cobblestone"),
                count: 1
            }
        );
    }

    #[test]
    fn query_error_display() {
        let err = ScoutError::from(QueryError::NeverDropped(ItemKind::new("diamond")));
        assert!(err.to_string().contains("diamond"));
        assert!(QueryError::NoItemTargets.to_string().contains("zero items"));
    }
}
