//! [`ObservationCache`] – the per-tick snapshot of the live world.
//!
//! The cache answers spatial and categorical questions ("closest stick
//! drop", "is any zombie around", "which creatures are hostile right now")
//! from buckets rebuilt at most once per tick.
//!
//! # Refresh cycle
//!
//! | Step | What happens |
//! |------|--------------|
//! | `on_tick()` | Advances the tick counter; nothing is recomputed. |
//! | first query of the tick | `ensure_updated()` rebuilds every bucket once. |
//! | later queries, same tick | Served from the buckets as they are. |
//!
//! A refresh enumerates the world once, skipping dead objects and the
//! observer's own player object, and fills:
//!
//! - per-category buckets (player kinds collapse into one category),
//! - per-item buckets of dropped items,
//! - the close-range list and the hostile list,
//! - the projectile list,
//! - the player table and last-known player positions.
//!
//! # Locking
//!
//! Locks are always taken in this order, and any prefix of it:
//!
//! 1. refresh gate (only inside `ensure_updated`)
//! 2. world read lock
//! 3. bucket lock
//! 4. blacklist lock
//!
//! Queries run `ensure_updated` before taking the world lock, so a query
//! never waits on the gate while holding anything else. Caller predicates
//! run after every lock is released and may call back into the cache.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard};

use scout_perception::{
    CachedProjectile, CostFunction, DodgePolicy, HostilityRules, NearestSearch, Positioned,
    SquaredDistance, TrackAllProjectiles, UnreachableBlacklist, UnreachableReason, WalkHeuristic,
    classify_object, projectile::cache_projectile,
};
use scout_types::{
    Category, EntityId, ItemKind, ItemTarget, LiveObject, ObjectKind, QueryError, Vec3,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::CacheConfig;
use crate::world::{SharedWorld, WorldSource};

// ────────────────────────────────────────────────────────────────────────────
// Public records
// ────────────────────────────────────────────────────────────────────────────

/// A live object as catalogued at the last refresh.
///
/// Cloning is cheap: the object itself is shared between every bucket that
/// lists it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedEntity {
    pub category: Category,
    pub object: Arc<LiveObject>,
}

impl ObservedEntity {
    pub fn id(&self) -> EntityId {
        self.object.id
    }

    pub fn item_kind(&self) -> Option<&ItemKind> {
        self.object.item_kind()
    }
}

impl Positioned for ObservedEntity {
    fn position(&self) -> Vec3 {
        self.object.position
    }
}

/// A player present at the last refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub name: String,
    pub id: EntityId,
    pub position: Vec3,
}

/// Counts describing the cache's current contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSummary {
    pub tick: u64,
    pub refreshes: u64,
    /// Tracked objects per category, keyed by the category's display form.
    pub tracked: BTreeMap<String, usize>,
    /// Dropped items per item kind.
    pub item_drops: BTreeMap<String, usize>,
    pub close_entities: usize,
    pub hostiles: usize,
    pub projectiles: usize,
    pub players: Vec<String>,
    pub blacklisted: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Buckets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Buckets {
    by_category: BTreeMap<Category, Vec<ObservedEntity>>,
    item_drops: HashMap<ItemKind, Vec<ObservedEntity>>,
    close: Vec<ObservedEntity>,
    hostiles: Vec<ObservedEntity>,
    projectiles: Vec<CachedProjectile>,
    players: HashMap<String, PlayerRecord>,
    /// Same keys as `players`; the object behind each record.
    player_objects: HashMap<String, ObservedEntity>,
    player_history: HashMap<String, Vec3>,
}

impl Buckets {
    fn clear(&mut self, retain_player_history: bool) {
        self.by_category.clear();
        self.item_drops.clear();
        self.close.clear();
        self.hostiles.clear();
        self.projectiles.clear();
        self.players.clear();
        self.player_objects.clear();
        if !retain_player_history {
            self.player_history.clear();
        }
    }
}

/// Read guards for one consistent view: world first, then buckets.
struct View<'c, W> {
    world: RwLockReadGuard<'c, W>,
    buckets: RwLockReadGuard<'c, Buckets>,
}

// ────────────────────────────────────────────────────────────────────────────
// ObservationCache
// ────────────────────────────────────────────────────────────────────────────

/// Lazily refreshed, thread-safe cache over a [`WorldSource`].
pub struct ObservationCache<W: WorldSource> {
    world: SharedWorld<W>,
    config: CacheConfig,
    rules: HostilityRules,
    item_cost: Box<dyn CostFunction>,
    dodge_policy: Box<dyn DodgePolicy>,
    tick: AtomicU64,
    refreshes: AtomicU64,
    /// Tick of the last refresh; `None` before the first one.
    refresh_gate: Mutex<Option<u64>>,
    buckets: RwLock<Buckets>,
    blacklist: Mutex<UnreachableBlacklist>,
}

impl<W: WorldSource> ObservationCache<W> {
    pub fn new(world: SharedWorld<W>, config: CacheConfig) -> Self {
        Self {
            rules: HostilityRules::new(config.trade_item.clone()),
            blacklist: Mutex::new(UnreachableBlacklist::from_config(&config.blacklist)),
            world,
            config,
            item_cost: Box::new(WalkHeuristic::default()),
            dodge_policy: Box::new(TrackAllProjectiles),
            tick: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            refresh_gate: Mutex::new(None),
            buckets: RwLock::new(Buckets::default()),
        }
    }

    /// Replace the cost function used to rank item drops.
    pub fn with_item_cost(mut self, cost: impl CostFunction + 'static) -> Self {
        self.item_cost = Box::new(cost);
        self
    }

    /// Install the behaviour layer's projectile opt-out.
    pub fn with_dodge_policy(mut self, policy: impl DodgePolicy + 'static) -> Self {
        self.dodge_policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The world handle shared with the simulation.
    pub fn world(&self) -> &SharedWorld<W> {
        &self.world
    }

    // ── Tick & refresh ───────────────────────────────────────────────────────

    /// Advance the tick. Buckets become stale but are not rebuilt until the
    /// next query. Returns the new tick.
    pub fn on_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current_tick(&self) -> u64 {
        self.tick.load(Ordering::Acquire)
    }

    /// Number of bucket rebuilds performed so far.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Acquire)
    }

    /// Rebuild the buckets if they are stale for the current tick.
    ///
    /// Concurrent callers in the same tick serialize on the refresh gate;
    /// exactly one of them rebuilds and the rest observe the result.
    /// Blacklist entries whose strikes have fully decayed are dropped after
    /// each rebuild.
    pub fn ensure_updated(&self) {
        let mut last = self.refresh_gate.lock().expect("refresh gate poisoned");
        // Read under the gate: a tick taken before waiting may already have
        // been refreshed past by the thread holding it.
        let tick = self.current_tick();
        if *last == Some(tick) {
            return;
        }
        self.refresh(tick);
        *last = Some(tick);

        let pruned = self.blacklist().prune(tick);
        if pruned > 0 {
            debug!(tick, pruned, "decayed blacklist entries pruned");
        }
    }

    fn refresh(&self, tick: u64) {
        let world = self.world.read().expect("world lock poisoned");
        let mut buckets = self.buckets.write().expect("bucket lock poisoned");
        buckets.clear(self.config.retain_player_history);
        self.refreshes.fetch_add(1, Ordering::AcqRel);

        if !world.has_world() {
            debug!(tick, "no world loaded, buckets left empty");
            return;
        }
        let Some(observer) = world.observer() else {
            warn!(tick, "world loaded without an observer, buckets left empty");
            return;
        };

        let range = self.config.close_range;
        for object in world.live_objects() {
            if !object.alive {
                continue;
            }
            let category = classify_object(object);
            if category == Category::PlayerLike && object.id == observer.id {
                continue;
            }

            let observed = ObservedEntity {
                category,
                object: Arc::new(object.clone()),
            };
            buckets
                .by_category
                .entry(category)
                .or_default()
                .push(observed.clone());

            if object.position.within(observer.position, range) {
                buckets.close.push(observed.clone());
            }

            match &object.kind {
                ObjectKind::ItemDrop { item, .. } => {
                    buckets
                        .item_drops
                        .entry(item.clone())
                        .or_default()
                        .push(observed);
                }
                ObjectKind::Creature { .. } => {
                    if self.rules.admits(object, observer.position, range) {
                        buckets.hostiles.push(observed);
                    }
                }
                ObjectKind::Projectile { .. } => {
                    if let Some(p) = cache_projectile(object, self.dodge_policy.as_ref()) {
                        buckets.projectiles.push(p);
                    }
                }
                ObjectKind::Player { name, .. } => {
                    buckets
                        .player_history
                        .insert(name.clone(), object.position);
                    buckets.players.insert(
                        name.clone(),
                        PlayerRecord {
                            name: name.clone(),
                            id: object.id,
                            position: object.position,
                        },
                    );
                    buckets.player_objects.insert(name.clone(), observed);
                }
                ObjectKind::Other { .. } => {}
            }
        }

        debug!(
            tick,
            categories = buckets.by_category.len(),
            close = buckets.close.len(),
            hostiles = buckets.hostiles.len(),
            projectiles = buckets.projectiles.len(),
            players = buckets.players.len(),
            "observation cache refreshed"
        );
    }

    fn view(&self) -> View<'_, W> {
        self.ensure_updated();
        let world = self.world.read().expect("world lock poisoned");
        let buckets = self.buckets.read().expect("bucket lock poisoned");
        View { world, buckets }
    }

    fn blacklist(&self) -> MutexGuard<'_, UnreachableBlacklist> {
        self.blacklist.lock().expect("blacklist lock poisoned")
    }

    fn observer_position(&self) -> Option<Vec3> {
        let world = self.world.read().expect("world lock poisoned");
        if !world.has_world() {
            return None;
        }
        world.observer().map(|o| o.position)
    }

    // ── Item drops ───────────────────────────────────────────────────────────

    /// The closest live, reachable drop matching any of `targets`, ranked by
    /// the item cost function from `reference`.
    ///
    /// Asking with no targets, or for items none of which is currently
    /// dropped, is a caller mistake: it is logged and answered with `None`.
    pub fn closest_item_drop(
        &self,
        reference: Vec3,
        accept: impl Fn(&ObservedEntity) -> bool,
        targets: &[ItemTarget],
    ) -> Option<ObservedEntity> {
        let view = self.view();
        let first_item = targets.iter().flat_map(|t| t.matches()).next();
        let Some(first_item) = first_item else {
            error!(error = %QueryError::NoItemTargets, "closest_item_drop rejected");
            return None;
        };

        let candidates = {
            let blacklist = self.blacklist();
            let tick = self.current_tick();
            let items = targets.iter().flat_map(|t| t.matches());
            if !any_reachable_drop(&view.buckets, &blacklist, tick, items.clone()) {
                error!(
                    error = %QueryError::NeverDropped(first_item.clone()),
                    "closest_item_drop rejected"
                );
                return None;
            }
            let drops = items
                .filter_map(|item| view.buckets.item_drops.get(item))
                .flatten();
            reachable_candidates(&view, &blacklist, tick, drops)
        };
        drop(view);

        NearestSearch::new(reference, self.item_cost.as_ref())
            .require(accept)
            .run(&candidates)
            .map(|n| n.candidate.clone())
    }

    /// [`closest_item_drop`](Self::closest_item_drop) for plain item kinds,
    /// accepting every candidate.
    pub fn closest_item_drop_of(&self, reference: Vec3, items: &[ItemKind]) -> Option<ObservedEntity> {
        let targets: Vec<ItemTarget> = items.iter().cloned().map(ItemTarget::from).collect();
        self.closest_item_drop(reference, |_| true, &targets)
    }

    /// [`closest_item_drop`](Self::closest_item_drop) measured from the
    /// observer. `None` when there is no observer.
    pub fn closest_item_drop_to_observer(
        &self,
        accept: impl Fn(&ObservedEntity) -> bool,
        targets: &[ItemTarget],
    ) -> Option<ObservedEntity> {
        let reference = self.observer_position()?;
        self.closest_item_drop(reference, accept, targets)
    }

    /// True when some reachable drop matches any of `targets`.
    pub fn item_dropped(&self, targets: &[ItemTarget]) -> bool {
        let view = self.view();
        let blacklist = self.blacklist();
        let items = targets.iter().flat_map(|t| t.matches());
        any_reachable_drop(&view.buckets, &blacklist, self.current_tick(), items)
    }

    pub fn any_item_dropped(&self, items: &[ItemKind]) -> bool {
        let view = self.view();
        let blacklist = self.blacklist();
        any_reachable_drop(&view.buckets, &blacklist, self.current_tick(), items.iter())
    }

    // ── Entities ─────────────────────────────────────────────────────────────

    /// The closest live, reachable entity in any of `categories`, by squared
    /// distance from `reference`.
    pub fn closest_entity(
        &self,
        reference: Vec3,
        accept: impl Fn(&ObservedEntity) -> bool,
        categories: &[Category],
    ) -> Option<ObservedEntity> {
        let view = self.view();
        if categories.is_empty() {
            error!(error = %QueryError::NoCategories, "closest_entity rejected");
            return None;
        }
        let candidates = {
            let blacklist = self.blacklist();
            let tick = self.current_tick();
            let tracked = categories
                .iter()
                .filter_map(|c| view.buckets.by_category.get(c))
                .flatten();
            reachable_candidates(&view, &blacklist, tick, tracked)
        };
        drop(view);

        NearestSearch::new(reference, &SquaredDistance)
            .require(accept)
            .run(&candidates)
            .map(|n| n.candidate.clone())
    }

    pub fn closest_entity_to_observer(
        &self,
        accept: impl Fn(&ObservedEntity) -> bool,
        categories: &[Category],
    ) -> Option<ObservedEntity> {
        let reference = self.observer_position()?;
        self.closest_entity(reference, accept, categories)
    }

    /// True when any category holds at least one reachable entity.
    pub fn entity_found(&self, categories: &[Category]) -> bool {
        let view = self.view();
        let blacklist = self.blacklist();
        let tick = self.current_tick();
        categories
            .iter()
            .filter_map(|c| view.buckets.by_category.get(c))
            .flatten()
            .any(|e| !blacklist.is_unreachable(e.id(), tick))
    }

    /// Everything catalogued under `category`, in enumeration order.
    pub fn tracked_entities(&self, category: Category) -> Vec<ObservedEntity> {
        self.view()
            .buckets
            .by_category
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    pub fn close_entities(&self) -> Vec<ObservedEntity> {
        self.view().buckets.close.clone()
    }

    pub fn projectiles(&self) -> Vec<CachedProjectile> {
        self.view().buckets.projectiles.clone()
    }

    pub fn hostiles(&self) -> Vec<ObservedEntity> {
        self.view().buckets.hostiles.clone()
    }

    // ── Players ──────────────────────────────────────────────────────────────

    pub fn is_player_loaded(&self, name: &str) -> bool {
        self.view().buckets.players.contains_key(name)
    }

    pub fn player(&self, name: &str) -> Option<PlayerRecord> {
        self.view().buckets.players.get(name).cloned()
    }

    /// The live player object for `name`, as catalogued at the last refresh.
    /// Shares its entry with [`player`](Self::player): when two players carry
    /// the same name, the later one in enumeration order wins in both.
    pub fn player_object(&self, name: &str) -> Option<ObservedEntity> {
        self.view().buckets.player_objects.get(name).cloned()
    }

    /// Where `name` was last seen. Without `retain_player_history` this only
    /// knows players present at the last refresh.
    pub fn player_last_known_position(&self, name: &str) -> Option<Vec3> {
        self.view().buckets.player_history.get(name).copied()
    }

    // ── Blacklist ────────────────────────────────────────────────────────────

    /// Report a failed attempt to reach `entity` with the configured failure
    /// allowance. Returns the entity's strike count.
    pub fn mark_unreachable(&self, entity: &ObservedEntity) -> u32 {
        self.mark_unreachable_with(
            entity,
            self.config.blacklist.failures_allowed,
            UnreachableReason::PathFailed,
        )
    }

    pub fn mark_unreachable_with(
        &self,
        entity: &ObservedEntity,
        failures_allowed: u32,
        reason: UnreachableReason,
    ) -> u32 {
        let world = self.world.read().expect("world lock poisoned");
        let distance_sq = world
            .observer()
            .map_or(f64::INFINITY, |o| o.position.squared_distance_to(entity.position()));
        let tick = self.current_tick();
        let failures = self
            .blacklist()
            .strike(entity.id(), distance_sq, failures_allowed, tick, reason);
        info!(
            entity = %entity.id(),
            category = %entity.category,
            failures,
            failures_allowed,
            "entity reported unreachable"
        );
        failures
    }

    pub fn is_reachable(&self, entity: &ObservedEntity) -> bool {
        !self
            .blacklist()
            .is_unreachable(entity.id(), self.current_tick())
    }

    /// Drop every penalty recorded for `entity`. Returns whether any existed.
    pub fn forgive(&self, entity: &ObservedEntity) -> bool {
        self.blacklist().forgive(entity.id())
    }

    /// Empty the unreachable blacklist. Buckets are left alone.
    pub fn reset(&self) {
        let mut blacklist = self.blacklist();
        let dropped = blacklist.len();
        blacklist.clear();
        info!(dropped, "unreachable blacklist reset");
    }

    /// Entries held by the blacklist, including ones no longer unreachable
    /// whose strikes have not fully decayed yet.
    pub fn blacklist_len(&self) -> usize {
        self.blacklist().len()
    }

    // ── Introspection ────────────────────────────────────────────────────────

    pub fn summary(&self) -> CacheSummary {
        let view = self.view();
        let tick = self.current_tick();
        let blacklisted = self.blacklist().unreachable_count(tick);
        let b = &view.buckets;

        let mut players: Vec<String> = b.players.keys().cloned().collect();
        players.sort();

        CacheSummary {
            tick,
            refreshes: self.refresh_count(),
            tracked: b
                .by_category
                .iter()
                .map(|(c, v)| (c.to_string(), v.len()))
                .collect(),
            item_drops: b
                .item_drops
                .iter()
                .map(|(k, v)| (k.to_string(), v.len()))
                .collect(),
            close_entities: b.close.len(),
            hostiles: b.hostiles.len(),
            projectiles: b.projectiles.len(),
            players,
            blacklisted,
        }
    }
}

/// Live, non-blacklisted entries of `tracked`, in order. Owned so the
/// caller's predicate can run after every cache lock is released.
fn reachable_candidates<'e, W: WorldSource>(
    view: &View<'_, W>,
    blacklist: &UnreachableBlacklist,
    tick: u64,
    tracked: impl Iterator<Item = &'e ObservedEntity>,
) -> Vec<ObservedEntity> {
    tracked
        .filter(|e| view.world.is_alive(e.id()))
        .filter(|e| !blacklist.is_unreachable(e.id(), tick))
        .cloned()
        .collect()
}

fn any_reachable_drop<'i>(
    buckets: &Buckets,
    blacklist: &UnreachableBlacklist,
    tick: u64,
    items: impl IntoIterator<Item = &'i ItemKind>,
) -> bool {
    items
        .into_iter()
        .filter_map(|item| buckets.item_drops.get(item))
        .flatten()
        .any(|e| !blacklist.is_unreachable(e.id(), tick))
}
