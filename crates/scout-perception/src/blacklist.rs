//! [`UnreachableBlacklist`] – decaying negative cache of unreachable objects.
//!
//! The behaviour layer reports an object as unreachable every time pathing to
//! it fails ([`UnreachableBlacklist::strike`]). Each report is a *strike*; an
//! object is considered unreachable once its strikes exceed the number of
//! failures the caller allows.
//!
//! Two things pull an entry back towards reachable:
//!
//! - **Progress** – a strike recorded while the observer stands more than one
//!   unit² closer than at any earlier strike resets the count before adding
//!   the new strike, so getting closer earns fresh attempts.
//! - **Decay** – one strike is forgiven for every `decay_ticks` ticks since the
//!   last strike. Decay is evaluated lazily whenever the entry is consulted;
//!   there is no background timer.
//!
//! Entries survive the observation refresh cycle. They are removed by
//! [`clear`][UnreachableBlacklist::clear],
//! [`forgive`][UnreachableBlacklist::forgive], or by
//! [`prune`][UnreachableBlacklist::prune] once every strike has decayed.

use std::collections::HashMap;

use scout_types::EntityId;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Blacklist policy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlacklistConfig {
    /// Strikes tolerated before an object reads as unreachable.
    pub failures_allowed: u32,
    /// Ticks after the last strike for one strike to decay. `0` disables
    /// decay.
    pub decay_ticks: u64,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            failures_allowed: 2,
            decay_ticks: 1200,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry
// ────────────────────────────────────────────────────────────────────────────

/// Why an object was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachableReason {
    /// Pathing towards the object failed.
    #[default]
    PathFailed,
    /// The object was reached but could not be interacted with.
    OutOfReach,
}

/// Penalty state for one object.
#[derive(Debug, Clone, PartialEq)]
pub struct BlacklistEntry {
    /// Strikes as of `last_strike_tick`.
    pub failures: u32,
    pub failures_allowed: u32,
    /// Closest observer distance² seen at any strike.
    pub best_distance_sq: f64,
    pub last_strike_tick: u64,
    pub reason: UnreachableReason,
}

impl BlacklistEntry {
    /// Strikes remaining at `tick` after decay.
    pub fn effective_failures(&self, tick: u64, decay_ticks: u64) -> u32 {
        if decay_ticks == 0 {
            return self.failures;
        }
        let elapsed = tick.saturating_sub(self.last_strike_tick);
        let decayed = u32::try_from(elapsed / decay_ticks).unwrap_or(u32::MAX);
        self.failures.saturating_sub(decayed)
    }

    pub fn is_unreachable(&self, tick: u64, decay_ticks: u64) -> bool {
        self.effective_failures(tick, decay_ticks) > self.failures_allowed
    }
}

// ────────────────────────────────────────────────────────────────────────────
// UnreachableBlacklist
// ────────────────────────────────────────────────────────────────────────────

/// Negative cache keyed by object identity.
///
/// # Example
///
/// ```
/// use scout_perception::blacklist::{UnreachableBlacklist, UnreachableReason};
/// use scout_types::EntityId;
///
/// let mut list = UnreachableBlacklist::new(0);
/// let id = EntityId(4);
/// for _ in 0..3 {
///     list.strike(id, 100.0, 2, 0, UnreachableReason::PathFailed);
/// }
/// assert!(list.is_unreachable(id, 0));
///
/// list.forgive(id);
/// assert!(!list.is_unreachable(id, 0));
/// ```
#[derive(Debug, Default)]
pub struct UnreachableBlacklist {
    entries: HashMap<EntityId, BlacklistEntry>,
    decay_ticks: u64,
}

impl UnreachableBlacklist {
    pub fn new(decay_ticks: u64) -> Self {
        Self {
            entries: HashMap::new(),
            decay_ticks,
        }
    }

    pub fn from_config(config: &BlacklistConfig) -> Self {
        Self::new(config.decay_ticks)
    }

    /// Record one failure to reach `id`, observed from `distance_sq` away.
    ///
    /// Returns the entry's strike count after recording.
    pub fn strike(
        &mut self,
        id: EntityId,
        distance_sq: f64,
        failures_allowed: u32,
        tick: u64,
        reason: UnreachableReason,
    ) -> u32 {
        let decay_ticks = self.decay_ticks;
        let entry = self.entries.entry(id).or_insert_with(|| BlacklistEntry {
            failures: 0,
            failures_allowed,
            best_distance_sq: f64::INFINITY,
            last_strike_tick: tick,
            reason,
        });

        entry.failures = entry.effective_failures(tick, decay_ticks);

        // Threshold of one unit² so that tiny moves do not reset every time.
        if distance_sq < entry.best_distance_sq - 1.0 {
            entry.best_distance_sq = distance_sq;
            entry.failures = 0;
        }

        entry.failures += 1;
        entry.failures_allowed = failures_allowed;
        entry.last_strike_tick = tick;
        entry.reason = reason;

        if entry.failures > entry.failures_allowed {
            debug!(entity = %id, failures = entry.failures, ?reason, "object now blacklisted");
        }
        entry.failures
    }

    /// True when `id` has exceeded its allowed failures as of `tick`.
    pub fn is_unreachable(&self, id: EntityId, tick: u64) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|e| e.is_unreachable(tick, self.decay_ticks))
    }

    pub fn entry(&self, id: EntityId) -> Option<&BlacklistEntry> {
        self.entries.get(&id)
    }

    /// Remove the entry for `id`. Returns whether one existed.
    pub fn forgive(&mut self, id: EntityId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Drop entries whose strikes have fully decayed. Returns how many were
    /// removed.
    pub fn prune(&mut self, tick: u64) -> usize {
        let before = self.entries.len();
        let decay_ticks = self.decay_ticks;
        self.entries
            .retain(|_, e| e.effective_failures(tick, decay_ticks) > 0);
        before - self.entries.len()
    }

    /// Number of objects currently unreachable at `tick`.
    pub fn unreachable_count(&self, tick: u64) -> usize {
        self.entries
            .values()
            .filter(|e| e.is_unreachable(tick, self.decay_ticks))
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: EntityId = EntityId(42);

    fn strike_n(list: &mut UnreachableBlacklist, n: u32, distance_sq: f64, tick: u64) {
        for _ in 0..n {
            list.strike(ID, distance_sq, 2, tick, UnreachableReason::PathFailed);
        }
    }

    #[test]
    fn unknown_object_is_reachable() {
        let list = UnreachableBlacklist::new(100);
        assert!(!list.is_unreachable(ID, 0));
    }

    #[test]
    fn exceeding_allowed_failures_blacklists() {
        let mut list = UnreachableBlacklist::new(0);
        strike_n(&mut list, 2, 50.0, 0);
        assert!(!list.is_unreachable(ID, 0), "two strikes are tolerated");
        strike_n(&mut list, 1, 50.0, 0);
        assert!(list.is_unreachable(ID, 0));
    }

    #[test]
    fn getting_closer_resets_strikes() {
        let mut list = UnreachableBlacklist::new(0);
        strike_n(&mut list, 2, 100.0, 0);
        // Much closer than before: count restarts at one.
        let failures = list.strike(ID, 10.0, 2, 0, UnreachableReason::PathFailed);
        assert_eq!(failures, 1);
        assert!(!list.is_unreachable(ID, 0));
    }

    #[test]
    fn small_moves_do_not_reset() {
        let mut list = UnreachableBlacklist::new(0);
        strike_n(&mut list, 2, 100.0, 0);
        let failures = list.strike(ID, 99.5, 2, 0, UnreachableReason::PathFailed);
        assert_eq!(failures, 3);
    }

    #[test]
    fn strikes_decay_over_ticks() {
        let mut list = UnreachableBlacklist::new(10);
        strike_n(&mut list, 3, 50.0, 0);
        assert!(list.is_unreachable(ID, 0));
        assert!(list.is_unreachable(ID, 9));
        // One strike forgiven after ten ticks: 2 > 2 is false.
        assert!(!list.is_unreachable(ID, 10));
        assert_eq!(list.entry(ID).unwrap().effective_failures(30, 10), 0);
    }

    #[test]
    fn decay_is_folded_into_new_strikes() {
        let mut list = UnreachableBlacklist::new(10);
        strike_n(&mut list, 3, 50.0, 0);
        // Twenty ticks later two strikes have decayed; a new one lands on 1 + 1.
        let failures = list.strike(ID, 50.0, 2, 20, UnreachableReason::PathFailed);
        assert_eq!(failures, 2);
    }

    #[test]
    fn zero_decay_never_forgives() {
        let mut list = UnreachableBlacklist::new(0);
        strike_n(&mut list, 3, 50.0, 0);
        assert!(list.is_unreachable(ID, u64::MAX));
    }

    #[test]
    fn forgive_and_clear_remove_entries() {
        let mut list = UnreachableBlacklist::new(0);
        strike_n(&mut list, 3, 50.0, 0);
        list.strike(EntityId(7), 1.0, 0, 0, UnreachableReason::OutOfReach);
        assert_eq!(list.len(), 2);

        assert!(list.forgive(ID));
        assert!(!list.forgive(ID));
        assert!(!list.is_unreachable(ID, 0));
        assert!(list.is_unreachable(EntityId(7), 0));

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn prune_drops_fully_decayed_entries() {
        let mut list = UnreachableBlacklist::new(5);
        strike_n(&mut list, 1, 50.0, 0);
        list.strike(EntityId(1), 50.0, 2, 100, UnreachableReason::PathFailed);
        assert_eq!(list.prune(100), 1);
        assert!(list.entry(ID).is_none());
        assert!(list.entry(EntityId(1)).is_some());
    }

    #[test]
    fn unreachable_count_respects_decay() {
        let mut list = UnreachableBlacklist::from_config(&BlacklistConfig {
            failures_allowed: 2,
            decay_ticks: 10,
        });
        strike_n(&mut list, 3, 50.0, 0);
        assert_eq!(list.unreachable_count(0), 1);
        assert_eq!(list.unreachable_count(10), 0);
    }
}
