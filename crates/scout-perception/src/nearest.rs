//! Nearest-match search.
//!
//! A single generic algorithm answers every "closest X" question the cache is
//! asked:
//!
//! ```text
//! best = none; best_cost = +inf
//! for candidate in candidates (in bucket order):
//!     skip unless every gate accepts it          (liveness, blacklist, caller predicate, ...)
//!     cost = cost_fn(reference, candidate.position)
//!     if cost < best_cost: best = candidate; best_cost = cost
//! ```
//!
//! The strict `<` means ties go to the first candidate encountered, so the
//! answer is reproducible for a fixed candidate order. Costs that are NaN or
//! infinite never win.
//!
//! # Example
//!
//! ```rust
//! use scout_perception::nearest::{NearestSearch, SquaredDistance};
//! use scout_types::{LiveObject, Vec3};
//!
//! let drops = vec![
//!     LiveObject::item_drop(1, "stick", Vec3::new(10.0, 0.0, 0.0)),
//!     LiveObject::item_drop(2, "stick", Vec3::new(5.0, 0.0, 0.0)),
//! ];
//!
//! let best = NearestSearch::new(Vec3::ZERO, &SquaredDistance)
//!     .require(|o: &LiveObject| o.alive)
//!     .run(&drops)
//!     .unwrap();
//! assert_eq!(best.candidate.id.0, 2);
//! ```

use scout_types::{LiveObject, Vec3};

// ────────────────────────────────────────────────────────────────────────────
// Positioned
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can be ranked by where it stands.
pub trait Positioned {
    fn position(&self) -> Vec3;
}

impl Positioned for LiveObject {
    fn position(&self) -> Vec3 {
        self.position
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cost functions
// ────────────────────────────────────────────────────────────────────────────

/// Scalar cost of reaching `to` from `from`. Lower is better.
///
/// Closures of the shape `Fn(Vec3, Vec3) -> f64` implement this trait.
pub trait CostFunction: Send + Sync {
    fn cost(&self, from: Vec3, to: Vec3) -> f64;
}

impl<F> CostFunction for F
where
    F: Fn(Vec3, Vec3) -> f64 + Send + Sync,
{
    fn cost(&self, from: Vec3, to: Vec3) -> f64 {
        self(from, to)
    }
}

/// Squared straight-line distance. The default for entity queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredDistance;

impl CostFunction for SquaredDistance {
    fn cost(&self, from: Vec3, to: Vec3) -> f64 {
        from.squared_distance_to(to)
    }
}

/// Plain straight-line distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineDistance;

impl CostFunction for StraightLineDistance {
    fn cost(&self, from: Vec3, to: Vec3) -> f64 {
        from.distance_to(to)
    }
}

/// Rough walking-time estimate used to rank item drops.
///
/// Horizontal travel uses octile distance (diagonal steps cost √2); climbing
/// and dropping are charged per block of height difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkHeuristic {
    /// Cost of one straight horizontal block.
    pub horizontal_cost: f64,
    /// Cost of one block climbed.
    pub ascend_cost: f64,
    /// Cost of one block dropped.
    pub descend_cost: f64,
}

impl Default for WalkHeuristic {
    fn default() -> Self {
        Self {
            horizontal_cost: 4.633,
            ascend_cost: 8.0,
            descend_cost: 1.0,
        }
    }
}

impl CostFunction for WalkHeuristic {
    fn cost(&self, from: Vec3, to: Vec3) -> f64 {
        let dx = (to.x - from.x).abs();
        let dz = (to.z - from.z).abs();
        let diagonal = dx.min(dz);
        let straight = dx.max(dz) - diagonal;
        let horizontal = (diagonal * std::f64::consts::SQRT_2 + straight) * self.horizontal_cost;

        let dy = to.y - from.y;
        let vertical = if dy > 0.0 {
            dy * self.ascend_cost
        } else {
            -dy * self.descend_cost
        };
        horizontal + vertical
    }
}

// ────────────────────────────────────────────────────────────────────────────
// NearestSearch
// ────────────────────────────────────────────────────────────────────────────

/// Result of a successful search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<'c, T> {
    pub candidate: &'c T,
    pub cost: f64,
}

type Gate<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;

/// Configurable nearest-match search over any candidate sequence.
///
/// Gates run in the order they were added and short-circuit, so cheap checks
/// should come first.
pub struct NearestSearch<'a, T> {
    reference: Vec3,
    cost: &'a dyn CostFunction,
    gates: Vec<Gate<'a, T>>,
}

impl<'a, T: Positioned> NearestSearch<'a, T> {
    pub fn new(reference: Vec3, cost: &'a dyn CostFunction) -> Self {
        Self {
            reference,
            cost,
            gates: Vec::new(),
        }
    }

    /// Add an acceptance gate. Candidates failing any gate are skipped.
    pub fn require(mut self, gate: impl Fn(&T) -> bool + 'a) -> Self {
        self.gates.push(Box::new(gate));
        self
    }

    /// Scan `candidates` in order and return the cheapest accepted one.
    pub fn run<'c, I>(&self, candidates: I) -> Option<Nearest<'c, T>>
    where
        I: IntoIterator<Item = &'c T>,
        T: 'c,
    {
        let mut best: Option<Nearest<'c, T>> = None;
        let mut best_cost = f64::INFINITY;
        for candidate in candidates {
            if !self.gates.iter().all(|gate| gate(candidate)) {
                continue;
            }
            let cost = self.cost.cost(self.reference, candidate.position());
            if cost < best_cost {
                best_cost = cost;
                best = Some(Nearest { candidate, cost });
            }
        }
        best
    }
}
