//! VSIDS decision heuristic and the explicit, seedable RNG used for
//! tie-breaking (spec §4.6, §5, §9).
//!
//! Grounded on the teacher's `search::decision_heuristic::DecisionHeuristic`
//! (activity bump/decay/overflow-rescale, a binary max-heap ordered by
//! activity) and `search::util::Random` (the bespoke linear-congruential
//! generator) / `search::util::luby`. The teacher's process-wide RNG is
//! replaced by an explicit, solver-owned instance per the spec's §9 design
//! note, so P6 (restart idempotence) is testable.

use super::assignment::Assignment;
use super::lit::{Lit, Var};

/// A small linear-congruential generator, seeded explicitly rather than
/// drawing from process-global state (spec §9).
pub struct Random {
    seed: f64,
}

impl Random {
    pub fn new(seed: f64) -> Random {
        assert!(seed != 0.0, "RNG seed must be nonzero");
        Random { seed }
    }

    /// Returns a pseudo-random float in `[0, 1)`.
    pub fn drand(&mut self) -> f64 {
        self.seed *= 1389796.0;
        let q = (self.seed / 2147483647.0) as i64;
        self.seed -= (q as f64) * 2147483647.0;
        self.seed / 2147483647.0
    }

    /// Returns a pseudo-random integer in `[0, size)`.
    pub fn irand(&mut self, size: usize) -> usize {
        ((self.drand() * (size as f64)) as usize).min(size.saturating_sub(1))
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.drand() < p
    }
}

/// A binary max-heap over `Var`, ordered by an externally supplied key
/// (grounded on the teacher's `formula::index_map::IdxHeap`), specialized
/// here to the one comparator VSIDS needs instead of being generic.
struct VarHeap {
    heap: Vec<Var>,
    position: Vec<Option<usize>>,
}

impl VarHeap {
    fn new(num_vars: usize) -> VarHeap {
        VarHeap {
            heap: Vec::with_capacity(num_vars),
            position: vec![None; num_vars],
        }
    }

    fn grow_to(&mut self, num_vars: usize) {
        if self.position.len() < num_vars {
            self.position.resize(num_vars, None);
        }
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn contains(&self, v: Var) -> bool {
        self.position[v.index()].is_some()
    }

    fn insert(&mut self, v: Var, activity: &[f64]) {
        if self.contains(v) {
            return;
        }
        let place = self.heap.len();
        self.heap.push(v);
        self.position[v.index()] = Some(place);
        self.sift_up(place, activity);
    }

    fn pop(&mut self, activity: &[f64]) -> Option<Var> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        self.position[top.index()] = None;
        if !self.heap.is_empty() {
            self.position[self.heap[0].index()] = Some(0);
            self.sift_down(0, activity);
        }
        Some(top)
    }

    fn update(&mut self, v: Var, activity: &[f64]) {
        if let Some(place) = self.position[v.index()] {
            self.sift_up(place, activity);
            if let Some(place) = self.position[v.index()] {
                self.sift_down(place, activity);
            }
        }
    }

    fn sift_up(&mut self, mut i: usize, activity: &[f64]) {
        while i > 0 {
            let parent = (i - 1) >> 1;
            if activity[self.heap[i].index()] > activity[self.heap[parent].index()] {
                self.heap.swap(i, parent);
                self.position[self.heap[i].index()] = Some(i);
                self.position[self.heap[parent].index()] = Some(parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize, activity: &[f64]) {
        loop {
            let left = 2 * i + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let child = if right < self.heap.len() && activity[self.heap[right].index()] > activity[self.heap[left].index()] {
                right
            } else {
                left
            };
            if activity[self.heap[child].index()] > activity[self.heap[i].index()] {
                self.heap.swap(i, child);
                self.position[self.heap[i].index()] = Some(i);
                self.position[self.heap[child].index()] = Some(child);
                i = child;
            } else {
                break;
            }
        }
    }

    fn at(&self, i: usize) -> Var {
        self.heap[i]
    }
}

pub struct DecisionHeuristicSettings {
    pub var_decay: f64,
    pub random_var_freq: f64,
    pub random_seed: f64,
}

impl Default for DecisionHeuristicSettings {
    fn default() -> Self {
        DecisionHeuristicSettings {
            var_decay: 0.95,
            random_var_freq: 0.0,
            random_seed: 91648253.0,
        }
    }
}

/// VSIDS scoring plus the decision-order heap (spec §4.6).
pub struct DecisionHeuristic {
    settings: DecisionHeuristicSettings,
    var_inc: f64,
    activity: Vec<f64>,
    order: VarHeap,
    rand: Random,
    pub decisions: u64,
    pub rnd_decisions: u64,
}

impl DecisionHeuristic {
    pub fn new(num_vars: usize, settings: DecisionHeuristicSettings) -> DecisionHeuristic {
        let seed = settings.random_seed;
        let mut h = DecisionHeuristic {
            settings,
            var_inc: 1.0,
            activity: vec![0.0; num_vars],
            order: VarHeap::new(num_vars),
            rand: Random::new(seed),
            decisions: 0,
            rnd_decisions: 0,
        };
        for i in 0..num_vars {
            h.order.insert(Var::from_index(i), &h.activity);
        }
        h
    }

    pub fn grow_to(&mut self, num_vars: usize) {
        if self.activity.len() < num_vars {
            self.activity.resize(num_vars, 0.0);
        }
        self.order.grow_to(num_vars);
    }

    /// Bumps `v`'s activity; rescales everything by `1e-100` on overflow
    /// (spec §4.6, grounded on the teacher's identical overflow guard).
    pub fn bump(&mut self, v: Var) {
        let new = self.activity[v.index()] + self.var_inc;
        if new > 1e100 {
            for a in self.activity.iter_mut() {
                *a *= 1e-100;
            }
            self.var_inc *= 1e-100;
            self.activity[v.index()] = self.activity[v.index()] + self.var_inc;
        } else {
            self.activity[v.index()] = new;
        }
        self.order.update(v, &self.activity);
    }

    /// Grows the bump increment once per conflict (`var_inc /= var_decay`).
    pub fn decay(&mut self) {
        self.var_inc *= 1.0 / self.settings.var_decay;
    }

    pub fn on_unassigned(&mut self, v: Var) {
        self.order.insert(v, &self.activity);
    }

    /// Picks the next decision literal: highest VSIDS-scoring unassigned
    /// variable, ties broken uniformly at random, polarity fixed to TRUE
    /// (spec §4.6 — phase selection is a non-goal). Returns `None` once
    /// every variable is assigned.
    pub fn pick_branch_lit(&mut self, assigns: &Assignment) -> Option<Lit> {
        if self.settings.random_var_freq > 0.0 && !self.order.is_empty() && self.rand.chance(self.settings.random_var_freq) {
            let v = self.order.at(self.rand.irand(self.order.len()));
            if assigns.is_undef(v) {
                self.rnd_decisions += 1;
                self.decisions += 1;
                return Some(v.pos_lit());
            }
        }

        while let Some(v) = self.order.pop(&self.activity) {
            if assigns.is_undef(v) {
                self.decisions += 1;
                return Some(v.pos_lit());
            }
        }
        None
    }
}

/// The Luby restart sequence (spec §4.7, grounded on the teacher's
/// `search::util::luby` / `search::luby`).
pub fn luby(factor: f64, mut x: u32) -> f64 {
    let mut size = 1;
    let mut seq = 0;
    while size < x + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != x {
        size = (size - 1) >> 1;
        seq -= 1;
        x %= size;
    }
    factor.powi(seq)
}
