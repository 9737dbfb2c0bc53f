//! Per-variable assignment plus the chronological trail (spec §3, §4.1).
//!
//! Grounded on the teacher's `minisat::assignment::Assignment` /
//! `minisat::propagation_trail::PropagationTrail`, simplified: no clause
//! allocator relocation (this crate's clause database is a plain growable
//! `Vec`, see `clause.rs`), and the trail drives a FIFO propagation queue
//! directly via `qhead` rather than a separate queue type.

use super::clause::ClauseRef;
use super::lit::{Lit, Var};

pub type DecisionLevel = usize;

pub const GROUND_LEVEL: DecisionLevel = 0;

/// Why a variable was assigned. `Decision` marks the first assignment of a
/// decision level; anything else is a BCP implication, carrying the clause
/// that became unit (spec I2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    Decision,
    Clause(ClauseRef),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Value {
    Unassigned,
    True,
    False,
}

impl Value {
    #[inline]
    pub fn is_unassigned(self) -> bool {
        self == Value::Unassigned
    }
}

#[derive(Clone, Copy)]
struct VarData {
    value: Value,
    level: DecisionLevel,
    reason: Reason,
}

impl Default for VarData {
    fn default() -> Self {
        VarData {
            value: Value::Unassigned,
            level: GROUND_LEVEL,
            reason: Reason::Decision,
        }
    }
}

/// The assignment plus the chronological trail of assigned literals,
/// partitioned into decision levels by `level_limits`.
pub struct Assignment {
    vars: Vec<VarData>,
    trail: Vec<Lit>,
    level_limits: Vec<usize>,
    /// Index of the next trail literal BCP has not yet processed.
    qhead: usize,
}

impl Assignment {
    pub fn new(num_vars: usize) -> Assignment {
        Assignment {
            vars: vec![VarData::default(); num_vars],
            trail: Vec::with_capacity(num_vars),
            level_limits: Vec::new(),
            qhead: 0,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    #[inline]
    pub fn decision_level(&self) -> DecisionLevel {
        self.level_limits.len()
    }

    #[inline]
    pub fn is_ground_level(&self) -> bool {
        self.level_limits.is_empty()
    }

    #[inline]
    pub fn num_assigned(&self) -> usize {
        self.trail.len()
    }

    #[inline]
    pub fn is_fully_assigned(&self) -> bool {
        self.trail.len() == self.vars.len()
    }

    #[inline]
    pub fn value(&self, lit: Lit) -> Value {
        match self.vars[lit.var().index()].value {
            Value::Unassigned => Value::Unassigned,
            v if lit.sign() == false => v,
            Value::True => Value::False,
            Value::False => Value::True,
        }
    }

    #[inline]
    pub fn is_true(&self, lit: Lit) -> bool {
        self.value(lit) == Value::True
    }

    #[inline]
    pub fn is_false(&self, lit: Lit) -> bool {
        self.value(lit) == Value::False
    }

    #[inline]
    pub fn is_undef(&self, v: Var) -> bool {
        self.vars[v.index()].value.is_unassigned()
    }

    #[inline]
    pub fn level(&self, v: Var) -> DecisionLevel {
        self.vars[v.index()].level
    }

    #[inline]
    pub fn reason(&self, v: Var) -> Reason {
        self.vars[v.index()].reason
    }

    pub fn push_level(&mut self) {
        self.level_limits.push(self.trail.len());
    }

    /// Assigns `lit` to TRUE at `level` with `reason`, appends it to the
    /// trail. Panics if the variable is already assigned (spec: fails with
    /// `ALREADY_ASSIGNED`).
    pub fn assign(&mut self, lit: Lit, level: DecisionLevel, reason: Reason) {
        let v = lit.var();
        assert!(
            self.vars[v.index()].value.is_unassigned(),
            "assign called on an already-assigned variable"
        );
        self.vars[v.index()] = VarData {
            value: if lit.sign() { Value::False } else { Value::True },
            level,
            reason,
        };
        self.trail.push(lit);
    }

    /// Pops the BCP queue: the next trail literal not yet propagated.
    pub fn dequeue(&mut self) -> Option<Lit> {
        if self.qhead < self.trail.len() {
            let lit = self.trail[self.qhead];
            self.qhead += 1;
            Some(lit)
        } else {
            None
        }
    }

    /// Drops the remainder of the propagation queue; used when a conflict is
    /// found mid-sweep so stale literals are not reprocessed.
    pub fn clear_queue(&mut self) {
        self.qhead = self.trail.len();
    }

    /// Unassigns every variable with level > `target` in reverse trail order
    /// and truncates the decision-boundary sequence so the current level is
    /// exactly `target` (spec §4.1). Watches are untouched (spec note: that
    /// is safe because re-propagation repairs them lazily).
    pub fn pop_to(&mut self, target: DecisionLevel) -> Vec<Var> {
        if self.decision_level() <= target {
            return Vec::new();
        }
        let limit = self.level_limits[target];
        let mut unassigned = Vec::with_capacity(self.trail.len() - limit);
        for &lit in self.trail[limit..].iter().rev() {
            let v = lit.var();
            self.vars[v.index()] = VarData::default();
            unassigned.push(v);
        }
        self.trail.truncate(limit);
        self.level_limits.truncate(target);
        self.qhead = self.trail.len();
        unassigned
    }

    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Extracts the satisfying model as `lit.to_dimacs()` literals in
    /// ascending variable order (spec §6.2). Only valid when fully assigned.
    pub fn extract_model(&self) -> Vec<Lit> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, vd)| {
                let v = Var::from_index(i);
                match vd.value {
                    Value::True => v.pos_lit(),
                    Value::False => v.neg_lit(),
                    Value::Unassigned => v.pos_lit(),
                }
            })
            .collect()
    }
}
