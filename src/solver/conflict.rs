//! Conflict analysis: 1-UIP clause learning (spec §4.5).
//!
//! Grounded on the teacher's `search::conflict::AnalyzeContext::analyze`,
//! stripped of clause minimization (`CCMinMode`) — an explicit non-goal
//! here, see SPEC_FULL.md §4.5 — so the learned clause is exactly the 1-UIP
//! cut with no further shrinking pass.

use super::assignment::{Assignment, DecisionLevel, Reason, GROUND_LEVEL};
use super::clause::{ClauseDb, ClauseRef};
use super::lit::{Lit, Var};

pub struct Analyzer {
    seen: Vec<bool>,
}

impl Analyzer {
    pub fn new(num_vars: usize) -> Analyzer {
        Analyzer {
            seen: vec![false; num_vars],
        }
    }

    pub fn grow_to(&mut self, num_vars: usize) {
        if self.seen.len() < num_vars {
            self.seen.resize(num_vars, false);
        }
    }

    /// Walks the implication graph backwards from `conflict` to the 1-UIP,
    /// returning the learned clause (asserting literal in slot 0, the
    /// literal with the next-highest level in slot 1, per spec §4.5) and the
    /// backjump level. `bump` is invoked once per variable that ends up in
    /// the learned clause, for the caller to apply the VSIDS bump (spec
    /// step 4).
    pub fn analyze(
        &mut self,
        db: &ClauseDb,
        assigns: &Assignment,
        conflict: ClauseRef,
        mut bump: impl FnMut(Var),
    ) -> (Vec<Lit>, DecisionLevel) {
        let current_level = assigns.decision_level();
        debug_assert!(current_level > GROUND_LEVEL, "analyze called at ground level");

        let trail = assigns.trail();
        let mut learnt: Vec<Lit> = Vec::new();
        let mut path_count = 0usize;
        let mut confl = conflict;
        let mut trail_index = trail.len();
        let mut asserting: Option<Lit> = None;

        // `base` skips slot 0 on every resolution step after the first: the
        // first clause we resolve against is the conflicting clause itself
        // (every literal in it is relevant), but on every subsequent step
        // `confl` is the reason of the literal we are resolving away, whose
        // own literal (slot 0, by BCP's convention) is not a premise.
        let mut first = true;
        loop {
            let clause = db.clause(confl);
            let base = if first { 0 } else { 1 };
            first = false;

            for &q in &clause.lits()[base..] {
                let v = q.var();
                if self.seen[v.index()] {
                    continue;
                }
                let level = assigns.level(v);
                if level == GROUND_LEVEL {
                    continue;
                }
                self.seen[v.index()] = true;
                bump(v);
                if level >= current_level {
                    path_count += 1;
                } else {
                    learnt.push(q);
                }
            }

            // Find the next seen variable walking the trail backwards.
            loop {
                trail_index -= 1;
                if self.seen[trail[trail_index].var().index()] {
                    break;
                }
            }
            let p = trail[trail_index];
            self.seen[p.var().index()] = false;
            path_count -= 1;

            if path_count == 0 {
                asserting = Some(!p);
                break;
            }

            confl = match assigns.reason(p.var()) {
                Reason::Clause(cr) => cr,
                Reason::Decision => unreachable!("a variable with remaining path_count must have an implying reason"),
            };
        }

        // Clear `seen` for any variable still marked (can happen if the
        // ground-level short-circuit above skipped some of them).
        for &lit in learnt.iter() {
            self.seen[lit.var().index()] = false;
        }

        let asserting = asserting.expect("1-UIP search always finds an asserting literal");
        learnt.insert(0, asserting);

        let backjump_level = if learnt.len() == 1 {
            GROUND_LEVEL
        } else {
            let mut max_level = GROUND_LEVEL;
            let mut max_at = 1;
            for i in 1..learnt.len() {
                let level = assigns.level(learnt[i].var());
                if level > max_level {
                    max_level = level;
                    max_at = i;
                }
            }
            learnt.swap(1, max_at);
            max_level
        };

        (learnt, backjump_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::clause::ClauseDb;
    use crate::solver::lit::Var;
    use crate::solver::watches::Watches;

    fn lit(i: usize, sign: bool) -> Lit {
        Var::from_index(i).lit(sign)
    }

    #[test]
    fn analyze_produces_unit_clause_from_a_binary_conflict() {
        // x0 decided true at level 1 forces, via two binary clauses, both
        // x1 true and x1 false: a direct conflict whose 1-UIP cut is the
        // single literal -x0 (since both implications trace to the level-1
        // decision and nothing else).
        let mut db = ClauseDb::new(100, 25);
        db.add_original(vec![lit(0, true), lit(1, false)]); // -x0 | x1
        db.add_original(vec![lit(0, true), lit(1, true)]); // -x0 | -x1

        let mut watches = Watches::new(2);
        for cr in 0..db.len() {
            watches.watch_clause(&db, cr, 2);
        }

        let mut assigns = Assignment::new(2);
        assigns.push_level();
        assigns.assign(lit(0, false), 1, Reason::Decision);

        let conflict = watches.propagate(&mut db, &mut assigns).expect("expected a conflict");

        let mut analyzer = Analyzer::new(2);
        let (learnt, backjump) = analyzer.analyze(&db, &assigns, conflict, |_| {});

        assert_eq!(learnt.len(), 1);
        assert_eq!(learnt[0], lit(0, true), "learned unit clause should assert -x0");
        assert_eq!(backjump, GROUND_LEVEL);
    }
}
