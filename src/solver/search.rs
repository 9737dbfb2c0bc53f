//! The search driver (spec §4.6): the CDCL main loop tying together the
//! trail, clause database, watch index, decision heuristic, conflict
//! analyzer and restart controller.
//!
//! Grounded on the teacher's `minisat::solver::Solver::search` /
//! `sat::minisat::search::search`, with the simp/elim/assumption machinery
//! removed (non-goals) and the restart-on-conflict check delegated to
//! `RestartController` instead of being inlined. As in the teacher, the
//! loop calls `propagate` exactly once per iteration and only considers a
//! restart (or the next decision) once it returns with no conflict — this
//! guarantees a just-learned unit is fully propagated, at its correct
//! level, before the trail can be truncated.

use log::{debug, info};

use super::assignment::{Assignment, Reason, Value, GROUND_LEVEL};
use super::clause::ClauseDb;
use super::conflict::Analyzer;
use super::config::Config;
use super::heuristic::DecisionHeuristic;
use super::lit::Lit;
use super::restart::RestartController;
use super::watches::Watches;

#[derive(Debug, PartialEq, Eq)]
pub enum Verdict {
    Sat(Vec<Lit>),
    Unsat,
}

pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub restarts: u64,
}

/// A single CNF instance in solved form: the clause database, trail and
/// supporting structures needed to run the CDCL loop to completion.
pub struct Solver {
    assigns: Assignment,
    db: ClauseDb,
    watches: Watches,
    heuristic: DecisionHeuristic,
    analyzer: Analyzer,
    restart: RestartController,
    conflicts: u64,
}

impl Solver {
    pub fn new(num_vars: usize, config: Config) -> Solver {
        Solver {
            assigns: Assignment::new(num_vars),
            db: ClauseDb::new(config.gc.db_cap, config.gc.clause_size_cap),
            watches: Watches::new(num_vars),
            heuristic: DecisionHeuristic::new(num_vars, config.heuristic),
            analyzer: Analyzer::new(num_vars),
            restart: RestartController::new(config.restart),
            conflicts: 0,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.assigns.num_vars()
    }

    /// Adds one clause from the original problem (spec §4.2, §6.1). A
    /// clause of length 0 is an immediate contradiction; a clause of length
    /// 1 is enqueued directly as a level-0 unit rather than stored, per
    /// spec §4.2. Returns `false` if the addition makes the problem
    /// trivially UNSAT (an empty clause, or a unit conflicting with an
    /// earlier one), in which case the caller should stop adding clauses
    /// and report UNSAT without starting search.
    pub fn add_clause(&mut self, lits: Vec<Lit>) -> bool {
        if lits.is_empty() {
            return false;
        }
        if lits.len() == 1 {
            let unit = lits[0];
            return match self.assigns.value(unit) {
                Value::True => true,
                Value::False => false,
                Value::Unassigned => {
                    self.assigns.assign(unit, GROUND_LEVEL, Reason::Decision);
                    true
                }
            };
        }
        let cr = self.db.add_original(lits);
        self.watches.watch_clause(&self.db, cr, self.num_vars());
        true
    }

    pub fn stats(&self) -> Stats {
        Stats {
            decisions: self.heuristic.decisions,
            propagations: self.watches.propagations,
            conflicts: self.conflicts,
            restarts: self.restart.total_restarts,
        }
    }

    /// Runs the CDCL loop to completion (spec §4.6 steps 1-5).
    pub fn solve(&mut self) -> Verdict {
        info!(
            "starting search: vars={} original_clauses={}",
            self.num_vars(),
            self.db.original_count()
        );

        loop {
            match self.watches.propagate(&mut self.db, &mut self.assigns) {
                Some(conflict) => {
                    self.conflicts += 1;
                    self.restart.record_conflict();

                    if self.assigns.decision_level() == GROUND_LEVEL {
                        info!("conflict at ground level after {} conflicts total", self.conflicts);
                        return Verdict::Unsat;
                    }

                    let heuristic = &mut self.heuristic;
                    let (learnt, backjump_level) =
                        self.analyzer
                            .analyze(&self.db, &self.assigns, conflict, |v| heuristic.bump(v));
                    self.heuristic.decay();

                    debug!(
                        "conflict -> learnt clause of size {} backjump to level {}",
                        learnt.len(),
                        backjump_level
                    );

                    let unassigned = self.assigns.pop_to(backjump_level);
                    for v in unassigned {
                        self.heuristic.on_unassigned(v);
                    }
                    let asserting = learnt[0];

                    if learnt.len() == 1 {
                        self.assigns.assign(asserting, GROUND_LEVEL, Reason::Decision);
                    } else {
                        let cr = self.db.add_learnt(learnt);
                        self.watches.watch_clause(&self.db, cr, self.num_vars());
                        self.assigns.assign(asserting, backjump_level, Reason::Clause(cr));
                    }

                    if self.db.needs_gc() && self.assigns.is_ground_level() {
                        self.collect_garbage();
                    }

                    // Loop back around: the asserting literal (and anything
                    // it implies) must be propagated to quiescence before a
                    // restart or a new decision is considered.
                }
                None => {
                    if self.restart.due() {
                        info!("restarting after {} conflicts", self.conflicts);
                        self.restart.reset();
                        for v in self.assigns.pop_to(GROUND_LEVEL) {
                            self.heuristic.on_unassigned(v);
                        }
                        continue;
                    }

                    if self.assigns.is_fully_assigned() {
                        info!("every variable assigned, SAT");
                        return Verdict::Sat(self.assigns.extract_model());
                    }

                    let decision = match self.heuristic.pick_branch_lit(&self.assigns) {
                        Some(lit) => lit,
                        None => {
                            info!("decision heuristic exhausted with assignment incomplete, SAT");
                            return Verdict::Sat(self.assigns.extract_model());
                        }
                    };

                    self.assigns.push_level();
                    self.assigns.assign(decision, self.assigns.decision_level(), Reason::Decision);
                    debug!("decide {:?} @level {}", decision, self.assigns.decision_level());
                }
            }
        }
    }

    /// Ground-level-only GC (spec §4.2's chosen resolution, SPEC_FULL.md
    /// §4.2): reasons never point into the learned region while the trail
    /// is entirely at level 0, so renumbering learnt clauses here cannot
    /// invalidate any live reason. Watches are rebuilt from scratch since
    /// every learnt clause's index may have shifted.
    fn collect_garbage(&mut self) {
        let relocations = self.db.collect_garbage();
        if !relocations.is_empty() {
            self.watches.rebuild(&self.db, self.num_vars());
        }
        debug!("gc: db now holds {} clauses", self.db.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::lit::Var;

    fn lit(i: usize, sign: bool) -> Lit {
        Var::from_index(i).lit(sign)
    }

    fn solve(num_vars: usize, clauses: Vec<Vec<Lit>>) -> Verdict {
        let mut solver = Solver::new(num_vars, Config::default());
        for c in clauses {
            if !solver.add_clause(c) {
                return Verdict::Unsat;
            }
        }
        solver.solve()
    }

    fn assert_sat_satisfies(verdict: &Verdict, clauses: &[Vec<Lit>]) {
        match verdict {
            Verdict::Sat(model) => {
                for clause in clauses {
                    let satisfied = clause.iter().any(|&lit| model[lit.var().index()] == lit);
                    assert!(satisfied, "clause {:?} not satisfied by model {:?}", clause, model);
                }
            }
            Verdict::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn unit_clause_is_sat() {
        let clauses = vec![vec![lit(0, false)]];
        let verdict = solve(1, clauses.clone());
        assert_sat_satisfies(&verdict, &clauses);
    }

    #[test]
    fn conflicting_units_are_unsat() {
        let verdict = solve(1, vec![vec![lit(0, false)], vec![lit(0, true)]]);
        assert_eq!(verdict, Verdict::Unsat);
    }

    #[test]
    fn three_clause_instance_is_sat() {
        let clauses = vec![
            vec![lit(0, false), lit(1, false)],
            vec![lit(0, true), lit(2, false)],
            vec![lit(1, true), lit(2, true)],
        ];
        let verdict = solve(3, clauses.clone());
        assert_sat_satisfies(&verdict, &clauses);
    }

    #[test]
    fn four_clause_instance_is_sat() {
        let clauses = vec![
            vec![lit(0, false), lit(1, false)],
            vec![lit(0, true), lit(2, false)],
            vec![lit(1, true), lit(3, false)],
            vec![lit(2, true), lit(3, true)],
        ];
        let verdict = solve(4, clauses.clone());
        assert_sat_satisfies(&verdict, &clauses);
    }

    #[test]
    fn pigeonhole_php_3_2_is_unsat() {
        // 3 pigeons (0,1,2), 2 holes (0,1); var index = pigeon*2 + hole.
        let v = |p: usize, h: usize| p * 2 + h;
        let mut clauses = Vec::new();
        for p in 0..3 {
            clauses.push(vec![lit(v(p, 0), false), lit(v(p, 1), false)]);
        }
        for h in 0..2 {
            for p1 in 0..3 {
                for p2 in (p1 + 1)..3 {
                    clauses.push(vec![lit(v(p1, h), true), lit(v(p2, h), true)]);
                }
            }
        }
        let verdict = solve(6, clauses);
        assert_eq!(verdict, Verdict::Unsat);
    }

    #[test]
    fn empty_clause_is_unsat_without_deciding() {
        let verdict = solve(1, vec![Vec::new()]);
        assert_eq!(verdict, Verdict::Unsat);
    }
}
