//! The clause database (spec §3, §4.2).
//!
//! Grounded on the teacher's `minisat::clause`/`minisat::clause_db`, but
//! dropped down to a plain `Vec<Clause>` instead of a relocating
//! `ClauseAllocator`: this crate's non-goals exclude preprocessing, and
//! without subsumption/elimination there is no need for byte-packed clause
//! storage. `ClauseRef` stays a stable index into `original` clauses and a
//! renumbered index into `learnt` clauses, exactly as spec I4 requires.

use super::lit::Lit;

/// A clause owns its literals; slots `[0]` and `[1]` are the two watched
/// literals (spec §3 "Clause"). `find_new_watch` (see `watches.rs`) swaps
/// within this array, never reallocating it.
#[derive(Clone, Debug)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    fn new(lits: Vec<Lit>) -> Clause {
        debug_assert!(lits.len() >= 2);
        Clause { lits }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    #[inline]
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    #[inline]
    pub fn watch(&self, slot: usize) -> Lit {
        self.lits[slot]
    }

    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        self.lits.swap(i, j);
    }
}

impl std::ops::Index<usize> for Clause {
    type Output = Lit;

    #[inline]
    fn index(&self, i: usize) -> &Lit {
        &self.lits[i]
    }
}

/// Index into the clause database. Stable for original clauses; stable for
/// learnt clauses only between garbage collections (spec §4.2).
pub type ClauseRef = usize;

/// Default cap on total clause count before GC considers compaction.
pub const DEFAULT_DB_CAP: usize = 1_000_000;
/// Learnt clauses longer than this are dropped on GC.
pub const DEFAULT_CLAUSE_SIZE_CAP: usize = 25;

pub struct ClauseDb {
    /// `original[.. ]` lives at indices `[0, original.len())` and is never
    /// mutated after construction; `learnt` occupies `[original.len(), ..)`
    /// and is the only region GC may shrink.
    original: Vec<Clause>,
    learnt: Vec<Clause>,
    pub db_cap: usize,
    pub clause_size_cap: usize,
}

impl ClauseDb {
    pub fn new(db_cap: usize, clause_size_cap: usize) -> ClauseDb {
        ClauseDb {
            original: Vec::new(),
            learnt: Vec::new(),
            db_cap,
            clause_size_cap,
        }
    }

    pub fn original_count(&self) -> usize {
        self.original.len()
    }

    pub fn len(&self) -> usize {
        self.original.len() + self.learnt.len()
    }

    pub fn learnt_count(&self) -> usize {
        self.learnt.len()
    }

    #[inline]
    fn is_learnt_ref(&self, cr: ClauseRef) -> bool {
        cr >= self.original.len()
    }

    pub fn clause(&self, cr: ClauseRef) -> &Clause {
        if self.is_learnt_ref(cr) {
            &self.learnt[cr - self.original.len()]
        } else {
            &self.original[cr]
        }
    }

    pub fn clause_mut(&mut self, cr: ClauseRef) -> &mut Clause {
        let base = self.original.len();
        if cr >= base {
            &mut self.learnt[cr - base]
        } else {
            &mut self.original[cr]
        }
    }

    /// Appends a clause of length >= 2 to the original region. Clauses of
    /// length 0 or 1 are not representable here; the caller (problem
    /// construction) handles them directly as §4.2 specifies.
    pub fn add_original(&mut self, lits: Vec<Lit>) -> ClauseRef {
        assert!(lits.len() >= 2);
        assert!(
            self.learnt.is_empty(),
            "original clauses must be added before any clause is learnt"
        );
        self.original.push(Clause::new(lits));
        self.original.len() - 1
    }

    /// Appends a learnt clause of length >= 2, returning its index.
    pub fn add_learnt(&mut self, lits: Vec<Lit>) -> ClauseRef {
        assert!(lits.len() >= 2);
        self.learnt.push(Clause::new(lits));
        self.original.len() + self.learnt.len() - 1
    }

    pub fn needs_gc(&self) -> bool {
        self.len() > self.db_cap
    }

    /// Drops learnt clauses longer than `clause_size_cap`, renumbering the
    /// survivors. Returns the mapping `old_ref -> new_ref` for every
    /// surviving learnt clause, so the caller (only ever invoked at ground
    /// level, see `search.rs`) can repair watch lists; original clauses keep
    /// their indices (spec: "GC preserves index stability for original
    /// clauses").
    pub fn collect_garbage(&mut self) -> Vec<(ClauseRef, ClauseRef)> {
        let base = self.original.len();
        let mut kept = Vec::with_capacity(self.learnt.len());
        let mut relocations = Vec::new();
        for (i, clause) in self.learnt.drain(..).enumerate() {
            if clause.len() <= self.clause_size_cap {
                let old_ref = base + i;
                let new_ref = base + kept.len();
                if old_ref != new_ref {
                    relocations.push((old_ref, new_ref));
                }
                kept.push(clause);
            }
        }
        self.learnt = kept;
        relocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::lit::Var;

    fn lit(i: usize, sign: bool) -> Lit {
        Var::from_index(i).lit(sign)
    }

    #[test]
    fn original_refs_survive_gc() {
        let mut db = ClauseDb::new(100, 2);
        let o0 = db.add_original(vec![lit(0, false), lit(1, false)]);
        let l0 = db.add_learnt(vec![lit(2, false), lit(3, false)]);
        let l1 = db.add_learnt(vec![lit(0, true), lit(1, true), lit(2, true)]);

        let relocs = db.collect_garbage();
        assert!(db.clause(o0).len() == 2);
        assert_eq!(db.learnt_count(), 1, "the length-3 learnt clause exceeds the cap");
        assert!(relocs.is_empty(), "the surviving clause did not move");
        let _ = l0;
        let _ = l1;
    }

    #[test]
    fn gc_renumbers_survivors_contiguously() {
        let mut db = ClauseDb::new(100, 5);
        db.add_original(vec![lit(0, false), lit(1, false)]);
        db.add_learnt(vec![lit(0, true), lit(1, true), lit(2, true), lit(3, true), lit(4, true), lit(5, true)]); // len 6 > cap, dropped
        let kept = db.add_learnt(vec![lit(2, false), lit(3, false)]);

        let relocs = db.collect_garbage();
        assert_eq!(relocs, vec![(kept, kept - 1)]);
        assert_eq!(db.learnt_count(), 1);
    }
}
