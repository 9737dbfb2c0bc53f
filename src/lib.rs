//! A CDCL SAT solver over DIMACS CNF input (spec §1).
//!
//! [`solver`] is the self-contained core (trail, clause database, watch
//! index, conflict analysis, search driver); [`dimacs`] and the multi-
//! instance driver below are the external collaborators the core does not
//! know about (spec: "out of scope: DIMACS text parsing, CLI / multi-
//! instance dispatch, output formatting").

pub mod dimacs;
pub mod solver;

use std::io::{BufRead, Write};

use log::info;

use dimacs::DimacsError;
use solver::{Config, Solver};

/// Reads a leading integer `n`, then solves `n` DIMACS instances back to
/// back from the same stream, writing each verdict to `out` in order
/// (spec §6.3). Stops at the first malformed instance.
pub fn run_multi_instance(input: &mut impl BufRead, out: &mut impl Write, config_for: impl Fn() -> Config) -> Result<(), DimacsError> {
    let n = read_instance_count(input)?;
    info!("multi-instance driver: solving {} instance(s)", n);
    for i in 0..n {
        info!("instance {}/{}", i + 1, n);
        run_one_instance(input, out, config_for())?;
    }
    Ok(())
}

fn read_instance_count(input: &mut impl BufRead) -> Result<usize, DimacsError> {
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(DimacsError::UnexpectedToken {
                line: 0,
                token: String::new(),
            });
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }
        return trimmed.parse().map_err(|_| DimacsError::UnexpectedToken {
            line: 0,
            token: trimmed.to_string(),
        });
    }
}

fn run_one_instance(input: &mut impl BufRead, out: &mut impl Write, config: Config) -> Result<(), DimacsError> {
    let instance = dimacs::read_instance(input)?;

    let mut solver = Solver::new(instance.num_vars, config);
    let mut trivially_unsat = false;
    for clause in instance.clauses {
        if !solver.add_clause(clause) {
            trivially_unsat = true;
            break;
        }
    }

    let verdict = if trivially_unsat {
        solver::Verdict::Unsat
    } else {
        solver.solve()
    };

    let stats = solver.stats();
    info!(
        "decisions={} propagations={} conflicts={} restarts={}",
        stats.decisions, stats.propagations, stats.conflicts, stats.restarts
    );

    dimacs::write_verdict(out, &verdict).map_err(DimacsError::Io)
}

/// Solves a single DIMACS instance read in full from `input` (no leading
/// instance count). Convenience wrapper for single-instance callers and
/// for tests.
pub fn run_single_instance(input: &mut impl BufRead, out: &mut impl Write, config: Config) -> Result<(), DimacsError> {
    run_one_instance(input, out, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn solves_a_single_sat_instance() {
        let mut input = Cursor::new(b"p cnf 1 1\n1 0\n" as &[u8]);
        let mut out = Vec::new();
        run_single_instance(&mut input, &mut out, Config::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("SAT\n"));
    }

    #[test]
    fn solves_a_multi_instance_stream() {
        let mut input = Cursor::new(b"2\np cnf 1 1\n1 0\np cnf 1 2\n1 0\n-1 0\n" as &[u8]);
        let mut out = Vec::new();
        run_multi_instance(&mut input, &mut out, Config::default).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("SAT"));
        lines.next();
        assert_eq!(lines.next(), Some("UNSAT"));
    }
}
