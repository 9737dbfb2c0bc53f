//! Tunables gathered into one place (spec §4.8).
//!
//! Grounded on the teacher's per-module `*Settings` structs (e.g.
//! `decision_heuristic::DecisionHeuristicSettings`, `search::SimpSettings`),
//! each carrying its own `Default`; this crate aggregates them under one
//! `Config` the way the teacher's `minisat::solver::CoreSettings` does,
//! so a CLI flag layer (see `main.rs`) has one struct to fill in.

use super::clause::{DEFAULT_CLAUSE_SIZE_CAP, DEFAULT_DB_CAP};
use super::heuristic::DecisionHeuristicSettings;

/// Restart schedule (spec §4.7): geometric by default, Luby when
/// `luby_restarts` is set.
#[derive(Clone, Debug)]
pub struct RestartSettings {
    pub luby_restarts: bool,
    pub restart_first: u64,
    pub restart_inc: f64,
}

impl Default for RestartSettings {
    fn default() -> Self {
        RestartSettings {
            luby_restarts: false,
            restart_first: 100,
            restart_inc: 1.5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GcSettings {
    pub db_cap: usize,
    pub clause_size_cap: usize,
}

impl Default for GcSettings {
    fn default() -> Self {
        GcSettings {
            db_cap: DEFAULT_DB_CAP,
            clause_size_cap: DEFAULT_CLAUSE_SIZE_CAP,
        }
    }
}

/// Every tunable the search driver needs, aggregated so a single value can
/// be threaded from the CLI into `Solver::new` (spec §4.8, §4.11).
pub struct Config {
    pub heuristic: DecisionHeuristicSettings,
    pub restart: RestartSettings,
    pub gc: GcSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            heuristic: DecisionHeuristicSettings::default(),
            restart: RestartSettings::default(),
            gc: GcSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.gc.db_cap, 1_000_000);
        assert_eq!(cfg.gc.clause_size_cap, 25);
        assert_eq!(cfg.restart.restart_first, 100);
        assert!((cfg.restart.restart_inc - 1.5).abs() < f64::EPSILON);
        assert!(!cfg.restart.luby_restarts);
    }
}
