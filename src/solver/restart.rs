//! Restart controller (spec §4.7).
//!
//! Grounded on the teacher's `search::util::luby`-driven restart check in
//! `minisat::solver::Solver::search`: a conflict counter compared against a
//! threshold that either grows geometrically (`restart_inc`) or follows the
//! Luby sequence, depending on `RestartSettings::luby_restarts`.
//!
//! Recording a conflict and deciding/applying a restart are split into
//! separate steps (`record_conflict`, `due`, `reset`) because the caller
//! must propagate the asserting literal to quiescence between the two: the
//! teacher's `search` only ever checks its restart threshold once BCP has
//! returned with no conflict.

use super::config::RestartSettings;
use super::heuristic::luby;

pub struct RestartController {
    settings: RestartSettings,
    conflicts_since_restart: u64,
    restart_count: u64,
    pub total_restarts: u64,
}

impl RestartController {
    pub fn new(settings: RestartSettings) -> RestartController {
        RestartController {
            settings,
            conflicts_since_restart: 0,
            restart_count: 0,
            total_restarts: 0,
        }
    }

    fn threshold(&self) -> f64 {
        if self.settings.luby_restarts {
            luby(self.settings.restart_inc, self.restart_count as u32) * self.settings.restart_first as f64
        } else {
            let mut t = self.settings.restart_first as f64;
            for _ in 0..self.restart_count {
                t *= self.settings.restart_inc;
            }
            t
        }
    }

    /// Records one conflict. Call this as soon as `propagate` reports a
    /// conflict; it only updates bookkeeping, it never decides to restart.
    pub fn record_conflict(&mut self) {
        self.conflicts_since_restart += 1;
    }

    /// Whether a restart is due. Only meaningful once the trail is
    /// quiescent (`propagate` returned no conflict) — checking it any
    /// earlier risks truncating the trail before a just-learned unit has
    /// been propagated.
    pub fn due(&self) -> bool {
        (self.conflicts_since_restart as f64) >= self.threshold()
    }

    /// Resets the per-restart counter and advances the schedule. Call this
    /// once the caller has committed to restarting.
    pub fn reset(&mut self) {
        self.conflicts_since_restart = 0;
        self.restart_count += 1;
        self.total_restarts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_conflict(ctl: &mut RestartController) -> bool {
        ctl.record_conflict();
        if ctl.due() {
            ctl.reset();
            true
        } else {
            false
        }
    }

    #[test]
    fn geometric_schedule_grows() {
        let mut ctl = RestartController::new(RestartSettings {
            luby_restarts: false,
            restart_first: 2,
            restart_inc: 2.0,
        });
        assert!(!on_conflict(&mut ctl));
        assert!(on_conflict(&mut ctl));
        assert!(!on_conflict(&mut ctl));
        assert!(!on_conflict(&mut ctl));
        assert!(!on_conflict(&mut ctl));
        assert!(on_conflict(&mut ctl));
        assert_eq!(ctl.total_restarts, 2);
    }

    #[test]
    fn luby_schedule_restarts_more_often_early() {
        let mut ctl = RestartController::new(RestartSettings {
            luby_restarts: true,
            restart_first: 1,
            restart_inc: 2.0,
        });
        assert!(on_conflict(&mut ctl), "first luby unit is 1 conflict");
        assert!(on_conflict(&mut ctl), "second luby unit is also 1 conflict");
    }
}
