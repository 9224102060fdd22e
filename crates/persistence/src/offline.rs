//! Catch-up for the time a save spent on disk.

use serde::Serialize;
use sim_core::{GameState, Millis};
use sim_econ::total_production_rate;
use tracing::info;

/// What a load credited for the time away.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OfflineReport {
    pub elapsed_secs: f64,
    pub gained: f64,
    /// Calendar years advanced.
    pub years: f64,
    /// The run reached its end year while away.
    pub run_completed: bool,
}

/// Credits production for the interval since `last_tick` at the current
/// rate, advances the calendar over the same interval and stamps
/// `last_tick = now`.
///
/// Credit is applied even when the run had already ended; only the calendar
/// stays latched at the end year. A run that ends during the interval still
/// accrues the whole interval.
pub fn apply_offline_progress(state: &mut GameState, now: Millis) -> OfflineReport {
    let elapsed_secs = now.saturating_sub(state.last_tick).max(0) as f64 / 1_000.0;
    let year_before = state.current_year;
    let gained = total_production_rate(state) * elapsed_secs;
    state.credit(gained);
    let run_completed = state.advance_calendar(elapsed_secs);
    state.last_tick = now;
    if elapsed_secs > 0.0 {
        info!(elapsed_secs, gained, run_completed, "offline progress applied");
    }
    OfflineReport {
        elapsed_secs,
        gained,
        years: state.current_year - year_before,
        run_completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::END_YEAR;

    fn producing_state(last_tick: Millis) -> GameState {
        let mut s = GameState::new(last_tick);
        s.industries.get_mut("factory").unwrap().count = 3;
        s
    }

    #[test]
    fn hundred_seconds_away() {
        let mut s = producing_state(0);
        let rate = total_production_rate(&s);
        let r = apply_offline_progress(&mut s, 100_000);
        assert_eq!(r.elapsed_secs, 100.0);
        assert_eq!(s.gdp, rate * 100.0);
        assert_eq!(s.total_gained, rate * 100.0);
        assert_eq!(s.current_year, 2020.0);
        assert!(s.end_game);
        assert!(r.run_completed);
        assert_eq!(s.last_tick, 100_000);
    }

    #[test]
    fn short_absence_moves_calendar_only_partly() {
        let mut s = producing_state(0);
        let r = apply_offline_progress(&mut s, 10_000);
        assert_eq!(s.current_year, 1975.0);
        assert_eq!(r.years, 5.0);
        assert!(!r.run_completed);
    }

    #[test]
    fn ended_run_still_earns_while_away() {
        let mut s = producing_state(0);
        s.end_game = true;
        s.current_year = END_YEAR;
        let rate = total_production_rate(&s);
        let r = apply_offline_progress(&mut s, 50_000);
        assert_eq!(r.gained, rate * 50.0);
        assert_eq!(s.gdp, rate * 50.0);
        assert_eq!(s.total_gained, rate * 50.0);
        assert_eq!(s.current_year, END_YEAR);
        assert_eq!(r.years, 0.0);
        assert!(!r.run_completed);
    }

    #[test]
    fn ancient_last_tick_does_not_overflow() {
        let mut s = GameState::new(i64::MIN);
        let r = apply_offline_progress(&mut s, 1_700_000_000_000);
        assert!(r.elapsed_secs > 0.0 && r.elapsed_secs.is_finite());
        assert!(s.end_game);
        assert_eq!(s.last_tick, 1_700_000_000_000);
    }

    #[test]
    fn clock_skew_counts_as_zero() {
        let mut s = producing_state(5_000);
        let r = apply_offline_progress(&mut s, 1_000);
        assert_eq!(r, OfflineReport::default());
        assert_eq!(s.last_tick, 1_000);
    }
}
