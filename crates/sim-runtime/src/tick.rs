//! Live time steps.

use sim_core::{GameState, Millis, MAX_TICK_SECS};
use sim_econ::achievements::unlock_new;
use sim_econ::{prestige_gain, total_production_rate};
use tracing::info;

use crate::notice::{Notice, NoticeSink};

/// Seconds since the last accrual, capped at one second per tick.
pub fn tick_secs(state: &GameState, now: Millis) -> f64 {
    (now.saturating_sub(state.last_tick) as f64 / 1_000.0).clamp(0.0, MAX_TICK_SECS)
}

/// Credits production for the elapsed tick and stamps `last_tick`.
/// Returns the seconds accounted for.
pub fn accrue(state: &mut GameState, now: Millis) -> f64 {
    let dt = tick_secs(state, now);
    state.last_tick = now;
    if !state.end_game {
        let gained = total_production_rate(state) * dt;
        state.credit(gained);
    }
    dt
}

pub fn run_complete_notice(state: &GameState) -> Notice {
    Notice::RunComplete {
        year: state.current_year.floor() as u32,
        total_gained: state.total_gained,
        prestige_gain: prestige_gain(state),
    }
}

/// Moves the calendar and announces the end of the run once.
pub fn advance_calendar<S: NoticeSink + ?Sized>(
    state: &mut GameState,
    dt: f64,
    sink: &mut S,
) -> bool {
    if !state.advance_calendar(dt) {
        return false;
    }
    info!(
        total_gained = state.total_gained,
        prestige_gain = prestige_gain(state),
        "run complete"
    );
    sink.push(run_complete_notice(state));
    true
}

pub fn check_achievements<S: NoticeSink + ?Sized>(state: &mut GameState, sink: &mut S) {
    for a in unlock_new(state) {
        sink.push(Notice::AchievementUnlocked {
            id: a.id,
            name: a.name,
            desc: a.desc,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::END_YEAR;

    #[test]
    fn dt_is_clamped() {
        let mut s = GameState::new(0);
        assert_eq!(tick_secs(&s, 100), 0.1);
        assert_eq!(tick_secs(&s, 60_000), 1.0);
        s.last_tick = 500;
        assert_eq!(tick_secs(&s, 0), 0.0);
        s.last_tick = Millis::MIN;
        assert_eq!(tick_secs(&s, 1_700_000_000_000), 1.0);
        s.last_tick = Millis::MAX;
        assert_eq!(tick_secs(&s, -1), 0.0);
    }

    #[test]
    fn accrual_credits_rate_times_dt() {
        let mut s = GameState::new(0);
        s.industries.get_mut("factory").unwrap().count = 2;
        let dt = accrue(&mut s, 500);
        assert_eq!(dt, 0.5);
        assert_eq!(s.gdp, 1.0);
        assert_eq!(s.total_gained, 1.0);
        assert_eq!(s.last_tick, 500);
    }

    #[test]
    fn ended_run_stops_accruing() {
        let mut s = GameState::new(0);
        s.industries.get_mut("factory").unwrap().count = 2;
        s.end_game = true;
        accrue(&mut s, 1_000);
        assert_eq!(s.gdp, 0.0);
    }

    #[test]
    fn run_complete_announced_once() {
        let mut s = GameState::new(0);
        s.current_year = END_YEAR - 0.25;
        let mut sink: Vec<Notice> = Vec::new();
        assert!(advance_calendar(&mut s, 1.0, &mut sink));
        assert!(!advance_calendar(&mut s, 1.0, &mut sink));
        assert_eq!(sink.len(), 1);
        assert_eq!(s.current_year, END_YEAR);
        assert!(matches!(sink[0], Notice::RunComplete { year: 2020, .. }));
    }

    proptest! {
        #[test]
        fn calendar_never_passes_end(steps in proptest::collection::vec(0.0f64..1.0, 0..300)) {
            let mut s = GameState::new(0);
            let mut sink: Vec<Notice> = Vec::new();
            for dt in steps {
                advance_calendar(&mut s, dt, &mut sink);
                prop_assert!(s.current_year <= END_YEAR);
            }
            prop_assert!(sink.len() <= 1);
        }
    }
}
