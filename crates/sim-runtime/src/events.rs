//! Random global events: one at a time, each followed by a fresh delay.

use rand::Rng;
use sim_core::catalog::{EventDef, EVENTS};
use sim_core::{ActiveEvent, GameState, Millis, EVENT_DELAY_MAX_MS, EVENT_DELAY_MIN_MS};
use tracing::info;

use crate::notice::{Notice, NoticeSink};

/// Next trigger time, uniformly 20 to 40 seconds out.
pub fn schedule_next<R: Rng + ?Sized>(now: Millis, rng: &mut R) -> Millis {
    now.saturating_add(rng.gen_range(EVENT_DELAY_MIN_MS..=EVENT_DELAY_MAX_MS))
}

/// Activates a uniformly chosen event, replacing any running one.
pub fn start_random<R, S>(
    state: &mut GameState,
    now: Millis,
    rng: &mut R,
    sink: &mut S,
) -> &'static EventDef
where
    R: Rng + ?Sized,
    S: NoticeSink + ?Sized,
{
    let def = &EVENTS[rng.gen_range(0..EVENTS.len())];
    state.active_event = Some(ActiveEvent::from_def(def, now));
    info!(id = def.id, mult = def.mult, secs = def.duration_secs, "event started");
    sink.push(Notice::EventStarted {
        id: def.id.to_string(),
        name: def.name.to_string(),
        desc: def.desc.to_string(),
        duration_secs: def.duration_secs,
    });
    def
}

/// One scheduler step.
///
/// Expiry is checked before activation, so an event can end and the next
/// one can only start once its fresh delay has passed. The end of the run
/// blocks new events but lets a running one finish.
pub fn run_scheduler<R, S>(state: &mut GameState, now: Millis, rng: &mut R, sink: &mut S)
where
    R: Rng + ?Sized,
    S: NoticeSink + ?Sized,
{
    if state.next_event_at.is_none() {
        state.next_event_at = Some(schedule_next(now, rng));
    }
    if state.active_event.as_ref().is_some_and(|ev| now >= ev.end_time) {
        if let Some(ended) = state.active_event.take() {
            info!(id = %ended.id, "event ended");
            sink.push(Notice::EventEnded { name: ended.name });
        }
        state.next_event_at = Some(schedule_next(now, rng));
    }
    let due = state.next_event_at.is_some_and(|at| now >= at);
    if state.active_event.is_none() && !state.end_game && due {
        start_random(state, now, rng, sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn idle_schedules_within_window() {
        let mut s = GameState::new(0);
        let mut sink: Vec<Notice> = Vec::new();
        run_scheduler(&mut s, 1_000, &mut rng(), &mut sink);
        let at = s.next_event_at.unwrap();
        assert!((21_000..=41_000).contains(&at));
        assert!(s.active_event.is_none());
        assert!(sink.is_empty());
    }

    #[test]
    fn full_cycle_scheduled_active_scheduled() {
        let mut s = GameState::new(0);
        let mut r = rng();
        let mut sink: Vec<Notice> = Vec::new();
        s.next_event_at = Some(5_000);
        run_scheduler(&mut s, 4_999, &mut r, &mut sink);
        assert!(s.active_event.is_none());
        run_scheduler(&mut s, 5_000, &mut r, &mut sink);
        let ev = s.active_event.clone().unwrap();
        let def = sim_core::catalog::event(&ev.id).unwrap();
        assert_eq!(ev.end_time, 5_000 + i64::from(def.duration_secs) * 1_000);
        assert!(matches!(sink[0], Notice::EventStarted { .. }));

        run_scheduler(&mut s, ev.end_time, &mut r, &mut sink);
        assert!(s.active_event.is_none());
        let next = s.next_event_at.unwrap();
        assert!((ev.end_time + 20_000..=ev.end_time + 40_000).contains(&next));
        assert_eq!(sink.len(), 2);
        assert!(matches!(&sink[1], Notice::EventEnded { name } if *name == ev.name));
    }

    #[test]
    fn ended_run_blocks_new_events_but_not_running_ones() {
        let mut s = GameState::new(0);
        let mut r = rng();
        let mut sink: Vec<Notice> = Vec::new();
        s.end_game = true;
        s.next_event_at = Some(0);
        run_scheduler(&mut s, 10_000, &mut r, &mut sink);
        assert!(s.active_event.is_none());

        start_random(&mut s, 10_000, &mut r, &mut sink);
        run_scheduler(&mut s, 10_001, &mut r, &mut sink);
        assert!(s.active_event.is_some());
    }

    #[test]
    fn same_seed_same_choice() {
        let pick = |seed| {
            let mut s = GameState::new(0);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            start_random(&mut s, 0, &mut rng, &mut Vec::<Notice>::new()).id
        };
        assert_eq!(pick(9), pick(9));
    }
}
