#![deny(warnings)]

//! ECS runtime for the simulation.
//!
//! The run state lives in a single [`Economy`] resource. A tick runs a
//! chained schedule (accrue, calendar, events, achievements); commands
//! borrow the same resources between ticks, so every mutation goes through
//! one owner.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::Schedule;
use bevy_ecs::system::SystemState;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sim_core::{GameState, Millis, SimConfig};
use sim_econ::EconomyView;
use tracing::info;

pub mod clock;
pub mod commands;
pub mod events;
pub mod notice;
pub mod tick;

pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::{Command, CommandError, DebugCommand, Receipt};
pub use notice::{Notice, NoticeLog, NoticeSink};

use persistence::{CodecError, OfflineReport};

#[derive(Resource, Debug)]
pub struct Economy(pub GameState);

/// Time of the tick being run and the seconds it accrues.
#[derive(Resource, Debug, Default)]
pub struct TickClock {
    pub now_ms: Millis,
    pub dt_secs: f64,
}

#[derive(Resource)]
pub struct EventRng(pub ChaCha8Rng);

fn accrue_production_system(mut eco: ResMut<Economy>, mut clock: ResMut<TickClock>) {
    clock.dt_secs = tick::accrue(&mut eco.0, clock.now_ms);
}

fn calendar_system(mut eco: ResMut<Economy>, clock: Res<TickClock>, mut log: ResMut<NoticeLog>) {
    tick::advance_calendar(&mut eco.0, clock.dt_secs, &mut *log);
}

fn event_scheduler_system(
    mut eco: ResMut<Economy>,
    clock: Res<TickClock>,
    mut rng: ResMut<EventRng>,
    mut log: ResMut<NoticeLog>,
) {
    events::run_scheduler(&mut eco.0, clock.now_ms, &mut rng.0, &mut *log);
}

fn achievement_system(mut eco: ResMut<Economy>, mut log: ResMut<NoticeLog>) {
    tick::check_achievements(&mut eco.0, &mut *log);
}

type CommandParams = (
    ResMut<'static, Economy>,
    ResMut<'static, EventRng>,
    ResMut<'static, NoticeLog>,
);

pub struct Simulation {
    world: World,
    schedule: Schedule,
    commands: SystemState<CommandParams>,
    clock: Box<dyn Clock>,
}

impl Simulation {
    pub fn new(state: GameState, config: &SimConfig, clock: Box<dyn Clock>) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut world = World::new();
        world.insert_resource(Economy(state));
        world.insert_resource(TickClock::default());
        world.insert_resource(EventRng(rng));
        world.insert_resource(NoticeLog::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                accrue_production_system,
                calendar_system,
                event_scheduler_system,
                achievement_system,
            )
                .chain(),
        );
        let commands = SystemState::new(&mut world);
        Self {
            world,
            schedule,
            commands,
            clock,
        }
    }

    /// A factory-fresh run starting now.
    pub fn fresh(config: &SimConfig, clock: Box<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self::new(GameState::new(now), config, clock)
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    /// Runs one live tick at the current clock time.
    pub fn tick(&mut self) {
        let now = self.now();
        self.world.resource_mut::<TickClock>().now_ms = now;
        self.schedule.run(&mut self.world);
    }

    pub fn apply(&mut self, cmd: Command) -> Result<Receipt, CommandError> {
        let now = self.now();
        let (mut eco, mut rng, mut log) = self.commands.get_mut(&mut self.world);
        commands::execute(&mut eco.0, cmd, now, &mut rng.0, &mut *log)
    }

    pub fn state(&self) -> &GameState {
        &self.world.resource::<Economy>().0
    }

    pub fn view(&self) -> EconomyView {
        EconomyView::build(self.state(), self.now())
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.world.resource_mut::<NoticeLog>().0)
    }

    /// JSON record of the current state, stamped with the current time.
    pub fn snapshot_json(&mut self) -> Result<String, CodecError> {
        let now = self.now();
        persistence::to_json(&mut self.world.resource_mut::<Economy>().0, now)
    }

    pub fn export_text(&mut self) -> Result<String, CodecError> {
        let now = self.now();
        persistence::export_text(&mut self.world.resource_mut::<Economy>().0, now)
    }

    /// Replaces the state with a stored record, crediting time away.
    /// On error the current state is kept.
    pub fn load_json(&mut self, json: &str) -> Result<OfflineReport, CodecError> {
        let (state, report) = persistence::load_json(json, self.now())?;
        info!(
            elapsed_secs = report.elapsed_secs,
            gained = report.gained,
            "save loaded"
        );
        let completed = report.run_completed.then(|| tick::run_complete_notice(&state));
        self.world.resource_mut::<Economy>().0 = state;
        if let Some(notice) = completed {
            self.world.resource_mut::<NoticeLog>().push(notice);
        }
        Ok(report)
    }
}
