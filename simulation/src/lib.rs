#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick driver wiring the world to the pure systems in a fixed order.
//!
//! Each [`Simulation::step`] advances the clock, resolves intents and
//! movement, attacks and projectiles, lets the reactive systems answer the
//! deaths and timers of the tick, collects pickups and finally checks the
//! wave state. A death and its rewards therefore land in the same step.
//! Boundary commands are accepted between steps through dedicated methods.

use std::{fmt, time::Duration};

use archer_arena_core::{ArenaError, Command, Event, GameConfig, Skill};
use archer_arena_system_combat::Combat;
use archer_arena_system_progression::{self as progression, DropRoller};
use archer_arena_system_spawning::{self as spawning, WaveDirector};
use archer_arena_system_targeting::Targeting;
use archer_arena_world::{self as world, query, World};
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, trace};

/// Receives every event the simulation emits, in emission order.
pub trait Observer {
    /// Called once per event after the command batch producing it settled.
    fn on_event(&mut self, event: &Event);
}

/// Snapshot of the headline session figures.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Current room level.
    pub level: u32,
    /// Player experience level.
    pub player_level: u32,
    /// Player health at the time of the summary.
    pub player_health: u32,
    /// Enemies killed during the session.
    pub enemies_killed: u32,
    /// Gold collected during the session.
    pub gold_collected: u32,
    /// Kills times one hundred plus collected gold.
    pub score: u32,
    /// Unpaused play time in seconds.
    pub game_time_secs: f32,
    /// Whether the player died.
    pub game_over: bool,
}

/// Drives one play session.
pub struct Simulation {
    world: World,
    director: WaveDirector,
    targeting: Targeting,
    combat: Combat,
    drops: DropRoller,
    observers: Vec<Box<dyn Observer>>,
    last_events: Vec<Event>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("world", &self.world)
            .field("director", &self.director)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Validates the configuration and starts a fresh session at level one.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidArgument`] when the configuration is rejected.
    pub fn new(config: GameConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let mut simulation = Self {
            director: WaveDirector::new(spawning::Config::from_game(&config)),
            drops: DropRoller::new(progression::Config::from_game(&config)),
            targeting: Targeting::new(),
            combat: Combat::new(),
            world: World::new(config),
            observers: Vec::new(),
            last_events: Vec::new(),
        };
        simulation.submit(Command::StartNewGame);
        Ok(simulation)
    }

    /// Registers an observer for every subsequent event.
    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events emitted by the most recent step or boundary command.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.last_events
    }

    /// Records the latest movement input.
    pub fn set_move_input(&mut self, input: Vec2) {
        self.submit(Command::SetMoveInput { input });
    }

    /// Pauses a running session or resumes a paused one.
    pub fn toggle_pause(&mut self) {
        self.submit(Command::TogglePause);
    }

    /// Discards the session and starts over at level one.
    pub fn start_new_game(&mut self) {
        self.submit(Command::StartNewGame);
    }

    /// Leaves the current room immediately.
    pub fn advance_to_next_level(&mut self) {
        self.submit(Command::AdvanceToNextLevel);
    }

    /// Applies a skill upgrade to the player.
    pub fn apply_skill_upgrade(&mut self, skill: Skill) {
        self.submit(Command::ApplySkillUpgrade { skill });
    }

    /// Advances the session by `dt`, running every phase in order.
    pub fn step(&mut self, dt: Duration) {
        let mut events = Vec::new();
        let mut settled = 0;
        self.execute([Command::Tick { dt }], &mut events);
        if !query::is_running(&self.world) {
            trace!("step skipped while paused or over");
            self.publish(events);
            return;
        }

        let mut commands = Vec::new();
        self.targeting.handle(
            &query::actor_view(&self.world),
            query::move_input(&self.world),
            query::config(&self.world).bodies.input_deadzone,
            &mut commands,
        );
        commands.push(Command::IntegrateMovement);
        self.execute(commands.drain(..), &mut events);

        self.combat
            .handle(&query::actor_view(&self.world), &mut commands);
        commands.push(Command::ResolveProjectiles);
        self.execute(commands.drain(..), &mut events);

        self.settle(&mut events, &mut settled);
        self.execute([Command::ResolvePickups], &mut events);
        self.execute([Command::CheckWaveState], &mut events);
        self.settle(&mut events, &mut settled);

        self.publish(events);
    }

    /// Summarises the session.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        let player = query::player_stats(&self.world);
        SessionSummary {
            level: query::level(&self.world),
            player_level: player.map_or(0, |stats| stats.level),
            player_health: player.map_or(0, |stats| stats.current_health),
            enemies_killed: query::total_enemies_killed(&self.world),
            gold_collected: query::total_gold_collected(&self.world),
            score: query::score(&self.world),
            game_time_secs: query::game_time(&self.world).as_secs_f32(),
            game_over: query::is_game_over(&self.world),
        }
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        let mut settled = 0;
        self.execute([command], &mut events);
        self.settle(&mut events, &mut settled);
        self.publish(events);
    }

    fn execute(&mut self, commands: impl IntoIterator<Item = Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }

    /// Feeds unseen events to the reactive systems until they stop answering.
    fn settle(&mut self, events: &mut Vec<Event>, settled: &mut usize) {
        let mut commands = Vec::new();
        while *settled < events.len() {
            let fresh = &events[*settled..];
            let room = query::room(&self.world);
            self.director.handle(
                fresh,
                room.floor_cells(),
                query::config(&self.world).room.player_start(),
                &mut commands,
            );
            self.drops.handle(fresh, &mut commands);
            *settled = events.len();
            if commands.is_empty() {
                break;
            }
            trace!(count = commands.len(), "reactive commands");
            self.execute(commands.drain(..), events);
        }
    }

    fn publish(&mut self, events: Vec<Event>) {
        for event in &events {
            if matches!(event, Event::GameOver | Event::LevelChanged { .. }) {
                debug!(?event, score = query::score(&self.world), "session milestone");
            }
            for observer in &mut self.observers {
                observer.on_event(event);
            }
        }
        self.last_events = events;
    }
}
