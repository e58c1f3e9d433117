#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Archer Arena.
//!
//! The world owns the play session, the current room, every actor, and the
//! projectile and pickup stores. It mutates only through [`apply`] and the
//! stat operations in [`combat`], and exposes read-only state via [`query`].

mod actors;
pub mod combat;
pub mod projectiles;
mod pickups;
mod room;

use std::time::Duration;

use archer_arena_core::{
    ActorId, ActorMode, ArenaError, Command, DoorState, EnemyStats, Event, GameConfig, Intent,
    LifeState, Side,
};
use glam::Vec2;
use tracing::{debug, error, trace, warn};

use actors::{ActorRegistry, ActorStats};
use pickups::PickupStore;
use projectiles::{Launch, ProjectileStore};
pub use room::Room;

/// Progress of the current room's wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// The room was generated and waits for the director's plan.
    AwaitingPlan,
    /// The wave is armed.
    Active {
        /// Enemies the director announced.
        planned: u32,
        /// Enemies spawned so far.
        spawned: u32,
    },
}

#[derive(Debug)]
struct Session {
    level: u32,
    enemies_remaining: u32,
    wave: WavePhase,
    paused: bool,
    game_over: bool,
    game_time: Duration,
    total_gold_collected: u32,
    total_enemies_killed: u32,
}

impl Session {
    fn new() -> Self {
        Self {
            level: 1,
            enemies_remaining: 0,
            wave: WavePhase::AwaitingPlan,
            paused: false,
            game_over: false,
            game_time: Duration::ZERO,
            total_gold_collected: 0,
            total_enemies_killed: 0,
        }
    }

    fn is_running(&self) -> bool {
        !self.paused && !self.game_over
    }
}

/// Represents the authoritative Archer Arena world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    session: Session,
    room: Room,
    actors: ActorRegistry,
    projectiles: ProjectileStore,
    pickups: PickupStore,
    move_input: Vec2,
    frame_dt: Duration,
}

impl World {
    /// Creates a world holding a fresh level-one session.
    ///
    /// The configuration is expected to have passed [`GameConfig::validate`].
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let room = Room::generate(config.room.width, config.room.height);
        let mut world = Self {
            config,
            session: Session::new(),
            room,
            actors: ActorRegistry::new(),
            projectiles: ProjectileStore::new(),
            pickups: PickupStore::new(),
            move_input: Vec2::ZERO,
            frame_dt: Duration::ZERO,
        };
        world.reset_session();
        world
    }

    fn reset_session(&mut self) {
        self.session = Session::new();
        self.room = Room::generate(self.config.room.width, self.config.room.height);
        self.actors.clear();
        self.projectiles.reset();
        self.pickups.reset();
        self.move_input = Vec2::ZERO;
        self.frame_dt = Duration::ZERO;

        let mut stats = self.config.player.clone();
        stats.current_health = stats.max_health;
        let _ = self.actors.insert(
            self.config.room.player_start(),
            1,
            ActorStats::Player(stats),
        );
    }

    fn advance_level(&mut self, out_events: &mut Vec<Event>) {
        self.projectiles.clear(out_events);
        self.pickups.clear();
        let _ = self.actors.remove_enemies_where(|_| true);

        self.session.level = self.session.level.saturating_add(1);
        self.session.wave = WavePhase::AwaitingPlan;
        self.session.enemies_remaining = 0;
        self.room = Room::generate(self.config.room.width, self.config.room.height);

        let start = self.config.room.player_start();
        if let Some(player) = self.actors.player_mut() {
            player.position = start;
            player.halt();
        }

        debug!(level = self.session.level, "level advanced");
        out_events.push(Event::LevelChanged {
            level: self.session.level,
        });
        self.announce_room(out_events);
    }

    fn announce_room(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::RoomGenerated {
            level: self.session.level,
            columns: self.room.columns(),
            rows: self.room.rows(),
        });
    }

    /// Decrements the wave counter after an enemy death.
    fn record_enemy_death(&mut self, out_events: &mut Vec<Event>) {
        self.session.total_enemies_killed = self.session.total_enemies_killed.saturating_add(1);
        let remaining = self.session.enemies_remaining;
        debug_assert!(remaining > 0, "enemy died while no enemies remained");
        if remaining == 0 {
            let violation =
                ArenaError::InvariantViolation("enemy died while no enemies remained".to_owned());
            error!(%violation, "keeping remaining-enemy counter at zero");
            return;
        }
        self.session.enemies_remaining = remaining - 1;
        out_events.push(Event::EnemiesRemainingChanged {
            count: self.session.enemies_remaining,
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.session.is_running() {
            self.frame_dt = Duration::ZERO;
            trace!("tick skipped while paused or over");
            return;
        }
        self.frame_dt = dt;
        self.session.game_time = self.session.game_time.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });
        out_events.push(Event::GameTimeUpdated {
            seconds: self.session.game_time.as_secs_f32(),
        });

        for actor in self.actors.iter_mut() {
            if actor.is_alive() && actor.mode == ActorMode::Attacking {
                actor.cooldown = actor.cooldown.saturating_sub(dt);
            }
        }
        self.projectiles.age(dt, out_events);
        self.pickups.age(dt, out_events);
    }

    fn set_intent(&mut self, actor: ActorId, intent: Intent) -> Result<(), ArenaError> {
        let entry = self
            .actors
            .get_mut(actor)
            .ok_or(ArenaError::NotFound(actor))?;
        if !entry.is_alive() {
            return Ok(());
        }
        match intent {
            Intent::Move { velocity } => {
                if !velocity.is_finite() {
                    return Err(ArenaError::invalid("velocity", "velocity must be finite"));
                }
                entry.mode = ActorMode::Moving;
                entry.velocity = velocity;
                entry.target = None;
            }
            Intent::Attack { target } => {
                if entry.mode != ActorMode::Attacking {
                    entry.mode = ActorMode::Attacking;
                    entry.cooldown = entry.stats.attacker().attack_interval();
                }
                entry.velocity = Vec2::ZERO;
                entry.target = Some(target);
            }
        }
        Ok(())
    }

    fn integrate_movement(&mut self) {
        let dt = self.frame_dt.as_secs_f32();
        let radius = self.config.bodies.actor_radius;
        let room = &self.room;
        for actor in self.actors.iter_mut() {
            if !actor.is_alive() || actor.mode != ActorMode::Moving {
                continue;
            }
            let delta = actor.velocity * dt;
            if delta == Vec2::ZERO {
                continue;
            }
            actor.position = slide(room, actor.position, delta, radius);
        }
    }

    /// Resolves the attacker and target of an attack, resetting the attacker's countdown.
    fn begin_attack(
        &mut self,
        attacker: ActorId,
        target: ActorId,
    ) -> Result<Option<AttackPlan>, ArenaError> {
        let target_position = self
            .actors
            .get(target)
            .filter(|entry| entry.is_alive())
            .map(|entry| entry.position)
            .ok_or(ArenaError::NotFound(target))?;
        let entry = self
            .actors
            .get_mut(attacker)
            .ok_or(ArenaError::NotFound(attacker))?;
        if !entry.is_alive() || entry.mode != ActorMode::Attacking || !entry.cooldown.is_zero() {
            return Ok(None);
        }
        let stats = entry.stats.attacker();
        entry.cooldown = stats.attack_interval();
        Ok(Some(AttackPlan {
            origin: entry.position,
            target_position,
            side: entry.kind().side(),
            damage: stats.damage(),
            range: stats.attack_range(),
            projectile_speed: stats.projectile_speed(),
        }))
    }

    fn fire(
        &mut self,
        attacker: ActorId,
        target: ActorId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ArenaError> {
        let Some(plan) = self.begin_attack(attacker, target)? else {
            return Ok(());
        };
        let _ = projectiles::fire_projectile(
            self,
            Launch {
                owner: attacker,
                origin: plan.origin,
                target: plan.target_position,
                damage: plan.damage,
                speed: plan.projectile_speed,
                side: plan.side,
            },
            out_events,
        )?;
        Ok(())
    }

    fn strike(
        &mut self,
        attacker: ActorId,
        target: ActorId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ArenaError> {
        let Some(plan) = self.begin_attack(attacker, target)? else {
            return Ok(());
        };
        if plan.origin.distance(plan.target_position) > plan.range {
            trace!(attacker = attacker.get(), "melee target moved out of range");
            return Ok(());
        }
        let amount = i32::try_from(plan.damage).unwrap_or(i32::MAX);
        let _ = combat::take_damage(self, target, amount, out_events)?;
        Ok(())
    }

    fn begin_wave(&mut self, enemy_count: u32, out_events: &mut Vec<Event>) {
        if self.session.wave != WavePhase::AwaitingPlan {
            warn!(enemy_count, "wave already armed for this room");
            return;
        }
        self.session.wave = WavePhase::Active {
            planned: enemy_count,
            spawned: 0,
        };
        self.session.enemies_remaining = enemy_count;
        debug!(level = self.session.level, enemy_count, "wave started");
        out_events.push(Event::WaveStarted {
            level: self.session.level,
            enemy_count,
        });
        out_events.push(Event::EnemiesRemainingChanged { count: enemy_count });
    }

    fn spawn_enemy(
        &mut self,
        template: String,
        position: Vec2,
        mut stats: EnemyStats,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ArenaError> {
        let WavePhase::Active { planned, spawned } = self.session.wave else {
            return Err(ArenaError::invalid("template", "no wave is armed for this room"));
        };
        if spawned >= planned {
            return Err(ArenaError::invalid(
                "template",
                format!("wave already spawned all {planned} enemies"),
            ));
        }
        if !self.room.is_walkable(position) {
            return Err(ArenaError::invalid("position", "spawn position is not on the floor"));
        }
        if stats.max_health == 0 {
            return Err(ArenaError::invalid("stats", "enemy spawned without health"));
        }

        stats.current_health = stats.max_health;
        let actor = self
            .actors
            .insert(position, self.session.level, ActorStats::Enemy(stats));
        self.session.wave = WavePhase::Active {
            planned,
            spawned: spawned + 1,
        };
        debug!(actor = actor.get(), %template, "enemy spawned");
        out_events.push(Event::EnemySpawned {
            actor,
            template,
            position,
        });
        Ok(())
    }

    fn check_wave_state(&mut self, out_events: &mut Vec<Event>) {
        for actor in self.actors.iter_mut() {
            if actor.life == LifeState::Dying {
                actor.life = LifeState::Dead;
            }
        }
        let reaped = self
            .actors
            .remove_enemies_where(|actor| actor.life == LifeState::Dead);
        if !reaped.is_empty() {
            trace!(count = reaped.len(), "reaped dead enemies");
        }

        let armed = matches!(self.session.wave, WavePhase::Active { .. });
        if armed
            && self.session.enemies_remaining == 0
            && self.room.door_state() == DoorState::Closed
        {
            self.room.set_door_state(DoorState::Open);
            debug!(level = self.session.level, "door opened");
            out_events.push(Event::DoorOpened);
            out_events.push(Event::WaveCleared {
                level: self.session.level,
            });
        }

        if self.room.door_state() != DoorState::Open {
            return;
        }
        let door = self.room.door().center();
        let trigger = self.config.room.door_trigger_radius;
        let entered = self
            .actors
            .player()
            .filter(|player| player.is_alive())
            .is_some_and(|player| player.position.distance(door) <= trigger);
        if entered {
            self.room.set_door_state(DoorState::Cleared);
            debug!(level = self.session.level, "player left through the door");
            self.advance_level(out_events);
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct AttackPlan {
    origin: Vec2,
    target_position: Vec2,
    side: Side,
    damage: u32,
    range: f32,
    projectile_speed: f32,
}

/// Moves a body of the given radius by `delta`, one axis at a time, stopping at blocked cells.
fn slide(room: &Room, position: Vec2, delta: Vec2, radius: f32) -> Vec2 {
    let mut next = position;
    if delta.x != 0.0 {
        let candidate = Vec2::new(next.x + delta.x, next.y);
        let probe = candidate + Vec2::new(radius.copysign(delta.x), 0.0);
        if room.is_walkable(probe) {
            next = candidate;
        }
    }
    if delta.y != 0.0 {
        let candidate = Vec2::new(next.x, next.y + delta.y);
        let probe = candidate + Vec2::new(0.0, radius.copysign(delta.y));
        if room.is_walkable(probe) {
            next = candidate;
        }
    }
    next
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.session.game_over && command != Command::StartNewGame {
        trace!(?command, "command ignored after game over");
        return;
    }

    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SetMoveInput { input } => {
            if input.is_finite() {
                world.move_input = input.clamp_length_max(1.0);
            } else {
                warn!(?input, "rejected non-finite movement input");
            }
        }
        Command::TogglePause => {
            world.session.paused = !world.session.paused;
            out_events.push(if world.session.paused {
                Event::GamePaused
            } else {
                Event::GameResumed
            });
        }
        Command::StartNewGame => {
            world.reset_session();
            debug!("new game started");
            out_events.push(Event::NewGameStarted);
            out_events.push(Event::LevelChanged { level: 1 });
            if let Some(player) = world.actors.player() {
                let stats = player.stats.damageable();
                out_events.push(Event::HealthChanged {
                    actor: player.id,
                    current: stats.health(),
                    max: stats.max_health(),
                });
            }
            out_events.push(Event::GoldChanged { total: 0 });
            world.announce_room(out_events);
        }
        Command::AdvanceToNextLevel => world.advance_level(out_events),
        Command::ApplySkillUpgrade { skill } => {
            let Some(player) = world.actors.player_id() else {
                warn!(?skill, "no player to upgrade");
                return;
            };
            if let Err(error) = combat::apply_skill_upgrade(world, player, skill, out_events) {
                warn!(%error, "skill upgrade rejected");
            }
        }
        Command::BeginWave { enemy_count } => world.begin_wave(enemy_count, out_events),
        Command::SpawnEnemy {
            template,
            position,
            stats,
        } => {
            if let Err(error) = world.spawn_enemy(template, position, stats, out_events) {
                warn!(%error, "enemy spawn rejected");
            }
        }
        Command::SpawnPickup {
            kind,
            position,
            value,
        } => {
            if !position.is_finite() {
                warn!(?position, "rejected pickup at non-finite position");
                return;
            }
            let position = world.room.clamp_to_interior(position);
            let lifetime = world.config.drops.pickup_lifetime();
            let pickup = world.pickups.insert(kind, position, value, lifetime);
            out_events.push(Event::PickupSpawned {
                pickup,
                kind,
                position,
                value,
            });
        }
        phase if !world.session.is_running() => {
            trace!(command = ?phase, "phase skipped while paused");
        }
        Command::SetIntent { actor, intent } => {
            if let Err(error) = world.set_intent(actor, intent) {
                warn!(%error, "intent rejected");
            }
        }
        Command::IntegrateMovement => world.integrate_movement(),
        Command::FireProjectile { attacker, target } => {
            if let Err(error) = world.fire(attacker, target, out_events) {
                trace!(%error, attacker = attacker.get(), "projectile not fired");
            }
        }
        Command::MeleeStrike { attacker, target } => {
            if let Err(error) = world.strike(attacker, target, out_events) {
                trace!(%error, attacker = attacker.get(), "melee strike missed");
            }
        }
        Command::ResolveProjectiles => projectiles::resolve(world, out_events),
        Command::ResolvePickups => pickups::resolve(world, out_events),
        Command::CheckWaveState => world.check_wave_state(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use archer_arena_core::{
        ActorId, ActorView, DoorState, EnemyStats, GameConfig, PickupId, PickupKind, PlayerStats,
        ProjectileId, Side,
    };
    use glam::Vec2;

    use super::{actors::ActorStats, Room, WavePhase, World};

    const SCORE_PER_KILL: u32 = 100;

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Current level, starting at one.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.session.level
    }

    /// Enemies that still have to die before the door opens.
    #[must_use]
    pub fn enemies_remaining(world: &World) -> u32 {
        world.session.enemies_remaining
    }

    /// Progress of the current room's wave.
    #[must_use]
    pub fn wave_phase(world: &World) -> WavePhase {
        world.session.wave
    }

    /// Reports whether the session is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.session.paused
    }

    /// Reports whether the player died.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.session.game_over
    }

    /// Reports whether ticks currently advance the simulation.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.session.is_running()
    }

    /// Unpaused play time.
    #[must_use]
    pub fn game_time(world: &World) -> Duration {
        world.session.game_time
    }

    /// Gold collected during the session.
    #[must_use]
    pub fn total_gold_collected(world: &World) -> u32 {
        world.session.total_gold_collected
    }

    /// Enemies killed during the session.
    #[must_use]
    pub fn total_enemies_killed(world: &World) -> u32 {
        world.session.total_enemies_killed
    }

    /// Final score: one hundred per kill plus every gold coin collected.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world
            .session
            .total_enemies_killed
            .saturating_mul(SCORE_PER_KILL)
            .saturating_add(world.session.total_gold_collected)
    }

    /// Latest movement input, clamped to unit length.
    #[must_use]
    pub fn move_input(world: &World) -> Vec2 {
        world.move_input
    }

    /// Provides read-only access to the current room.
    #[must_use]
    pub fn room(world: &World) -> &Room {
        &world.room
    }

    /// State of the current room's door.
    #[must_use]
    pub fn door_state(world: &World) -> DoorState {
        world.room.door_state()
    }

    /// Identifier of the player actor.
    #[must_use]
    pub fn player_id(world: &World) -> Option<ActorId> {
        world.actors.player_id()
    }

    /// Statistics of the player.
    #[must_use]
    pub fn player_stats(world: &World) -> Option<&PlayerStats> {
        match world.actors.player().map(|player| &player.stats) {
            Some(ActorStats::Player(stats)) => Some(stats),
            _ => None,
        }
    }

    /// Statistics of an enemy.
    #[must_use]
    pub fn enemy_stats(world: &World, actor: ActorId) -> Option<&EnemyStats> {
        match world.actors.get(actor).map(|entry| &entry.stats) {
            Some(ActorStats::Enemy(stats)) => Some(stats),
            _ => None,
        }
    }

    /// Captures a read-only view of every actor in the room.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(world.actors.iter().map(|actor| actor.snapshot()).collect())
    }

    /// Identifiers of every actor in ascending order.
    #[must_use]
    pub fn actor_ids(world: &World) -> Vec<ActorId> {
        world.actors.ids()
    }

    /// Captures every live projectile in identifier order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                owner: projectile.owner,
                side: projectile.side,
                position: projectile.position,
                direction: projectile.direction,
                speed: projectile.speed,
                damage: projectile.damage,
                remaining: projectile.remaining,
            })
            .collect()
    }

    /// Captures every pickup in identifier order.
    #[must_use]
    pub fn pickups(world: &World) -> Vec<PickupSnapshot> {
        world
            .pickups
            .iter()
            .map(|pickup| PickupSnapshot {
                id: pickup.id,
                kind: pickup.kind,
                position: pickup.position,
                value: pickup.value,
                remaining: pickup.remaining,
            })
            .collect()
    }

    /// Reports whether the director may still spawn enemies into the current wave.
    #[must_use]
    pub fn spawns_outstanding(world: &World) -> u32 {
        match world.session.wave {
            WavePhase::Active { planned, spawned } => planned.saturating_sub(spawned),
            WavePhase::AwaitingPlan => 0,
        }
    }

    /// Immutable representation of a live projectile.
    #[derive(Clone, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Identifier of the projectile.
        pub id: ProjectileId,
        /// Actor that fired the projectile.
        pub owner: ActorId,
        /// Side the projectile belongs to.
        pub side: Side,
        /// Current position.
        pub position: Vec2,
        /// Unit direction of travel.
        pub direction: Vec2,
        /// Travel speed.
        pub speed: f32,
        /// Damage applied on hit.
        pub damage: u32,
        /// Lifetime left.
        pub remaining: Duration,
    }

    /// Immutable representation of a pickup.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PickupSnapshot {
        /// Identifier of the pickup.
        pub id: PickupId,
        /// Kind of collectible.
        pub kind: PickupKind,
        /// Current position.
        pub position: Vec2,
        /// Amount granted on collection.
        pub value: u32,
        /// Lifetime left.
        pub remaining: Duration,
    }
}
