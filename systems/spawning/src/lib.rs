#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director responsible for populating every generated room.
//!
//! When a room is generated the director sizes the wave, filters and shuffles
//! the spawn-candidate cells, picks a template per spawn and scales its stats
//! to the room's level. Depending on the configured mode the whole wave is
//! emitted at once or fed one enemy at a time by a countdown that only moves
//! when the simulation clock does.

use std::{collections::VecDeque, time::Duration};

use archer_arena_core::{
    seed, CellCoord, Command, CountPolicy, DifficultyConfig, EnemyStats, EnemyTemplate, Event,
    GameConfig, PrefabSelection, SpawnMode, WaveConfig,
};
use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Debug)]
pub struct Config {
    waves: WaveConfig,
    difficulty: DifficultyConfig,
    roster: Vec<EnemyTemplate>,
    exclusion_radius: f32,
    session_seed: u64,
}

impl Config {
    /// Creates a new configuration from explicit parts.
    #[must_use]
    pub fn new(
        waves: WaveConfig,
        difficulty: DifficultyConfig,
        roster: Vec<EnemyTemplate>,
        exclusion_radius: f32,
        session_seed: u64,
    ) -> Self {
        Self {
            waves,
            difficulty,
            roster,
            exclusion_radius,
            session_seed,
        }
    }

    /// Extracts the director's options from a full game configuration.
    #[must_use]
    pub fn from_game(config: &GameConfig) -> Self {
        Self::new(
            config.waves.clone(),
            config.difficulty.clone(),
            config.enemies.clone(),
            config.room.exclusion_radius,
            config.seed,
        )
    }
}

/// One enemy waiting to be spawned.
#[derive(Clone, Debug, PartialEq)]
struct PlannedSpawn {
    template: String,
    position: Vec2,
    stats: EnemyStats,
}

impl PlannedSpawn {
    fn into_command(self) -> Command {
        Command::SpawnEnemy {
            template: self.template,
            position: self.position,
            stats: self.stats,
        }
    }
}

/// Cooperative task feeding a sequenced wave one spawn at a time.
#[derive(Debug)]
struct SpawnTask {
    queue: VecDeque<PlannedSpawn>,
    countdown: Duration,
}

/// Pure system that plans waves and emits spawn commands.
#[derive(Debug)]
pub struct WaveDirector {
    config: Config,
    rng: ChaCha8Rng,
    prefab_cursor: usize,
    task: Option<SpawnTask>,
}

impl WaveDirector {
    /// Creates a new director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(seed::derive_stream_seed(
            config.session_seed,
            seed::WAVE_STREAM,
            0,
        ));
        Self {
            config,
            rng,
            prefab_cursor: 0,
            task: None,
        }
    }

    /// Number of spawns the sequenced task still holds.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.task.as_ref().map_or(0, |task| task.queue.len())
    }

    /// Consumes events and the current room layout to emit wave commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        floor_cells: &[CellCoord],
        player_start: Vec2,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::NewGameStarted => {
                    self.task = None;
                    self.prefab_cursor = 0;
                }
                Event::RoomGenerated { level, .. } => {
                    self.task = None;
                    self.plan_wave(*level, floor_cells, player_start, out);
                }
                Event::TimeAdvanced { dt } => self.advance_task(*dt, out),
                _ => {}
            }
        }
    }

    fn plan_wave(
        &mut self,
        level: u32,
        floor_cells: &[CellCoord],
        player_start: Vec2,
        out: &mut Vec<Command>,
    ) {
        self.rng = ChaCha8Rng::seed_from_u64(seed::derive_stream_seed(
            self.config.session_seed,
            seed::WAVE_STREAM,
            level,
        ));

        let wanted = enemy_count(&self.config.waves, level);
        let mut candidates =
            spawn_candidates(floor_cells, player_start, self.config.exclusion_radius);
        candidates.shuffle(&mut self.rng);
        let count = (wanted as usize).min(candidates.len());
        let enemy_count = u32::try_from(count).unwrap_or(u32::MAX);
        debug!(level, wanted, enemy_count, "wave planned");
        out.push(Command::BeginWave { enemy_count });

        let mut queue = VecDeque::with_capacity(count);
        for cell in candidates.into_iter().take(count) {
            let Some(template) = self.select_template() else {
                break;
            };
            queue.push_back(PlannedSpawn {
                template: template.name.clone(),
                position: cell.center(),
                stats: scale_enemy(&template.stats, level, &self.config.difficulty),
            });
        }

        match self.config.waves.spawn_mode {
            SpawnMode::Batch => {
                out.extend(queue.into_iter().map(PlannedSpawn::into_command));
            }
            SpawnMode::Sequenced => {
                if let Some(first) = queue.pop_front() {
                    out.push(first.into_command());
                }
                if !queue.is_empty() {
                    let countdown = self.draw_delay();
                    self.task = Some(SpawnTask { queue, countdown });
                }
            }
        }
    }

    fn advance_task(&mut self, dt: Duration, out: &mut Vec<Command>) {
        let Some(mut task) = self.task.take() else {
            return;
        };
        let mut budget = dt;
        while !task.queue.is_empty() {
            if budget < task.countdown {
                task.countdown -= budget;
                break;
            }
            budget -= task.countdown;
            if let Some(spawn) = task.queue.pop_front() {
                out.push(spawn.into_command());
            }
            task.countdown = self.draw_delay();
        }
        if !task.queue.is_empty() {
            self.task = Some(task);
        }
    }

    fn select_template(&mut self) -> Option<EnemyTemplate> {
        let roster = &self.config.roster;
        if roster.is_empty() {
            return None;
        }
        let index = match self.config.waves.prefab_selection {
            PrefabSelection::RoundRobin => {
                let index = self.prefab_cursor % roster.len();
                self.prefab_cursor = (self.prefab_cursor + 1) % roster.len();
                index
            }
            PrefabSelection::Random => self.rng.gen_range(0..roster.len()),
        };
        roster.get(index).cloned()
    }

    fn draw_delay(&mut self) -> Duration {
        let min = self.config.waves.min_spawn_delay_secs.max(0.0);
        let max = self.config.waves.max_spawn_delay_secs.max(min);
        let seconds = if max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        };
        Duration::try_from_secs_f32(seconds).unwrap_or(Duration::MAX)
    }
}

/// Number of enemies in wave `wave` (one-based) under the configured policy.
#[must_use]
pub fn enemy_count(config: &WaveConfig, wave: u32) -> u32 {
    let exponent = i32::try_from(wave.saturating_sub(1)).unwrap_or(i32::MAX);
    let growth = f64::from(config.growth_factor).powi(exponent);
    let raw = (f64::from(config.base_count) * growth).round();
    let count = if raw.is_finite() { raw as u32 } else { u32::MAX };
    match config.count_policy {
        CountPolicy::RoomClamped => {
            let max = config.max_per_room.max(config.min_per_room);
            count.clamp(config.min_per_room, max)
        }
        CountPolicy::Exponential => count,
    }
}

/// Floor cells at or beyond `exclusion_radius` from the player start.
#[must_use]
pub fn spawn_candidates(
    floor_cells: &[CellCoord],
    player_start: Vec2,
    exclusion_radius: f32,
) -> Vec<CellCoord> {
    floor_cells
        .iter()
        .copied()
        .filter(|cell| cell.center().distance(player_start) >= exclusion_radius)
        .collect()
}

/// Scales level-one enemy stats to the provided level.
///
/// Health, damage and speed compound per level while experience and gold grow
/// linearly.
#[must_use]
pub fn scale_enemy(stats: &EnemyStats, level: u32, difficulty: &DifficultyConfig) -> EnemyStats {
    let steps = level.saturating_sub(1);
    let exponent = i32::try_from(steps).unwrap_or(i32::MAX);
    let compound = |multiplier: f32| f64::from(multiplier).powi(exponent);
    let reward = 1.0 + f64::from(difficulty.reward_growth) * f64::from(steps);

    let max_health = scale_u32(stats.max_health, compound(difficulty.health_multiplier)).max(1);
    EnemyStats {
        max_health,
        current_health: max_health,
        damage: scale_u32(stats.damage, compound(difficulty.damage_multiplier)),
        move_speed: (f64::from(stats.move_speed) * compound(difficulty.speed_multiplier)) as f32,
        experience_value: scale_u32(stats.experience_value, reward),
        gold_value: scale_u32(stats.gold_value, reward),
        ..stats.clone()
    }
}

fn scale_u32(value: u32, factor: f64) -> u32 {
    let scaled = (f64::from(value) * factor).round();
    if scaled.is_finite() {
        scaled as u32
    } else {
        u32::MAX
    }
}
