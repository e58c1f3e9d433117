#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Drop economy: turns enemy deaths into pickup spawn commands.
//!
//! Every death rolls gold, potion and experience independently against their
//! configured rates. Table values compound with the level; gold and
//! experience can instead carry the dead enemy's own reward values. Each drop
//! lands with a small random scatter; the world clamps it into the room.

use archer_arena_core::{seed, Command, DropConfig, DropRule, Event, GameConfig, PickupKind};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

/// Configuration parameters required to construct the drop roller.
#[derive(Clone, Debug)]
pub struct Config {
    drops: DropConfig,
    session_seed: u64,
}

impl Config {
    /// Creates a new configuration from explicit parts.
    #[must_use]
    pub fn new(drops: DropConfig, session_seed: u64) -> Self {
        Self {
            drops,
            session_seed,
        }
    }

    /// Extracts the drop options from a full game configuration.
    #[must_use]
    pub fn from_game(config: &GameConfig) -> Self {
        Self::new(config.drops.clone(), config.seed)
    }
}

/// Pure system that rolls drops for dead enemies.
#[derive(Debug)]
pub struct DropRoller {
    config: Config,
    rng: ChaCha8Rng,
}

impl DropRoller {
    /// Creates a new roller positioned on the level-one stream.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = stream(config.session_seed, 1);
        Self { config, rng }
    }

    /// Consumes world events and emits `Command::SpawnPickup` for every drop.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::NewGameStarted => self.rng = stream(self.config.session_seed, 1),
                Event::LevelChanged { level } => {
                    self.rng = stream(self.config.session_seed, *level);
                }
                Event::EnemyDied {
                    position,
                    level,
                    experience_value,
                    gold_value,
                    ..
                } => self.roll(*position, *level, *gold_value, *experience_value, out),
                _ => {}
            }
        }
    }

    fn roll(
        &mut self,
        position: Vec2,
        level: u32,
        gold_value: u32,
        experience_value: u32,
        out: &mut Vec<Command>,
    ) {
        let drops = &self.config.drops;
        let carried = |own: u32, rule: &DropRule| {
            if drops.use_enemy_values {
                own
            } else {
                drop_value(rule.base_value, drops.value_multiplier, level)
            }
        };
        let table = [
            (PickupKind::Gold, drops.gold.rate, carried(gold_value, &drops.gold)),
            (
                PickupKind::HealthPotion,
                drops.health_potion.rate,
                drop_value(drops.health_potion.base_value, drops.value_multiplier, level),
            ),
            (
                PickupKind::ExperienceOrb,
                drops.experience_orb.rate,
                carried(experience_value, &drops.experience_orb),
            ),
        ];
        let scatter = drops.scatter;

        for (kind, rate, value) in table {
            let roll: f32 = self.rng.gen();
            if roll >= rate {
                trace!(?kind, roll, rate, "no drop");
                continue;
            }
            if value == 0 {
                continue;
            }
            let offset = if scatter > 0.0 {
                Vec2::new(
                    self.rng.gen_range(-scatter..=scatter),
                    self.rng.gen_range(-scatter..=scatter),
                )
            } else {
                Vec2::ZERO
            };
            debug!(?kind, value, level, "drop rolled");
            out.push(Command::SpawnPickup {
                kind,
                position: position + offset,
                value,
            });
        }
    }
}

fn stream(session_seed: u64, level: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed::derive_stream_seed(
        session_seed,
        seed::DROP_STREAM,
        level,
    ))
}

/// Table value of a drop at `level`: `round(base × multiplier^(level − 1))`.
#[must_use]
pub fn drop_value(base: u32, multiplier: f32, level: u32) -> u32 {
    let exponent = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
    let value = (f64::from(base) * f64::from(multiplier).powi(exponent)).round();
    if value.is_finite() {
        value as u32
    } else {
        u32::MAX
    }
}
