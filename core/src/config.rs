//! Configuration surface recognised by the simulation.
//!
//! Every section is defaulted so that partial TOML documents only need to
//! name the values they override.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{ArenaError, EnemyTemplate, PlayerStats};

/// Complete configuration of a play session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed from which every random stream of the session is derived.
    pub seed: u64,
    /// Room geometry.
    pub room: RoomConfig,
    /// Wave sizing and spawn sequencing.
    pub waves: WaveConfig,
    /// Per-level enemy scaling.
    pub difficulty: DifficultyConfig,
    /// Drop tables and pickup behaviour.
    pub drops: DropConfig,
    /// Projectile behaviour.
    pub projectiles: ProjectileConfig,
    /// Collision and input tolerances.
    pub bodies: BodyConfig,
    /// Starting statistics of the player.
    pub player: PlayerStats,
    /// Enemy prefabs the wave director chooses from.
    pub enemies: Vec<EnemyTemplate>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            room: RoomConfig::default(),
            waves: WaveConfig::default(),
            difficulty: DifficultyConfig::default(),
            drops: DropConfig::default(),
            projectiles: ProjectileConfig::default(),
            bodies: BodyConfig::default(),
            player: PlayerStats::default(),
            enemies: EnemyTemplate::default_roster(),
        }
    }
}

impl GameConfig {
    /// Checks that every option lies within its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidArgument`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.room.width < 3 || self.room.height < 3 {
            return Err(ArenaError::invalid(
                "room",
                format!(
                    "room must be at least 3x3, got {}x{}",
                    self.room.width, self.room.height
                ),
            ));
        }
        ensure_non_negative("room.exclusion_radius", self.room.exclusion_radius)?;
        ensure_positive("room.door_trigger_radius", self.room.door_trigger_radius)?;
        if let Some(start) = self.room.player_start {
            let inside = start.x >= 1.0
                && start.y >= 1.0
                && start.x <= (self.room.width - 2) as f32
                && start.y <= (self.room.height - 2) as f32;
            if !inside {
                return Err(ArenaError::invalid(
                    "room.player_start",
                    "player start must lie inside the room interior",
                ));
            }
        }

        ensure_positive("waves.growth_factor", self.waves.growth_factor)?;
        if self.waves.min_per_room > self.waves.max_per_room {
            return Err(ArenaError::invalid(
                "waves.min_per_room",
                "minimum enemies per room exceeds the maximum",
            ));
        }
        ensure_non_negative("waves.min_spawn_delay_secs", self.waves.min_spawn_delay_secs)?;
        if self.waves.min_spawn_delay_secs > self.waves.max_spawn_delay_secs {
            return Err(ArenaError::invalid(
                "waves.min_spawn_delay_secs",
                "minimum spawn delay exceeds the maximum",
            ));
        }

        ensure_positive("difficulty.health_multiplier", self.difficulty.health_multiplier)?;
        ensure_positive("difficulty.damage_multiplier", self.difficulty.damage_multiplier)?;
        ensure_positive("difficulty.speed_multiplier", self.difficulty.speed_multiplier)?;
        ensure_non_negative("difficulty.reward_growth", self.difficulty.reward_growth)?;

        ensure_probability("drops.gold.rate", self.drops.gold.rate)?;
        ensure_probability("drops.health_potion.rate", self.drops.health_potion.rate)?;
        ensure_probability("drops.experience_orb.rate", self.drops.experience_orb.rate)?;
        ensure_positive("drops.value_multiplier", self.drops.value_multiplier)?;
        ensure_positive("drops.pickup_lifetime_secs", self.drops.pickup_lifetime_secs)?;
        ensure_non_negative("drops.scatter", self.drops.scatter)?;
        ensure_non_negative("drops.magnet_distance", self.drops.magnet_distance)?;
        ensure_non_negative("drops.magnet_speed", self.drops.magnet_speed)?;

        ensure_positive("projectiles.lifetime_secs", self.projectiles.lifetime_secs)?;
        ensure_positive("projectiles.radius", self.projectiles.radius)?;

        ensure_positive("bodies.actor_radius", self.bodies.actor_radius)?;
        ensure_positive("bodies.pickup_radius", self.bodies.pickup_radius)?;
        ensure_non_negative("bodies.input_deadzone", self.bodies.input_deadzone)?;

        ensure_positive("player.attack_speed", self.player.attack_speed)?;
        ensure_non_negative("player.move_speed", self.player.move_speed)?;
        ensure_positive("player.projectile_speed", self.player.projectile_speed)?;
        if self.player.max_health == 0 || self.player.experience_to_next_level == 0 {
            return Err(ArenaError::invalid(
                "player",
                "max health and experience threshold must be positive",
            ));
        }
        if self.player.level == 0 {
            return Err(ArenaError::invalid("player.level", "player level starts at one"));
        }
        if self.player.experience >= self.player.experience_to_next_level {
            return Err(ArenaError::invalid(
                "player.experience",
                format!(
                    "experience {} must stay below the threshold {}",
                    self.player.experience, self.player.experience_to_next_level
                ),
            ));
        }

        if self.enemies.is_empty() {
            return Err(ArenaError::invalid(
                "enemies",
                "the enemy roster must contain at least one template",
            ));
        }
        for template in &self.enemies {
            ensure_positive("enemies.stats.attack_rate", template.stats.attack_rate)?;
            ensure_non_negative("enemies.stats.attack_range", template.stats.attack_range)?;
            ensure_non_negative("enemies.stats.move_speed", template.stats.move_speed)?;
            if template.stats.max_health == 0 {
                return Err(ArenaError::invalid(
                    "enemies.stats.max_health",
                    format!("template `{}` has no health", template.name),
                ));
            }
        }
        Ok(())
    }
}

fn ensure_probability(name: &'static str, value: f32) -> Result<(), ArenaError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ArenaError::invalid(
            name,
            format!("probability must lie in [0, 1], got {value}"),
        ))
    }
}

fn ensure_positive(name: &'static str, value: f32) -> Result<(), ArenaError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ArenaError::invalid(
            name,
            format!("value must be positive, got {value}"),
        ))
    }
}

fn ensure_non_negative(name: &'static str, value: f32) -> Result<(), ArenaError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ArenaError::invalid(
            name,
            format!("value must not be negative, got {value}"),
        ))
    }
}

/// Geometry of every generated room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Number of cell columns, walls included.
    pub width: u32,
    /// Number of cell rows, walls included.
    pub height: u32,
    /// Explicit player start; defaults to `(width / 2, 2)`.
    pub player_start: Option<Vec2>,
    /// Cells closer than this to the player start never receive spawns.
    pub exclusion_radius: f32,
    /// Distance from the door centre at which the player leaves the room.
    pub door_trigger_radius: f32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            player_start: None,
            exclusion_radius: 5.0,
            door_trigger_radius: 0.75,
        }
    }
}

impl RoomConfig {
    /// Position at which the player enters each room.
    #[must_use]
    pub fn player_start(&self) -> Vec2 {
        self.player_start.unwrap_or_else(|| {
            let row = self.height.saturating_sub(2).min(2);
            Vec2::new((self.width / 2) as f32, row as f32)
        })
    }
}

/// How many enemies a wave contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    /// Exponential growth clamped to the per-room bounds.
    RoomClamped,
    /// Unclamped exponential growth used for endless waves.
    Exponential,
}

/// Whether a wave appears at once or one enemy at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMode {
    /// Every enemy spawns in the tick the room is generated.
    Batch,
    /// Enemies spawn one by one separated by random delays.
    Sequenced,
}

/// How templates are assigned to spawn positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefabSelection {
    /// Cycle through the roster in order.
    RoundRobin,
    /// Pick a template uniformly at random per spawn.
    Random,
}

/// Wave sizing and spawn sequencing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Policy that turns the wave number into an enemy count.
    pub count_policy: CountPolicy,
    /// Enemies in the first wave.
    pub base_count: u32,
    /// Growth applied per subsequent wave.
    pub growth_factor: f32,
    /// Lower bound for the room-clamped policy.
    pub min_per_room: u32,
    /// Upper bound for the room-clamped policy.
    pub max_per_room: u32,
    /// Batch or sequenced spawning.
    pub spawn_mode: SpawnMode,
    /// Shortest pause between sequenced spawns, in seconds.
    pub min_spawn_delay_secs: f32,
    /// Longest pause between sequenced spawns, in seconds.
    pub max_spawn_delay_secs: f32,
    /// Template assignment strategy.
    pub prefab_selection: PrefabSelection,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            count_policy: CountPolicy::RoomClamped,
            base_count: 5,
            growth_factor: 1.5,
            min_per_room: 3,
            max_per_room: 7,
            spawn_mode: SpawnMode::Sequenced,
            min_spawn_delay_secs: 0.5,
            max_spawn_delay_secs: 2.0,
            prefab_selection: PrefabSelection::RoundRobin,
        }
    }
}

/// Per-level enemy scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Health factor compounded per level.
    pub health_multiplier: f32,
    /// Damage factor compounded per level.
    pub damage_multiplier: f32,
    /// Movement speed factor compounded per level.
    pub speed_multiplier: f32,
    /// Linear growth of experience and gold rewards per level.
    pub reward_growth: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            health_multiplier: 1.2,
            damage_multiplier: 1.1,
            speed_multiplier: 1.05,
            reward_growth: 0.15,
        }
    }
}

/// Probability and base value of one collectible kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropRule {
    /// Chance in `[0, 1]` that the drop happens.
    pub rate: f32,
    /// Level-one value of the drop.
    pub base_value: u32,
}

/// Drop tables and pickup behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Gold drop.
    pub gold: DropRule,
    /// Health potion drop.
    pub health_potion: DropRule,
    /// Experience orb drop.
    pub experience_orb: DropRule,
    /// Factor compounded per level on table values.
    pub value_multiplier: f32,
    /// Gold and experience drops carry the enemy's own reward values.
    pub use_enemy_values: bool,
    /// Seconds before an uncollected pickup disappears.
    pub pickup_lifetime_secs: f32,
    /// Maximum offset applied on each axis when a drop lands.
    pub scatter: f32,
    /// Distance at which experience orbs start drifting to the player.
    pub magnet_distance: f32,
    /// Base drift speed of magnetised experience orbs.
    pub magnet_speed: f32,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            gold: DropRule {
                rate: 0.7,
                base_value: 5,
            },
            health_potion: DropRule {
                rate: 0.1,
                base_value: 20,
            },
            experience_orb: DropRule {
                rate: 1.0,
                base_value: 10,
            },
            value_multiplier: 1.1,
            use_enemy_values: true,
            pickup_lifetime_secs: 20.0,
            scatter: 0.5,
            magnet_distance: 3.0,
            magnet_speed: 5.0,
        }
    }
}

impl DropConfig {
    /// Lifetime of an uncollected pickup.
    #[must_use]
    pub fn pickup_lifetime(&self) -> Duration {
        Duration::try_from_secs_f32(self.pickup_lifetime_secs).unwrap_or(Duration::MAX)
    }
}

/// Projectile behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Seconds a projectile lives before expiring.
    pub lifetime_secs: f32,
    /// Collision radius of a projectile.
    pub radius: f32,
    /// Additional actors a projectile may damage before it is destroyed.
    pub pierce: u32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            lifetime_secs: 5.0,
            radius: 0.15,
            pierce: 0,
        }
    }
}

impl ProjectileConfig {
    /// Lifetime of a freshly fired projectile.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        Duration::try_from_secs_f32(self.lifetime_secs).unwrap_or(Duration::MAX)
    }
}

/// Collision and input tolerances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Collision radius of every actor.
    pub actor_radius: f32,
    /// Distance at which the player collects a pickup.
    pub pickup_radius: f32,
    /// Movement input magnitude below which the player counts as idle.
    pub input_deadzone: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            actor_radius: 0.4,
            pickup_radius: 0.75,
            input_deadzone: 0.1,
        }
    }
}
