//! Stat records owned by actors.

use serde::{Deserialize, Serialize};

/// Statistics carried by the player actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    /// Upper bound of the player's health.
    pub max_health: u32,
    /// Current health in `[0, max_health]`.
    pub current_health: u32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Damage dealt by each projectile.
    pub damage: u32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Gold currently held.
    pub gold_coins: u32,
    /// Experience level, starting at one.
    pub level: u32,
    /// Experience accumulated towards the next level.
    pub experience: u32,
    /// Experience required to reach the next level.
    pub experience_to_next_level: u32,
    /// Distance within which the player shoots at the nearest enemy.
    pub attack_range: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            max_health: 100,
            current_health: 100,
            move_speed: 5.0,
            attack_speed: 1.0,
            damage: 10,
            projectile_speed: 10.0,
            gold_coins: 0,
            level: 1,
            experience: 0,
            experience_to_next_level: 100,
            attack_range: 100.0,
        }
    }
}

/// Statistics carried by an enemy actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    /// Upper bound of the enemy's health.
    pub max_health: u32,
    /// Current health in `[0, max_health]`.
    pub current_health: u32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Attacks per second.
    pub attack_rate: f32,
    /// Distance at which the enemy stops and attacks.
    pub attack_range: f32,
    /// Experience granted when the enemy dies.
    pub experience_value: u32,
    /// Gold granted when the enemy dies.
    pub gold_value: u32,
    /// Whether the enemy attacks with projectiles.
    pub is_ranged: bool,
    /// Projectile travel speed for ranged enemies.
    pub projectile_speed: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self::grunt()
    }
}

impl EnemyStats {
    /// Melee enemy that walks up to the player.
    #[must_use]
    pub fn grunt() -> Self {
        Self {
            max_health: 50,
            current_health: 50,
            damage: 10,
            move_speed: 2.0,
            attack_rate: 1.0,
            attack_range: 1.5,
            experience_value: 10,
            gold_value: 5,
            is_ranged: false,
            projectile_speed: 7.0,
        }
    }

    /// Ranged enemy that keeps its distance and shoots.
    #[must_use]
    pub fn archer() -> Self {
        Self {
            max_health: 35,
            current_health: 35,
            damage: 8,
            move_speed: 1.6,
            attack_rate: 0.8,
            attack_range: 6.0,
            experience_value: 10,
            gold_value: 5,
            is_ranged: true,
            projectile_speed: 7.0,
        }
    }
}

/// Named enemy prefab the wave director picks from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Human readable template name.
    pub name: String,
    /// Unscaled level-one stats.
    #[serde(default)]
    pub stats: EnemyStats,
}

impl EnemyTemplate {
    /// Creates a template from a name and stats.
    #[must_use]
    pub fn new(name: impl Into<String>, stats: EnemyStats) -> Self {
        Self {
            name: name.into(),
            stats,
        }
    }

    /// Default roster: one grunt and one archer.
    #[must_use]
    pub fn default_roster() -> Vec<Self> {
        vec![
            Self::new("grunt", EnemyStats::grunt()),
            Self::new("archer", EnemyStats::archer()),
        ]
    }
}
