#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Archer Arena simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems and presentation collaborators react to. Systems only ever see
//! immutable views such as [`ActorView`] and respond with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod config;
mod error;
pub mod seed;
mod stats;

pub use config::{
    BodyConfig, CountPolicy, DifficultyConfig, DropConfig, DropRule, GameConfig,
    PrefabSelection, ProjectileConfig, RoomConfig, SpawnMode, WaveConfig,
};
pub use error::ArenaError;
pub use stats::{EnemyStats, EnemyTemplate, PlayerStats};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Records the latest movement input supplied by the player.
    SetMoveInput {
        /// Raw input vector; magnitudes above one are clamped.
        input: Vec2,
    },
    /// Flips the session between paused and running.
    TogglePause,
    /// Discards the current session and starts a fresh one at level one.
    StartNewGame,
    /// Leaves the current room and generates the next level.
    AdvanceToNextLevel,
    /// Applies a fixed percentage upgrade to the player.
    ApplySkillUpgrade {
        /// Upgrade selected by the player.
        skill: Skill,
    },
    /// Arms the current room's wave with the number of enemies it will contain.
    BeginWave {
        /// Number of enemies the wave director is going to spawn.
        enemy_count: u32,
    },
    /// Requests that an enemy be created at the provided position.
    SpawnEnemy {
        /// Name of the roster template the enemy was built from.
        template: String,
        /// World-space position of the new enemy.
        position: Vec2,
        /// Fully scaled stats the enemy starts with.
        stats: EnemyStats,
    },
    /// Declares what an actor wants to do during the current tick.
    SetIntent {
        /// Actor whose intent is being set.
        actor: ActorId,
        /// Desired behaviour.
        intent: Intent,
    },
    /// Moves every living actor along its current velocity.
    IntegrateMovement,
    /// Requests that an attacker launch a projectile toward a target.
    FireProjectile {
        /// Actor firing the projectile.
        attacker: ActorId,
        /// Actor the projectile is aimed at.
        target: ActorId,
    },
    /// Requests that a melee attacker strike its target directly.
    MeleeStrike {
        /// Actor delivering the strike.
        attacker: ActorId,
        /// Actor receiving the strike.
        target: ActorId,
    },
    /// Advances live projectiles and resolves their collisions.
    ResolveProjectiles,
    /// Requests that a collectible be dropped into the room.
    SpawnPickup {
        /// Kind of collectible.
        kind: PickupKind,
        /// World-space drop position.
        position: Vec2,
        /// Amount of gold, health or experience the pickup grants.
        value: u32,
    },
    /// Moves magnetised pickups and applies the ones the player touches.
    ResolvePickups,
    /// Reaps dead actors, opens the door and detects door entry.
    CheckWaveState,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports the total unpaused play time.
    GameTimeUpdated {
        /// Elapsed play time in seconds.
        seconds: f32,
    },
    /// The session was paused.
    GamePaused,
    /// The session was resumed.
    GameResumed,
    /// The player died; the session accepts no further mutation except a new game.
    GameOver,
    /// A fresh session replaced the previous one.
    NewGameStarted,
    /// The session moved to a new level.
    LevelChanged {
        /// Level that became current.
        level: u32,
    },
    /// A room was generated and is ready to be populated.
    RoomGenerated {
        /// Level the room belongs to.
        level: u32,
        /// Number of cell columns.
        columns: u32,
        /// Number of cell rows.
        rows: u32,
    },
    /// The wave of the current room was armed.
    WaveStarted {
        /// Level the wave belongs to.
        level: u32,
        /// Number of enemies the wave contains.
        enemy_count: u32,
    },
    /// The number of enemies left in the wave changed.
    EnemiesRemainingChanged {
        /// Enemies that still have to die before the door opens.
        count: u32,
    },
    /// An enemy entered the room.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        actor: ActorId,
        /// Roster template the enemy was built from.
        template: String,
        /// Spawn position.
        position: Vec2,
    },
    /// An actor's health changed.
    HealthChanged {
        /// Actor whose health changed.
        actor: ActorId,
        /// Health after the change.
        current: u32,
        /// Maximum health after the change.
        max: u32,
    },
    /// An enemy's health reached zero.
    EnemyDied {
        /// Identifier of the dead enemy.
        actor: ActorId,
        /// Position at the moment of death.
        position: Vec2,
        /// Level the enemy was spawned for.
        level: u32,
        /// Experience the enemy is worth.
        experience_value: u32,
        /// Gold the enemy is worth.
        gold_value: u32,
    },
    /// The player's health reached zero.
    PlayerDied {
        /// Identifier of the player actor.
        actor: ActorId,
    },
    /// The player gained a level.
    LevelUp {
        /// Player level after the level-up.
        level: u32,
    },
    /// The player received experience.
    ExperienceGained {
        /// Amount granted.
        amount: u32,
    },
    /// The player's purse changed.
    GoldChanged {
        /// Gold held after the change.
        total: u32,
    },
    /// A skill upgrade was applied to the player.
    SkillUpgraded {
        /// Upgrade that was applied.
        skill: Skill,
    },
    /// A projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Side the projectile belongs to.
        side: Side,
        /// Launch position.
        origin: Vec2,
        /// Unit direction of travel.
        direction: Vec2,
    },
    /// A projectile left the simulation.
    ProjectileDestroyed {
        /// Identifier of the destroyed projectile.
        projectile: ProjectileId,
        /// Reason the projectile was destroyed.
        fate: ProjectileFate,
    },
    /// A collectible was dropped.
    PickupSpawned {
        /// Identifier assigned to the pickup.
        pickup: PickupId,
        /// Kind of collectible.
        kind: PickupKind,
        /// Drop position after scatter and clamping.
        position: Vec2,
        /// Amount the pickup grants.
        value: u32,
    },
    /// The player collected a pickup.
    PickupCollected {
        /// Identifier of the collected pickup.
        pickup: PickupId,
        /// Kind of collectible.
        kind: PickupKind,
        /// Amount granted.
        value: u32,
    },
    /// A pickup expired before being collected.
    PickupExpired {
        /// Identifier of the expired pickup.
        pickup: PickupId,
    },
    /// The door of the current room opened.
    DoorOpened,
    /// Every enemy of the current wave is dead.
    WaveCleared {
        /// Level whose wave was cleared.
        level: u32,
    },
}

/// Behaviour an actor wants to perform during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intent {
    /// Travel with the provided velocity.
    Move {
        /// Velocity in world units per second.
        velocity: Vec2,
    },
    /// Stand still and attack the provided target.
    Attack {
        /// Actor being attacked.
        target: ActorId,
    },
}

/// Two-state machine arbitrating between moving and attacking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActorMode {
    /// The actor travels along its velocity.
    #[default]
    Moving,
    /// The actor stands still and counts down to its next attack.
    Attacking,
}

/// Lifecycle of an actor. Transitions only ever move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifeState {
    /// The actor participates in the simulation.
    Alive,
    /// Health reached zero this tick; the actor is reaped at the wave-state check.
    Dying,
    /// The actor is gone for good.
    Dead,
}

/// Variant of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// The player-controlled archer.
    Player,
    /// A hostile actor spawned by the wave director.
    Enemy,
}

impl ActorKind {
    /// Side the actor fights for.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::Player => Side::Player,
            Self::Enemy => Side::Enemy,
        }
    }
}

/// Allegiance tag shared by actors and projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Owned by the player.
    Player,
    /// Owned by the enemies.
    Enemy,
}

impl Side {
    /// Reports whether two sides are hostile to each other.
    #[must_use]
    pub fn opposes(self, other: Side) -> bool {
        self != other
    }
}

/// Reason a projectile was removed from the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileFate {
    /// The lifetime ran out.
    Expired,
    /// The projectile hit static terrain.
    HitTerrain,
    /// The projectile hit an opposing actor.
    HitActor {
        /// Actor that was hit.
        actor: ActorId,
    },
    /// The room the projectile lived in was torn down.
    Cleared,
}

/// Kinds of collectibles dropped by enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PickupKind {
    /// Adds gold to the player's purse.
    Gold,
    /// Restores player health.
    HealthPotion,
    /// Grants player experience.
    ExperienceOrb,
}

/// Player upgrades offered on level-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    /// +5% damage.
    Damage,
    /// +20% maximum health.
    Health,
    /// +10% movement speed.
    Speed,
    /// +15% attacks per second.
    AttackSpeed,
    /// +10% projectile speed.
    ProjectileSpeed,
}

impl Skill {
    /// Every upgrade in presentation order.
    pub const ALL: [Skill; 5] = [
        Skill::Damage,
        Skill::Health,
        Skill::Speed,
        Skill::AttackSpeed,
        Skill::ProjectileSpeed,
    ];

    /// Percentage applied by the upgrade.
    #[must_use]
    pub const fn percent(self) -> u32 {
        match self {
            Self::Damage => 5,
            Self::Health => 20,
            Self::Speed => 10,
            Self::AttackSpeed => 15,
            Self::ProjectileSpeed => 10,
        }
    }

    /// Fraction of the current value added by the upgrade.
    #[must_use]
    pub fn fraction(self) -> f32 {
        self.percent() as f32 / 100.0
    }
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickupId(u32);

impl PickupId {
    /// Creates a new pickup identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single room cell expressed as column and row coordinates.
///
/// Rows grow upward: row zero is the bottom wall and the door sits in the top
/// row. The centre of a cell is the world-space point `(column, row)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World-space centre of the cell.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }

    /// Cell containing the provided world-space point, if it is not left of or below the grid.
    #[must_use]
    pub fn containing(point: Vec2) -> Option<Self> {
        let column = (point.x + 0.5).floor();
        let row = (point.y + 0.5).floor();
        if column < 0.0 || row < 0.0 || !column.is_finite() || !row.is_finite() {
            return None;
        }
        Some(Self::new(column as u32, row as u32))
    }
}

/// Contents of a room cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Walkable interior.
    Floor,
    /// Solid border.
    Wall,
    /// Exit to the next level, passable only once open.
    Door,
}

/// Lifecycle of the room's exit door.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DoorState {
    /// Enemies remain; the door blocks movement.
    Closed,
    /// The wave is cleared and the player may leave.
    Open,
    /// The player walked through; the level advances.
    Cleared,
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Player or enemy.
    pub kind: ActorKind,
    /// World-space position.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Lifecycle state.
    pub life: LifeState,
    /// Whether the actor is moving or attacking.
    pub mode: ActorMode,
    /// Actor currently being attacked, if any.
    pub target: Option<ActorId>,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Distance at which the actor switches to attacking.
    pub attack_range: f32,
    /// Time left until the next attack may fire.
    pub attack_cooldown: Duration,
    /// Whether attacks are delivered through projectiles.
    pub ranged: bool,
}

impl ActorSnapshot {
    /// Reports whether the actor is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }
}

/// Read-only snapshot describing all actors within the room.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// The player actor, if one exists.
    #[must_use]
    pub fn player(&self) -> Option<&ActorSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.kind == ActorKind::Player)
    }

    /// Iterator over the enemy actors.
    pub fn enemies(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.kind == ActorKind::Enemy)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}
