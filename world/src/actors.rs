//! Actor registry and the capability traits combat operates on.

use std::{collections::BTreeMap, time::Duration};

use archer_arena_core::{
    ActorId, ActorKind, ActorMode, ActorSnapshot, EnemyStats, LifeState, PlayerStats,
};
use glam::Vec2;

/// Something that has health and can be hurt or healed.
pub(crate) trait Damageable {
    fn health(&self) -> u32;
    fn max_health(&self) -> u32;
    fn set_health(&mut self, value: u32);
}

/// Something that travels through the room.
pub(crate) trait Mover {
    fn move_speed(&self) -> f32;
}

/// Something that attacks on a fixed cadence.
pub(crate) trait Attacker {
    fn damage(&self) -> u32;
    fn attacks_per_second(&self) -> f32;
    fn attack_range(&self) -> f32;
    fn projectile_speed(&self) -> f32;
    fn is_ranged(&self) -> bool;

    fn attack_interval(&self) -> Duration {
        let rate = self.attacks_per_second();
        if rate > 0.0 {
            Duration::try_from_secs_f32(1.0 / rate).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        }
    }
}

impl Damageable for PlayerStats {
    fn health(&self) -> u32 {
        self.current_health
    }

    fn max_health(&self) -> u32 {
        self.max_health
    }

    fn set_health(&mut self, value: u32) {
        self.current_health = value;
    }
}

impl Mover for PlayerStats {
    fn move_speed(&self) -> f32 {
        self.move_speed
    }
}

impl Attacker for PlayerStats {
    fn damage(&self) -> u32 {
        self.damage
    }

    fn attacks_per_second(&self) -> f32 {
        self.attack_speed
    }

    fn attack_range(&self) -> f32 {
        self.attack_range
    }

    fn projectile_speed(&self) -> f32 {
        self.projectile_speed
    }

    fn is_ranged(&self) -> bool {
        true
    }
}

impl Damageable for EnemyStats {
    fn health(&self) -> u32 {
        self.current_health
    }

    fn max_health(&self) -> u32 {
        self.max_health
    }

    fn set_health(&mut self, value: u32) {
        self.current_health = value;
    }
}

impl Mover for EnemyStats {
    fn move_speed(&self) -> f32 {
        self.move_speed
    }
}

impl Attacker for EnemyStats {
    fn damage(&self) -> u32 {
        self.damage
    }

    fn attacks_per_second(&self) -> f32 {
        self.attack_rate
    }

    fn attack_range(&self) -> f32 {
        self.attack_range
    }

    fn projectile_speed(&self) -> f32 {
        self.projectile_speed
    }

    fn is_ranged(&self) -> bool {
        self.is_ranged
    }
}

/// Stat record owned by an actor.
#[derive(Clone, Debug)]
pub(crate) enum ActorStats {
    Player(PlayerStats),
    Enemy(EnemyStats),
}

impl ActorStats {
    pub(crate) fn kind(&self) -> ActorKind {
        match self {
            Self::Player(_) => ActorKind::Player,
            Self::Enemy(_) => ActorKind::Enemy,
        }
    }

    pub(crate) fn damageable_mut(&mut self) -> &mut dyn Damageable {
        match self {
            Self::Player(stats) => stats,
            Self::Enemy(stats) => stats,
        }
    }

    pub(crate) fn damageable(&self) -> &dyn Damageable {
        match self {
            Self::Player(stats) => stats,
            Self::Enemy(stats) => stats,
        }
    }

    pub(crate) fn mover(&self) -> &dyn Mover {
        match self {
            Self::Player(stats) => stats,
            Self::Enemy(stats) => stats,
        }
    }

    pub(crate) fn attacker(&self) -> &dyn Attacker {
        match self {
            Self::Player(stats) => stats,
            Self::Enemy(stats) => stats,
        }
    }
}

/// Authoritative actor state stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) life: LifeState,
    pub(crate) mode: ActorMode,
    pub(crate) target: Option<ActorId>,
    pub(crate) cooldown: Duration,
    pub(crate) spawn_level: u32,
    pub(crate) stats: ActorStats,
}

impl Actor {
    pub(crate) fn kind(&self) -> ActorKind {
        self.stats.kind()
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub(crate) fn snapshot(&self) -> ActorSnapshot {
        let health = self.stats.damageable();
        let attacker = self.stats.attacker();
        ActorSnapshot {
            id: self.id,
            kind: self.kind(),
            position: self.position,
            velocity: self.velocity,
            life: self.life,
            mode: self.mode,
            target: self.target,
            health: health.health(),
            max_health: health.max_health(),
            move_speed: self.stats.mover().move_speed(),
            attack_range: attacker.attack_range(),
            attack_cooldown: self.cooldown,
            ranged: attacker.is_ranged(),
        }
    }

    /// Puts the actor back into the idle moving state.
    pub(crate) fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.mode = ActorMode::Moving;
        self.target = None;
        self.cooldown = Duration::ZERO;
    }
}

/// Registry that stores actors and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ActorRegistry {
    entries: BTreeMap<ActorId, Actor>,
    next_actor_id: ActorId,
    player: Option<ActorId>,
}

impl ActorRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_actor_id: ActorId::new(0),
            player: None,
        }
    }

    pub(crate) fn insert(
        &mut self,
        position: Vec2,
        spawn_level: u32,
        stats: ActorStats,
    ) -> ActorId {
        let id = self.next_actor_id;
        self.next_actor_id = ActorId::new(id.get().saturating_add(1));
        if matches!(stats, ActorStats::Player(_)) {
            self.player = Some(id);
        }
        let _ = self.entries.insert(
            id,
            Actor {
                id,
                position,
                velocity: Vec2::ZERO,
                life: LifeState::Alive,
                mode: ActorMode::Moving,
                target: None,
                cooldown: Duration::ZERO,
                spawn_level,
                stats,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: ActorId) -> Option<&Actor> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn player_id(&self) -> Option<ActorId> {
        self.player
    }

    pub(crate) fn player(&self) -> Option<&Actor> {
        self.player.and_then(|id| self.entries.get(&id))
    }

    pub(crate) fn player_mut(&mut self) -> Option<&mut Actor> {
        match self.player {
            Some(id) => self.entries.get_mut(&id),
            None => None,
        }
    }

    pub(crate) fn ids(&self) -> Vec<ActorId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.entries.values_mut()
    }

    /// Drops every enemy that satisfies the predicate, returning their ids.
    pub(crate) fn remove_enemies_where(
        &mut self,
        predicate: impl Fn(&Actor) -> bool,
    ) -> Vec<ActorId> {
        let doomed: Vec<ActorId> = self
            .entries
            .values()
            .filter(|actor| actor.kind() == ActorKind::Enemy && predicate(actor))
            .map(|actor| actor.id)
            .collect();
        for id in &doomed {
            let _ = self.entries.remove(id);
        }
        doomed
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_actor_id = ActorId::new(0);
        self.player = None;
    }
}
