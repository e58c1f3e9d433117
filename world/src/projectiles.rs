//! Projectile lifecycle and collision resolution.

use std::{collections::BTreeMap, time::Duration};

use archer_arena_core::{ActorId, ArenaError, Event, ProjectileFate, ProjectileId, Side};
use glam::Vec2;
use tracing::{trace, warn};

use crate::{combat, World};

const SUBSTEP_LENGTH: f32 = 0.25;
const MAX_SUBSTEPS: u32 = 1024;

/// Parameters of a projectile launch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Launch {
    /// Actor credited with the projectile.
    pub owner: ActorId,
    /// Starting position.
    pub origin: Vec2,
    /// Point the projectile is aimed at.
    pub target: Vec2,
    /// Damage applied on hit.
    pub damage: u32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Side the projectile belongs to.
    pub side: Side,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) owner: ActorId,
    pub(crate) side: Side,
    pub(crate) position: Vec2,
    pub(crate) direction: Vec2,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
    pub(crate) remaining: Duration,
    hits: Vec<ActorId>,
}

/// Exclusive owner of every live projectile in the session.
#[derive(Debug)]
pub(crate) struct ProjectileStore {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.values()
    }

    /// Ages every projectile and destroys the ones whose lifetime ran out.
    pub(crate) fn age(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut expired = Vec::new();
        for projectile in self.entries.values_mut() {
            projectile.remaining = projectile.remaining.saturating_sub(dt);
            if projectile.remaining.is_zero() {
                expired.push(projectile.id);
            }
        }
        for id in expired {
            let _ = self.entries.remove(&id);
            out_events.push(Event::ProjectileDestroyed {
                projectile: id,
                fate: ProjectileFate::Expired,
            });
        }
    }

    /// Destroys every projectile, reporting each as cleared.
    pub(crate) fn clear(&mut self, out_events: &mut Vec<Event>) {
        for id in self.entries.keys() {
            out_events.push(Event::ProjectileDestroyed {
                projectile: *id,
                fate: ProjectileFate::Cleared,
            });
        }
        self.entries.clear();
    }

    pub(crate) fn reset(&mut self) {
        self.entries.clear();
        self.next_projectile_id = ProjectileId::new(0);
    }
}

/// Launches a projectile from `origin` toward `target`.
///
/// # Errors
///
/// [`ArenaError::InvalidArgument`] when the speed is not positive or the
/// target coincides with the origin.
pub fn fire_projectile(
    world: &mut World,
    launch: Launch,
    out_events: &mut Vec<Event>,
) -> Result<ProjectileId, ArenaError> {
    if !(launch.speed.is_finite() && launch.speed > 0.0) {
        return Err(ArenaError::invalid(
            "speed",
            format!("projectile speed must be positive, got {}", launch.speed),
        ));
    }
    let direction = (launch.target - launch.origin).normalize_or_zero();
    if direction == Vec2::ZERO {
        return Err(ArenaError::invalid(
            "target",
            "projectile target coincides with its origin",
        ));
    }

    let store = &mut world.projectiles;
    let id = store.next_projectile_id;
    store.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
    let _ = store.entries.insert(
        id,
        Projectile {
            id,
            owner: launch.owner,
            side: launch.side,
            position: launch.origin,
            direction,
            speed: launch.speed,
            damage: launch.damage,
            remaining: world.config.projectiles.lifetime(),
            hits: Vec::new(),
        },
    );
    out_events.push(Event::ProjectileFired {
        projectile: id,
        side: launch.side,
        origin: launch.origin,
        direction,
    });
    Ok(id)
}

/// Advances every projectile by the frame delta and resolves its collisions.
///
/// Movement is split into short substeps. At each substep terrain is checked
/// first, then opposing actors in identifier order; a projectile is destroyed
/// as soon as it has hit one more actor than its pierce allowance. Once a hit
/// ends the game, the remaining projectiles stay where they are.
pub(crate) fn resolve(world: &mut World, out_events: &mut Vec<Event>) {
    let dt = world.frame_dt.as_secs_f32();
    let ids: Vec<ProjectileId> = world.projectiles.entries.keys().copied().collect();
    for id in ids {
        if world.session.game_over {
            break;
        }
        let Some(mut projectile) = world.projectiles.entries.remove(&id) else {
            continue;
        };
        match advance(world, &mut projectile, dt, out_events) {
            Some(fate) => {
                trace!(projectile = id.get(), ?fate, "projectile destroyed");
                out_events.push(Event::ProjectileDestroyed {
                    projectile: id,
                    fate,
                });
            }
            None => {
                let _ = world.projectiles.entries.insert(id, projectile);
            }
        }
    }
}

fn advance(
    world: &mut World,
    projectile: &mut Projectile,
    dt: f32,
    out_events: &mut Vec<Event>,
) -> Option<ProjectileFate> {
    let distance = projectile.speed * dt;
    if distance <= 0.0 {
        return None;
    }
    let steps = ((distance / SUBSTEP_LENGTH).ceil() as u32).clamp(1, MAX_SUBSTEPS);
    let step = projectile.direction * (distance / steps as f32);
    let reach = world.config.projectiles.radius + world.config.bodies.actor_radius;
    let pierce = world.config.projectiles.pierce as usize;

    for _ in 0..steps {
        projectile.position += step;
        if world.room.blocks_projectile(projectile.position) {
            return Some(ProjectileFate::HitTerrain);
        }

        let overlapping: Vec<ActorId> = world
            .actors
            .iter()
            .filter(|actor| actor.is_alive())
            .filter(|actor| actor.kind().side().opposes(projectile.side))
            .filter(|actor| !projectile.hits.contains(&actor.id))
            .filter(|actor| actor.position.distance(projectile.position) <= reach)
            .map(|actor| actor.id)
            .collect();

        for actor in overlapping {
            if world.session.game_over {
                return None;
            }
            let amount = i32::try_from(projectile.damage).unwrap_or(i32::MAX);
            if let Err(error) = combat::take_damage(world, actor, amount, out_events) {
                warn!(%error, projectile = projectile.id.get(), "projectile hit failed");
            }
            projectile.hits.push(actor);
            if projectile.hits.len() > pierce {
                return Some(ProjectileFate::HitActor { actor });
            }
        }
    }
    None
}
