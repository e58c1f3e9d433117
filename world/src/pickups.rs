//! Collectibles dropped by enemies.

use std::{collections::BTreeMap, time::Duration};

use archer_arena_core::{Event, PickupId, PickupKind};
use glam::Vec2;
use tracing::warn;

use crate::{combat, World};

#[derive(Clone, Debug)]
pub(crate) struct Pickup {
    pub(crate) id: PickupId,
    pub(crate) kind: PickupKind,
    pub(crate) position: Vec2,
    pub(crate) value: u32,
    pub(crate) remaining: Duration,
}

#[derive(Debug)]
pub(crate) struct PickupStore {
    entries: BTreeMap<PickupId, Pickup>,
    next_pickup_id: PickupId,
}

impl PickupStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_pickup_id: PickupId::new(0),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Pickup> {
        self.entries.values()
    }

    pub(crate) fn insert(
        &mut self,
        kind: PickupKind,
        position: Vec2,
        value: u32,
        lifetime: Duration,
    ) -> PickupId {
        let id = self.next_pickup_id;
        self.next_pickup_id = PickupId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            Pickup {
                id,
                kind,
                position,
                value,
                remaining: lifetime,
            },
        );
        id
    }

    pub(crate) fn age(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut expired = Vec::new();
        for pickup in self.entries.values_mut() {
            pickup.remaining = pickup.remaining.saturating_sub(dt);
            if pickup.remaining.is_zero() {
                expired.push(pickup.id);
            }
        }
        for pickup in expired {
            let _ = self.entries.remove(&pickup);
            out_events.push(Event::PickupExpired { pickup });
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn reset(&mut self) {
        self.entries.clear();
        self.next_pickup_id = PickupId::new(0);
    }
}

/// Drifts magnetised experience orbs and applies every pickup the player touches.
pub(crate) fn resolve(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(player) = world.actors.player().filter(|player| player.is_alive()) else {
        return;
    };
    let (player_id, player_position) = (player.id, player.position);
    let dt = world.frame_dt.as_secs_f32();
    let drops = &world.config.drops;
    let (magnet_distance, magnet_speed) = (drops.magnet_distance, drops.magnet_speed);
    let pickup_radius = world.config.bodies.pickup_radius;

    let mut collected = Vec::new();
    for pickup in world.pickups.entries.values_mut() {
        if pickup.kind == PickupKind::ExperienceOrb {
            let distance = pickup.position.distance(player_position);
            if distance > 0.0 && distance < magnet_distance {
                let speed = magnet_speed + (magnet_distance - distance) * 2.0;
                let travel = (speed * dt).min(distance);
                pickup.position += (player_position - pickup.position) / distance * travel;
            }
        }
        if pickup.position.distance(player_position) <= pickup_radius {
            collected.push(pickup.id);
        }
    }

    for id in collected {
        let Some(pickup) = world.pickups.entries.remove(&id) else {
            continue;
        };
        let amount = i32::try_from(pickup.value).unwrap_or(i32::MAX);
        let result = match pickup.kind {
            PickupKind::Gold => {
                combat::collect_gold(world, player_id, amount, out_events).map(|_| ())
            }
            PickupKind::HealthPotion => {
                combat::heal(world, player_id, amount, out_events).map(|_| ())
            }
            PickupKind::ExperienceOrb => {
                combat::gain_experience(world, player_id, amount, out_events).map(|_| ())
            }
        };
        if let Err(error) = result {
            warn!(%error, pickup = id.get(), "pickup could not be applied");
        }
        out_events.push(Event::PickupCollected {
            pickup: id,
            kind: pickup.kind,
            value: pickup.value,
        });
    }
}
