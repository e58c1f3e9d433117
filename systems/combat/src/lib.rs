#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits attack commands for actors whose countdown expired.

use archer_arena_core::{ActorMode, ActorSnapshot, ActorView, Command};

/// Attack cadence system that queues firing and strike commands for ready attackers.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a new combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` for ready ranged attackers and
    /// `Command::MeleeStrike` for ready melee attackers, in actor id order.
    pub fn handle(&mut self, actors: &ActorView, out: &mut Vec<Command>) {
        self.scratch.clear();

        for attacker in actors.iter().filter(|actor| is_ready(actor)) {
            let Some(target) = attacker.target else {
                continue;
            };
            if !actors.get(target).is_some_and(ActorSnapshot::is_alive) {
                continue;
            }
            self.scratch.push(if attacker.ranged {
                Command::FireProjectile {
                    attacker: attacker.id,
                    target,
                }
            } else {
                Command::MeleeStrike {
                    attacker: attacker.id,
                    target,
                }
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn is_ready(actor: &ActorSnapshot) -> bool {
    actor.is_alive() && actor.mode == ActorMode::Attacking && actor.attack_cooldown.is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use archer_arena_core::{ActorId, ActorKind, LifeState};
    use glam::Vec2;
    use std::time::Duration;

    fn attacker(
        id: u32,
        kind: ActorKind,
        target: u32,
        cooldown: Duration,
        ranged: bool,
    ) -> ActorSnapshot {
        ActorSnapshot {
            id: ActorId::new(id),
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            life: LifeState::Alive,
            mode: ActorMode::Attacking,
            target: Some(ActorId::new(target)),
            health: 10,
            max_health: 10,
            move_speed: 1.0,
            attack_range: 1.0,
            attack_cooldown: cooldown,
            ranged,
        }
    }

    #[test]
    fn ready_attackers_fire_or_strike_by_kind() {
        let view = ActorView::from_snapshots(vec![
            attacker(0, ActorKind::Player, 2, Duration::ZERO, true),
            attacker(1, ActorKind::Enemy, 0, Duration::ZERO, false),
            attacker(2, ActorKind::Enemy, 0, Duration::ZERO, true),
        ]);
        let mut out = Vec::new();

        Combat::new().handle(&view, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireProjectile {
                    attacker: ActorId::new(0),
                    target: ActorId::new(2),
                },
                Command::MeleeStrike {
                    attacker: ActorId::new(1),
                    target: ActorId::new(0),
                },
                Command::FireProjectile {
                    attacker: ActorId::new(2),
                    target: ActorId::new(0),
                },
            ]
        );
    }

    #[test]
    fn cooling_moving_and_orphaned_attackers_are_skipped() {
        let mut moving = attacker(1, ActorKind::Enemy, 0, Duration::ZERO, false);
        moving.mode = ActorMode::Moving;
        let mut dying_target = attacker(3, ActorKind::Enemy, 0, Duration::ZERO, false);
        dying_target.life = LifeState::Dying;
        let view = ActorView::from_snapshots(vec![
            attacker(0, ActorKind::Player, 3, Duration::ZERO, true),
            moving,
            attacker(2, ActorKind::Enemy, 0, Duration::from_millis(200), false),
            dying_target,
            attacker(4, ActorKind::Enemy, 99, Duration::ZERO, true),
        ]);
        let mut out = Vec::new();

        Combat::new().handle(&view, &mut out);

        assert!(out.is_empty());
    }
}
