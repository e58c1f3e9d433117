#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that arbitrates between moving and attacking for every actor.
//!
//! The player targets the nearest living enemy and only attacks while its
//! movement input is idle. Enemies always target the player: they attack once
//! it is within range and otherwise steer straight toward it. Nothing is
//! cached between calls; every decision is recomputed from the view.

use archer_arena_core::{ActorId, ActorSnapshot, ActorView, Command, Intent};
use glam::Vec2;

/// Targeting system that reuses a scratch buffer of enemy candidates.
#[derive(Debug, Default)]
pub struct Targeting {
    enemy_workspace: Vec<Candidate>,
}

impl Targeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `Command::SetIntent` per living actor.
    ///
    /// `move_input` is the player's latest movement input and `deadzone` the
    /// magnitude at or below which it counts as idle.
    pub fn handle(
        &mut self,
        actors: &ActorView,
        move_input: Vec2,
        deadzone: f32,
        out: &mut Vec<Command>,
    ) {
        self.prepare_enemy_workspace(actors);
        let player = actors.player().filter(|player| player.is_alive());

        if let Some(player) = player {
            let intent = self.player_intent(player, move_input, deadzone);
            out.push(Command::SetIntent {
                actor: player.id,
                intent,
            });
        }

        for enemy in actors.enemies().filter(|enemy| enemy.is_alive()) {
            out.push(Command::SetIntent {
                actor: enemy.id,
                intent: enemy_intent(enemy, player),
            });
        }
    }

    fn player_intent(&self, player: &ActorSnapshot, move_input: Vec2, deadzone: f32) -> Intent {
        if move_input.length() > deadzone {
            return Intent::Move {
                velocity: move_input * player.move_speed,
            };
        }

        match self.nearest_enemy(player.position) {
            Some(nearest) if nearest.distance <= player.attack_range => Intent::Attack {
                target: nearest.id,
            },
            _ => Intent::Move {
                velocity: Vec2::ZERO,
            },
        }
    }

    /// Linear scan; the first candidate with a strictly smaller distance wins.
    fn nearest_enemy(&self, from: Vec2) -> Option<Nearest> {
        let mut best: Option<Nearest> = None;
        for candidate in &self.enemy_workspace {
            let distance = candidate.position.distance(from);
            if best.map_or(true, |current| distance < current.distance) {
                best = Some(Nearest {
                    id: candidate.id,
                    distance,
                });
            }
        }
        best
    }

    fn prepare_enemy_workspace(&mut self, actors: &ActorView) {
        self.enemy_workspace.clear();
        for snapshot in actors.enemies().filter(|enemy| enemy.is_alive()) {
            self.enemy_workspace.push(Candidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

fn enemy_intent(enemy: &ActorSnapshot, player: Option<&ActorSnapshot>) -> Intent {
    let Some(player) = player else {
        return Intent::Move {
            velocity: Vec2::ZERO,
        };
    };

    let offset = player.position - enemy.position;
    if offset.length() <= enemy.attack_range {
        Intent::Attack { target: player.id }
    } else {
        Intent::Move {
            velocity: offset.normalize_or_zero() * enemy.move_speed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: ActorId,
    position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Nearest {
    id: ActorId,
    distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use archer_arena_core::{ActorKind, ActorMode, LifeState};
    use std::time::Duration;

    fn snapshot(id: u32, kind: ActorKind, position: Vec2) -> ActorSnapshot {
        let (move_speed, attack_range) = match kind {
            ActorKind::Player => (5.0, 100.0),
            ActorKind::Enemy => (2.0, 1.5),
        };
        ActorSnapshot {
            id: ActorId::new(id),
            kind,
            position,
            velocity: Vec2::ZERO,
            life: LifeState::Alive,
            mode: ActorMode::Moving,
            target: None,
            health: 50,
            max_health: 50,
            move_speed,
            attack_range,
            attack_cooldown: Duration::ZERO,
            ranged: kind == ActorKind::Player,
        }
    }

    fn intents(view: &ActorView, move_input: Vec2) -> Vec<Command> {
        let mut system = Targeting::new();
        let mut out = Vec::new();
        system.handle(view, move_input, 0.1, &mut out);
        out
    }

    fn intent_of(commands: &[Command], actor: u32) -> Option<Intent> {
        commands.iter().find_map(|command| match command {
            Command::SetIntent { actor: id, intent } if id.get() == actor => Some(*intent),
            _ => None,
        })
    }

    #[test]
    fn idle_player_attacks_the_nearest_enemy() {
        let view = ActorView::from_snapshots(vec![
            snapshot(0, ActorKind::Player, Vec2::new(10.0, 2.0)),
            snapshot(1, ActorKind::Enemy, Vec2::new(10.0, 12.0)),
            snapshot(2, ActorKind::Enemy, Vec2::new(13.0, 6.0)),
        ]);

        let out = intents(&view, Vec2::ZERO);

        assert_eq!(
            intent_of(&out, 0),
            Some(Intent::Attack {
                target: ActorId::new(2)
            })
        );
    }

    #[test]
    fn equal_distances_keep_the_first_enemy_in_id_order() {
        let view = ActorView::from_snapshots(vec![
            snapshot(0, ActorKind::Player, Vec2::new(10.0, 10.0)),
            snapshot(7, ActorKind::Enemy, Vec2::new(14.0, 10.0)),
            snapshot(3, ActorKind::Enemy, Vec2::new(6.0, 10.0)),
        ]);

        let out = intents(&view, Vec2::ZERO);

        assert_eq!(
            intent_of(&out, 0),
            Some(Intent::Attack {
                target: ActorId::new(3)
            })
        );
    }

    #[test]
    fn movement_input_overrides_attacking() {
        let view = ActorView::from_snapshots(vec![
            snapshot(0, ActorKind::Player, Vec2::new(10.0, 2.0)),
            snapshot(1, ActorKind::Enemy, Vec2::new(10.0, 4.0)),
        ]);

        let out = intents(&view, Vec2::new(0.0, -1.0));

        assert_eq!(
            intent_of(&out, 0),
            Some(Intent::Move {
                velocity: Vec2::new(0.0, -5.0)
            })
        );
    }

    #[test]
    fn input_inside_the_deadzone_counts_as_idle() {
        let view = ActorView::from_snapshots(vec![
            snapshot(0, ActorKind::Player, Vec2::new(10.0, 2.0)),
            snapshot(1, ActorKind::Enemy, Vec2::new(10.0, 4.0)),
        ]);

        let out = intents(&view, Vec2::new(0.05, 0.05));

        assert_eq!(
            intent_of(&out, 0),
            Some(Intent::Attack {
                target: ActorId::new(1)
            })
        );
    }

    #[test]
    fn idle_player_without_targets_stands_still() {
        let mut dying = snapshot(1, ActorKind::Enemy, Vec2::new(10.0, 4.0));
        dying.life = LifeState::Dying;
        let view = ActorView::from_snapshots(vec![
            snapshot(0, ActorKind::Player, Vec2::new(10.0, 2.0)),
            dying,
        ]);

        let out = intents(&view, Vec2::ZERO);

        assert_eq!(
            out,
            vec![Command::SetIntent {
                actor: ActorId::new(0),
                intent: Intent::Move {
                    velocity: Vec2::ZERO
                },
            }]
        );
    }

    #[test]
    fn enemies_steer_toward_the_player_until_in_range() {
        let view = ActorView::from_snapshots(vec![
            snapshot(0, ActorKind::Player, Vec2::new(10.0, 2.0)),
            snapshot(1, ActorKind::Enemy, Vec2::new(10.0, 12.0)),
            snapshot(2, ActorKind::Enemy, Vec2::new(11.0, 2.0)),
        ]);

        let out = intents(&view, Vec2::new(1.0, 0.0));

        assert_eq!(
            intent_of(&out, 1),
            Some(Intent::Move {
                velocity: Vec2::new(0.0, -2.0)
            })
        );
        assert_eq!(
            intent_of(&out, 2),
            Some(Intent::Attack {
                target: ActorId::new(0)
            })
        );
    }

    #[test]
    fn enemies_idle_once_the_player_is_gone() {
        let mut player = snapshot(0, ActorKind::Player, Vec2::new(10.0, 2.0));
        player.life = LifeState::Dead;
        let view = ActorView::from_snapshots(vec![
            player,
            snapshot(1, ActorKind::Enemy, Vec2::new(10.0, 12.0)),
        ]);

        let out = intents(&view, Vec2::ZERO);

        assert_eq!(
            out,
            vec![Command::SetIntent {
                actor: ActorId::new(1),
                intent: Intent::Move {
                    velocity: Vec2::ZERO
                },
            }]
        );
    }
}
