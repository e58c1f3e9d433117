//! Scripted player used by the headless runner.

use archer_arena_core::{DoorState, Event, Skill};
use archer_arena_simulation::Simulation;
use archer_arena_world::query;
use glam::Vec2;

/// Drives movement input and picks skill upgrades between steps.
#[derive(Debug)]
pub(crate) struct Autopilot {
    upgrades: bool,
    next_skill: usize,
}

impl Autopilot {
    pub(crate) fn new(upgrades: bool) -> Self {
        Self {
            upgrades,
            next_skill: 0,
        }
    }

    /// Holds still while the wave lives so the player keeps shooting, then heads for the door.
    pub(crate) fn steer(&self, simulation: &mut Simulation) {
        let input = movement_input(simulation);
        simulation.set_move_input(input);
    }

    /// Spends every level-up of the last step on the next skill in rotation.
    pub(crate) fn upgrade(&mut self, simulation: &mut Simulation) {
        if !self.upgrades {
            return;
        }
        let level_ups = simulation
            .last_events()
            .iter()
            .filter(|event| matches!(event, Event::LevelUp { .. }))
            .count();
        for _ in 0..level_ups {
            let skill = Skill::ALL[self.next_skill % Skill::ALL.len()];
            self.next_skill = self.next_skill.wrapping_add(1);
            simulation.apply_skill_upgrade(skill);
        }
    }
}

fn movement_input(simulation: &Simulation) -> Vec2 {
    let world = simulation.world();
    if query::door_state(world) != DoorState::Open {
        return Vec2::ZERO;
    }
    let door = query::room(world).door().center();
    query::actor_view(world)
        .player()
        .map_or(Vec2::ZERO, |player| (door - player.position).normalize_or_zero())
}
