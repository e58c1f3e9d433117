use std::time::Duration;

use archer_arena_core::{Command, EnemyStats, Event, GameConfig, PickupKind};
use archer_arena_system_progression::{Config, DropRoller};
use archer_arena_world::{self as world, combat, query, World};
use glam::Vec2;

fn run(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn generous_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.drops.gold.rate = 1.0;
    config.drops.health_potion.rate = 0.0;
    config.drops.experience_orb.rate = 1.0;
    config.drops.scatter = 0.0;
    config
}

#[test]
fn a_kill_next_to_the_player_pays_out_in_the_same_tick() {
    let config = generous_config();
    let mut world = World::new(config.clone());
    let mut roller = DropRoller::new(Config::from_game(&config));
    let spawned = run(
        &mut world,
        [
            Command::BeginWave { enemy_count: 1 },
            Command::SpawnEnemy {
                template: "grunt".to_owned(),
                position: Vec2::new(10.5, 2.0),
                stats: EnemyStats::grunt(),
            },
        ],
    );
    let enemy = spawned
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { actor, .. } => Some(*actor),
            _ => None,
        })
        .expect("enemy spawned");

    let mut events = Vec::new();
    let _ = combat::take_damage(&mut world, enemy, 50, &mut events).expect("damage applies");
    let mut drops = Vec::new();
    roller.handle(&events, &mut drops);
    assert_eq!(drops.len(), 2);

    drops.push(Command::Tick {
        dt: Duration::from_millis(16),
    });
    drops.push(Command::ResolvePickups);
    let payout = run(&mut world, drops);

    assert!(payout.contains(&Event::GoldChanged { total: 5 }));
    assert!(payout.contains(&Event::ExperienceGained { amount: 10 }));
    let collected: Vec<PickupKind> = payout
        .iter()
        .filter_map(|event| match event {
            Event::PickupCollected { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(collected, vec![PickupKind::Gold, PickupKind::ExperienceOrb]);
    assert!(query::pickups(&world).is_empty());
    assert_eq!(query::score(&world), 105);
}

#[test]
fn drops_of_a_later_level_follow_their_own_stream() {
    let mut config = generous_config();
    config.drops.gold.rate = 0.5;
    config.drops.scatter = 0.5;
    let death = Event::EnemyDied {
        actor: archer_arena_core::ActorId::new(1),
        position: Vec2::new(8.0, 8.0),
        level: 2,
        experience_value: 10,
        gold_value: 5,
    };

    let replay = |prefix: &[Event]| {
        let mut roller = DropRoller::new(Config::from_game(&config));
        let mut ignored = Vec::new();
        roller.handle(prefix, &mut ignored);
        let mut out = Vec::new();
        roller.handle(&[Event::LevelChanged { level: 2 }, death.clone()], &mut out);
        out
    };

    let fresh = replay(&[]);
    let after_level_one = replay(&[death.clone(), death.clone(), death.clone()]);
    assert_eq!(fresh, after_level_one);
}
