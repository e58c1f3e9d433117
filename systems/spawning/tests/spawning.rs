use std::time::Duration;

use archer_arena_core::{
    CellCoord, Command, CountPolicy, Event, GameConfig, PrefabSelection, SpawnMode,
};
use archer_arena_system_spawning::{Config, WaveDirector};
use archer_arena_world::{self as world, query, World};
use glam::Vec2;

fn config_with(mode: SpawnMode) -> GameConfig {
    let mut config = GameConfig::default();
    config.waves.spawn_mode = mode;
    config
}

fn room_generated(level: u32) -> Event {
    Event::RoomGenerated {
        level,
        columns: 20,
        rows: 20,
    }
}

fn floor_of(world: &World) -> Vec<CellCoord> {
    query::room(world).floor_cells().to_vec()
}

fn spawn_positions(commands: &[Command]) -> Vec<Vec2> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnEnemy { position, .. } => Some(*position),
            _ => None,
        })
        .collect()
}

#[test]
fn batch_mode_emits_the_whole_wave_at_once() {
    let config = config_with(SpawnMode::Batch);
    let mut world = World::new(config.clone());
    let mut director = WaveDirector::new(Config::from_game(&config));
    let floor = floor_of(&world);
    let start = config.room.player_start();

    let mut commands = Vec::new();
    director.handle(&[room_generated(1)], &floor, start, &mut commands);

    assert_eq!(commands.first(), Some(&Command::BeginWave { enemy_count: 5 }));
    assert_eq!(spawn_positions(&commands).len(), 5);
    assert_eq!(director.pending_spawns(), 0);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    assert_eq!(spawned, 5);
    assert_eq!(query::enemies_remaining(&world), 5);
}

#[test]
fn round_robin_cycles_through_the_roster() {
    let config = config_with(SpawnMode::Batch);
    let world = World::new(config.clone());
    let mut director = WaveDirector::new(Config::from_game(&config));

    let mut commands = Vec::new();
    director.handle(
        &[room_generated(1)],
        &floor_of(&world),
        config.room.player_start(),
        &mut commands,
    );

    let templates: Vec<&str> = commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnEnemy { template, .. } => Some(template.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(templates, vec!["grunt", "archer", "grunt", "archer", "grunt"]);
}

#[test]
fn spawned_stats_are_scaled_to_the_room_level() {
    let mut config = config_with(SpawnMode::Batch);
    config.waves.prefab_selection = PrefabSelection::Random;
    config.enemies.truncate(1);
    let world = World::new(config.clone());
    let mut director = WaveDirector::new(Config::from_game(&config));

    let mut commands = Vec::new();
    director.handle(
        &[room_generated(2)],
        &floor_of(&world),
        config.room.player_start(),
        &mut commands,
    );

    for command in &commands {
        if let Command::SpawnEnemy { stats, .. } = command {
            assert_eq!(stats.max_health, 60);
            assert_eq!(stats.current_health, 60);
            assert_eq!(stats.damage, 11);
            assert_eq!(stats.gold_value, 6);
        }
    }
}

#[test]
fn sequenced_mode_spawns_first_enemy_immediately_and_the_rest_over_time() {
    let config = config_with(SpawnMode::Sequenced);
    let world = World::new(config.clone());
    let mut director = WaveDirector::new(Config::from_game(&config));
    let floor = floor_of(&world);
    let start = config.room.player_start();

    let mut commands = Vec::new();
    director.handle(&[room_generated(1)], &floor, start, &mut commands);
    assert_eq!(commands.len(), 2, "begin wave plus the first spawn");
    assert_eq!(director.pending_spawns(), 4);

    commands.clear();
    director.handle(&[], &floor, start, &mut commands);
    assert!(commands.is_empty(), "no spawn without elapsed time");

    director.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(400),
        }],
        &floor,
        start,
        &mut commands,
    );
    assert!(commands.is_empty(), "delays are at least half a second");

    let mut spawned = 0;
    for _ in 0..100 {
        commands.clear();
        director.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(100),
            }],
            &floor,
            start,
            &mut commands,
        );
        spawned += spawn_positions(&commands).len();
    }
    assert_eq!(spawned, 4);
    assert_eq!(director.pending_spawns(), 0);
}

#[test]
fn a_new_room_cancels_the_previous_sequenced_task() {
    let config = config_with(SpawnMode::Sequenced);
    let world = World::new(config.clone());
    let mut director = WaveDirector::new(Config::from_game(&config));
    let floor = floor_of(&world);
    let start = config.room.player_start();

    let mut commands = Vec::new();
    director.handle(&[room_generated(1)], &floor, start, &mut commands);
    assert_eq!(director.pending_spawns(), 4);

    commands.clear();
    director.handle(&[room_generated(2)], &floor, start, &mut commands);
    assert_eq!(commands.first(), Some(&Command::BeginWave { enemy_count: 7 }));
    assert_eq!(director.pending_spawns(), 6);

    commands.clear();
    director.handle(&[Event::NewGameStarted], &floor, start, &mut commands);
    assert_eq!(director.pending_spawns(), 0);
    assert!(commands.is_empty());
}

#[test]
fn no_wave_ever_spawns_inside_the_exclusion_radius() {
    for seed in [0_u64, 1, 42, 0xdead_beef] {
        let mut config = config_with(SpawnMode::Batch);
        config.seed = seed;
        config.waves.count_policy = CountPolicy::Exponential;
        config.room.exclusion_radius = 7.5;
        let world = World::new(config.clone());
        let mut director = WaveDirector::new(Config::from_game(&config));
        let floor = floor_of(&world);
        let start = config.room.player_start();

        for level in 1..=12 {
            let mut commands = Vec::new();
            director.handle(&[room_generated(level)], &floor, start, &mut commands);
            let positions = spawn_positions(&commands);
            assert!(!positions.is_empty());
            for position in positions {
                assert!(
                    position.distance(start) >= 7.5,
                    "seed {seed} level {level} spawned at {position:?}"
                );
            }
        }
    }
}

#[test]
fn wave_size_is_limited_by_available_candidates() {
    let mut config = config_with(SpawnMode::Batch);
    config.room.width = 7;
    config.room.height = 7;
    config.room.exclusion_radius = 3.2;
    let world = World::new(config.clone());
    let mut director = WaveDirector::new(Config::from_game(&config));
    let floor = floor_of(&world);
    let start = config.room.player_start();
    let available = floor
        .iter()
        .filter(|cell| cell.center().distance(start) >= 3.2)
        .count();

    let mut commands = Vec::new();
    director.handle(&[room_generated(1)], &floor, start, &mut commands);

    assert_eq!(available, 2, "only the far top corners qualify");
    assert_eq!(commands.first(), Some(&Command::BeginWave { enemy_count: 2 }));
    assert_eq!(spawn_positions(&commands).len(), available);
}

#[test]
fn planning_is_deterministic_per_seed_and_level() {
    let config = config_with(SpawnMode::Batch);
    let world = World::new(config.clone());
    let floor = floor_of(&world);
    let start = config.room.player_start();

    let plan = |seed: u64, level: u32| {
        let mut config = config.clone();
        config.seed = seed;
        let mut director = WaveDirector::new(Config::from_game(&config));
        let mut commands = Vec::new();
        director.handle(&[room_generated(level)], &floor, start, &mut commands);
        spawn_positions(&commands)
    };

    assert_eq!(plan(9, 1), plan(9, 1));
    assert_ne!(plan(9, 1), plan(10, 1));
    assert_ne!(plan(9, 1), plan(9, 2));
}
