//! Stat and combat model.
//!
//! These operations are the only code paths that mutate actor statistics.
//! Amounts arrive as signed integers so that negative input can be rejected
//! with [`ArenaError::InvalidArgument`] instead of being silently clamped.

use archer_arena_core::{ActorId, ActorKind, ArenaError, Event, LifeState, PlayerStats, Skill};
use tracing::{debug, error};

use crate::{
    actors::{ActorStats, Damageable},
    World,
};

const LEVEL_THRESHOLD_STEP: u32 = 100;
const LEVEL_UP_MAX_HEALTH: u32 = 10;
const LEVEL_UP_DAMAGE: u32 = 2;
const LEVEL_UP_MOVE_SPEED: f32 = 0.1;

/// Result of a health-changing operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthOutcome {
    /// The actor is dying or dead; nothing changed.
    Ignored,
    /// Health changed to the provided value.
    Changed {
        /// Health after the operation.
        current: u32,
    },
    /// Health reached zero and the actor died.
    Killed,
}

/// Subtracts `amount` from the actor's health, flooring at zero.
///
/// Reaching zero moves the actor to [`LifeState::Dying`] and reports its death
/// exactly once. Dying and dead actors ignore further damage.
///
/// # Errors
///
/// [`ArenaError::InvalidArgument`] for negative amounts and
/// [`ArenaError::NotFound`] for unknown actors.
pub fn take_damage(
    world: &mut World,
    actor: ActorId,
    amount: i32,
    out_events: &mut Vec<Event>,
) -> Result<HealthOutcome, ArenaError> {
    let amount = non_negative("amount", amount)?;
    let target = world
        .actors
        .get_mut(actor)
        .ok_or(ArenaError::NotFound(actor))?;
    if !target.is_alive() {
        return Ok(HealthOutcome::Ignored);
    }

    let health = target.stats.damageable_mut();
    let current = subtract_health(health, amount);
    enforce_health_bounds(actor, health);
    if current > 0 {
        out_events.push(Event::HealthChanged {
            actor,
            current,
            max: health.max_health(),
        });
        return Ok(HealthOutcome::Changed { current });
    }

    target.life = LifeState::Dying;
    target.halt();
    let position = target.position;
    let level = target.spawn_level;
    let rewards = match &target.stats {
        ActorStats::Enemy(stats) => Some((stats.experience_value, stats.gold_value)),
        ActorStats::Player(_) => {
            target.life = LifeState::Dead;
            None
        }
    };

    match rewards {
        Some((experience_value, gold_value)) => {
            debug!(actor = actor.get(), level, "enemy died");
            out_events.push(Event::EnemyDied {
                actor,
                position,
                level,
                experience_value,
                gold_value,
            });
            world.record_enemy_death(out_events);
        }
        None => {
            debug!(actor = actor.get(), "player died");
            out_events.push(Event::PlayerDied { actor });
            world.session.game_over = true;
            out_events.push(Event::GameOver);
        }
    }
    Ok(HealthOutcome::Killed)
}

/// Adds `amount` to the actor's health, capping at its maximum.
///
/// # Errors
///
/// [`ArenaError::InvalidArgument`] for negative amounts and
/// [`ArenaError::NotFound`] for unknown actors.
pub fn heal(
    world: &mut World,
    actor: ActorId,
    amount: i32,
    out_events: &mut Vec<Event>,
) -> Result<HealthOutcome, ArenaError> {
    let amount = non_negative("amount", amount)?;
    let target = world
        .actors
        .get_mut(actor)
        .ok_or(ArenaError::NotFound(actor))?;
    if !target.is_alive() {
        return Ok(HealthOutcome::Ignored);
    }

    let health = target.stats.damageable_mut();
    let current = add_health(health, amount);
    enforce_health_bounds(actor, health);
    out_events.push(Event::HealthChanged {
        actor,
        current,
        max: health.max_health(),
    });
    Ok(HealthOutcome::Changed { current })
}

/// Grants experience to the player and resolves every level-up it earns.
///
/// Returns the number of levels gained.
///
/// # Errors
///
/// [`ArenaError::InvalidArgument`] for negative amounts or non-player actors and
/// [`ArenaError::NotFound`] for unknown actors.
pub fn gain_experience(
    world: &mut World,
    actor: ActorId,
    amount: i32,
    out_events: &mut Vec<Event>,
) -> Result<u32, ArenaError> {
    let amount = non_negative("amount", amount)?;
    let target = world
        .actors
        .get_mut(actor)
        .ok_or(ArenaError::NotFound(actor))?;
    if !target.is_alive() {
        return Ok(0);
    }
    let ActorStats::Player(stats) = &mut target.stats else {
        return Err(ArenaError::invalid("actor", "only the player gains experience"));
    };

    stats.experience = stats.experience.saturating_add(amount);
    out_events.push(Event::ExperienceGained { amount });

    let mut gained = 0;
    while stats.experience >= stats.experience_to_next_level.max(1) {
        level_up(stats);
        gained += 1;
        debug!(level = stats.level, "player levelled up");
        out_events.push(Event::LevelUp { level: stats.level });
        out_events.push(Event::HealthChanged {
            actor,
            current: stats.current_health,
            max: stats.max_health,
        });
    }
    Ok(gained)
}

fn level_up(stats: &mut PlayerStats) {
    stats.experience -= stats.experience_to_next_level.max(1);
    stats.level = stats.level.saturating_add(1);
    stats.experience_to_next_level = LEVEL_THRESHOLD_STEP.saturating_mul(stats.level);
    stats.max_health = stats.max_health.saturating_add(LEVEL_UP_MAX_HEALTH);
    stats.current_health = stats.max_health;
    stats.damage = stats.damage.saturating_add(LEVEL_UP_DAMAGE);
    stats.move_speed += LEVEL_UP_MOVE_SPEED;
}

/// Adds gold to the player's purse and the session total.
///
/// Returns the gold held afterwards.
///
/// # Errors
///
/// [`ArenaError::InvalidArgument`] for negative amounts or non-player actors and
/// [`ArenaError::NotFound`] for unknown actors.
pub fn collect_gold(
    world: &mut World,
    actor: ActorId,
    amount: i32,
    out_events: &mut Vec<Event>,
) -> Result<u32, ArenaError> {
    let amount = non_negative("amount", amount)?;
    let target = world
        .actors
        .get_mut(actor)
        .ok_or(ArenaError::NotFound(actor))?;
    let ActorStats::Player(stats) = &mut target.stats else {
        return Err(ArenaError::invalid("actor", "only the player collects gold"));
    };

    stats.gold_coins = stats.gold_coins.saturating_add(amount);
    let total = stats.gold_coins;
    world.session.total_gold_collected = world.session.total_gold_collected.saturating_add(amount);
    out_events.push(Event::GoldChanged { total });
    Ok(total)
}

/// Applies a percentage upgrade to the player.
///
/// # Errors
///
/// [`ArenaError::InvalidArgument`] for non-player actors and
/// [`ArenaError::NotFound`] for unknown actors.
pub fn apply_skill_upgrade(
    world: &mut World,
    actor: ActorId,
    skill: Skill,
    out_events: &mut Vec<Event>,
) -> Result<(), ArenaError> {
    let target = world
        .actors
        .get_mut(actor)
        .ok_or(ArenaError::NotFound(actor))?;
    if target.kind() != ActorKind::Player {
        return Err(ArenaError::invalid("actor", "only the player takes upgrades"));
    }
    if !target.is_alive() {
        return Ok(());
    }
    let ActorStats::Player(stats) = &mut target.stats else {
        return Err(ArenaError::invalid("actor", "only the player takes upgrades"));
    };

    let factor = 1.0 + skill.fraction();
    match skill {
        Skill::Damage => {
            let scaled = u64::from(stats.damage) * u64::from(100 + skill.percent()) + 50;
            stats.damage = u32::try_from(scaled / 100).unwrap_or(u32::MAX);
        }
        Skill::Health => {
            let bonus = u64::from(stats.max_health) * u64::from(skill.percent()) / 100;
            let bonus = u32::try_from(bonus).unwrap_or(u32::MAX);
            stats.max_health = stats.max_health.saturating_add(bonus);
            stats.current_health = stats.current_health.saturating_add(bonus);
        }
        Skill::Speed => stats.move_speed *= factor,
        Skill::AttackSpeed => stats.attack_speed *= factor,
        Skill::ProjectileSpeed => stats.projectile_speed *= factor,
    }
    enforce_health_bounds(actor, stats);
    debug!(?skill, "skill upgraded");
    out_events.push(Event::SkillUpgraded { skill });
    if skill == Skill::Health {
        out_events.push(Event::HealthChanged {
            actor,
            current: stats.current_health,
            max: stats.max_health,
        });
    }
    Ok(())
}

fn non_negative(name: &'static str, amount: i32) -> Result<u32, ArenaError> {
    u32::try_from(amount).map_err(|_| {
        ArenaError::invalid(
            name,
            format!("expected a non-negative amount, got {amount}"),
        )
    })
}

fn subtract_health<T: Damageable + ?Sized>(target: &mut T, amount: u32) -> u32 {
    let next = target.health().saturating_sub(amount);
    target.set_health(next);
    next
}

fn add_health<T: Damageable + ?Sized>(target: &mut T, amount: u32) -> u32 {
    let next = target.health().saturating_add(amount).min(target.max_health());
    target.set_health(next);
    next
}

fn enforce_health_bounds<T: Damageable + ?Sized>(actor: ActorId, target: &mut T) {
    let (current, max) = (target.health(), target.max_health());
    debug_assert!(current <= max, "health {current} exceeds maximum {max}");
    if current > max {
        let violation = ArenaError::InvariantViolation(format!(
            "actor {} health {current} exceeds maximum {max}",
            actor.get()
        ));
        error!(%violation, "clamping health");
        target.set_health(max);
    }
}
