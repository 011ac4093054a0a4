use monoray_engine::{
    cast_ray, normalize_angle, HighScoreStore, PlayerInput, Vec2, MAX_RENDER_DISTANCE,
};
use rand::rngs::SmallRng;
use rand::Rng;
use tracing::{debug, info, warn};

use super::levels::{Level, LEVELS, MAP_HEIGHT, MAP_WIDTH};
use super::types::{Enemy, GameMode, SceneState, Tuning, WorldState, MAX_ENEMIES};

/// Distances clamp to this before normalizing a chase or knockback
/// direction.
const MIN_CHASE_DISTANCE: f32 = 0.1;
/// Logic ticks the hit marker stays on screen after a landed shot.
const HIT_MARKER_TICKS: u32 = 6;

pub(crate) struct StepContext<'a> {
    pub(crate) tuning: &'a Tuning,
    pub(crate) store: &'a HighScoreStore,
    pub(crate) rng: &'a mut SmallRng,
}

/// One logic tick: consumes the held input, advances the scene state
/// machine, and leaves the world consistent for the next render snapshot.
///
/// Ordering within a tick: player rotation and movement, then combat, then
/// the Classic clear check, then the throttled AI pass.
pub(crate) fn step(world: &mut WorldState, input: PlayerInput, ctx: &mut StepContext<'_>) {
    let fire_edge = input.firing && !world.was_firing;
    match world.scene {
        SceneState::Menu => menu_step(world, input, fire_edge, ctx),
        SceneState::Playing => playing_step(world, input, ctx),
        SceneState::LevelTransition => transition_step(world, ctx),
        SceneState::GameOver | SceneState::Victory => {
            if fire_edge {
                info!(scene = ?world.scene, "returning_to_menu");
                world.scene = SceneState::Menu;
            }
        }
    }
    world.was_firing = input.firing;
}

fn menu_step(world: &mut WorldState, input: PlayerInput, fire_edge: bool, ctx: &mut StepContext<'_>) {
    if input.y > 0.0 {
        world.menu_cursor = GameMode::Classic;
    } else if input.y < 0.0 {
        world.menu_cursor = GameMode::Arcade;
    }

    if fire_edge {
        let mode = world.menu_cursor;
        world.start_run(mode, ctx.tuning);
        info!(mode = ?mode, "run_started");
    }
}

fn playing_step(world: &mut WorldState, input: PlayerInput, ctx: &mut StepContext<'_>) {
    let tuning = ctx.tuning;
    world.logic_tick = world.logic_tick.wrapping_add(1);
    if world.hit_marker_ticks > 0 {
        world.hit_marker_ticks -= 1;
    }

    let level = world.level();

    if input.x != 0.0 {
        world.player.pose.rotate(-input.x * tuning.rotation_speed);
    }

    if input.y != 0.0 {
        let distance = input.y * tuning.move_speed;
        let delta = Vec2::new(
            world.player.pose.dir.x * distance,
            world.player.pose.dir.y * distance,
        );
        let mut position = world.player.pose.position;
        try_move(level, &mut position, delta);
        world.player.pose.position = position;
    }

    if input.firing {
        resolve_combat(world, ctx);
    }

    if world.mode == GameMode::Classic
        && world.scene == SceneState::Playing
        && world.active_enemy_count() == 0
    {
        world.scene = SceneState::LevelTransition;
        world.transition_ticks_left = tuning.transition_ticks;
        info!(level = world.level_index, "level_cleared");
    }

    if world.scene == SceneState::Playing && world.logic_tick % tuning.ai_tick_divider == 0 {
        ai_step(world, ctx);
    }
}

/// Moves by the X and Y components independently, each permitted only onto
/// an empty tile. Produces sliding along walls instead of sticking.
fn try_move(level: &Level, position: &mut Vec2, delta: Vec2) {
    let next_x = position.x + delta.x;
    if level.is_open(next_x.floor() as i32, position.y.floor() as i32) {
        position.x = next_x;
    }
    let next_y = position.y + delta.y;
    if level.is_open(position.x.floor() as i32, next_y.floor() as i32) {
        position.y = next_y;
    }
}

/// Resolves at most one hit per tick. Among the active enemies in range,
/// in front of the nearest wall, and within the facing tolerance, the one
/// with the smallest angular difference takes the hit.
fn resolve_combat(world: &mut WorldState, ctx: &mut StepContext<'_>) {
    let tuning = ctx.tuning;
    let pose = world.player.pose;
    let wall_ahead = cast_ray(
        world.level(),
        pose.position,
        pose.dir,
        0.0,
        MAX_RENDER_DISTANCE,
    );
    let facing = pose.facing_angle();

    let mut best: Option<(f32, usize)> = None;
    for (slot, enemy) in world.enemies.iter().enumerate() {
        if !enemy.active {
            continue;
        }
        let offset = enemy.position - pose.position;
        let distance = offset.length();
        if distance > tuning.combat_range || distance >= wall_ahead.distance {
            continue;
        }
        let angle_diff = normalize_angle(offset.angle() - facing).abs();
        if angle_diff > tuning.facing_tolerance {
            continue;
        }
        if best.map_or(true, |(best_diff, _)| angle_diff < best_diff) {
            best = Some((angle_diff, slot));
        }
    }

    let Some((_, slot)) = best else {
        return;
    };

    let enemy = &mut world.enemies[slot];
    enemy.health -= 1;
    world.hit_marker_ticks = HIT_MARKER_TICKS;
    if enemy.health > 0 {
        return;
    }

    enemy.active = false;
    world.score = world.score.saturating_add(tuning.score_bonus);
    info!(slot, score = world.score, "enemy_down");

    if world.score > world.high_score {
        world.high_score = world.score;
        if let Err(error) = ctx.store.save(world.high_score) {
            // The in-memory high score stays valid for the session.
            warn!(error = %error, "high_score_save_failed");
        }
    }
}

/// The throttled AI pass: chase, melee with knockback, then the mode's
/// population rules. Runs every `ai_tick_divider`-th logic tick.
fn ai_step(world: &mut WorldState, ctx: &mut StepContext<'_>) {
    let tuning = ctx.tuning;
    let level = world.level();
    let player_position = world.player.pose.position;

    for slot in 0..MAX_ENEMIES {
        if !world.enemies[slot].active {
            continue;
        }

        let offset = player_position - world.enemies[slot].position;
        let raw_distance = offset.length();
        world.enemies[slot].distance = raw_distance;
        let safe_distance = raw_distance.max(MIN_CHASE_DISTANCE);

        if raw_distance > tuning.chase_min_distance && raw_distance <= tuning.aggro_range {
            let step = Vec2::new(
                offset.x / safe_distance * tuning.enemy_speed,
                offset.y / safe_distance * tuning.enemy_speed,
            );
            let mut position = world.enemies[slot].position;
            try_move(level, &mut position, step);
            world.enemies[slot].position = position;
        }

        if raw_distance < tuning.melee_range {
            world.player.health -= tuning.melee_damage;
            let recoil = Vec2::new(
                -offset.x / safe_distance * tuning.knockback,
                -offset.y / safe_distance * tuning.knockback,
            );
            let mut position = world.enemies[slot].position;
            try_move(level, &mut position, recoil);
            world.enemies[slot].position = position;
            debug!(slot, health = world.player.health, "melee_hit");
        }
    }

    if world.player.health <= 0 {
        world.scene = SceneState::GameOver;
        info!(score = world.score, "game_over");
        return;
    }

    if world.mode == GameMode::Arcade && world.active_enemy_count() < tuning.arcade_min_enemies {
        respawn_enemy(world, ctx);
    }
}

/// Activates one free slot at a uniformly chosen empty tile, excluding the
/// player's current cell. Skips the tick when no slot or tile qualifies.
fn respawn_enemy(world: &mut WorldState, ctx: &mut StepContext<'_>) {
    let Some(slot) = world.enemies.iter().position(|enemy| !enemy.active) else {
        return;
    };
    let level = world.level();
    let player_tile = (
        world.player.pose.position.x.floor() as i32,
        world.player.pose.position.y.floor() as i32,
    );

    let mut candidates = Vec::new();
    for y in 0..MAP_HEIGHT as i32 {
        for x in 0..MAP_WIDTH as i32 {
            if (x, y) == player_tile {
                continue;
            }
            if level.is_open(x, y) {
                candidates.push((x, y));
            }
        }
    }
    if candidates.is_empty() {
        return;
    }

    let (x, y) = candidates[ctx.rng.gen_range(0..candidates.len())];
    let position = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
    world.enemies[slot] = Enemy {
        position,
        active: true,
        health: ctx.tuning.enemy_health,
        distance: (position - world.player.pose.position).length(),
    };
    debug!(slot, x, y, "enemy_respawned");
}

fn transition_step(world: &mut WorldState, ctx: &mut StepContext<'_>) {
    world.transition_ticks_left = world.transition_ticks_left.saturating_sub(1);
    if world.transition_ticks_left > 0 {
        return;
    }

    let next_level = world.level_index + 1;
    if next_level < LEVELS.len() {
        world.load_level(next_level, ctx.tuning);
        world.scene = SceneState::Playing;
        info!(level = next_level, "level_started");
    } else {
        world.scene = SceneState::Victory;
        info!(score = world.score, "victory");
    }
}
