use monoray_engine::{Pose, Vec2};
use serde::Deserialize;

use super::levels::{Level, LEVELS};

/// Fixed size of the enemy slot array; levels may populate fewer.
pub(crate) const MAX_ENEMIES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SceneState {
    Menu,
    Playing,
    LevelTransition,
    GameOver,
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GameMode {
    Classic,
    Arcade,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Player {
    pub(crate) pose: Pose,
    pub(crate) health: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) position: Vec2,
    pub(crate) active: bool,
    pub(crate) health: i32,
    /// Distance to the player, cached by the AI pass for sprite ordering.
    pub(crate) distance: f32,
}

impl Enemy {
    pub(crate) const fn empty_slot() -> Self {
        Self {
            position: Vec2::ZERO,
            active: false,
            health: 0,
            distance: 0.0,
        }
    }
}

/// Numeric tuning. Defaults mirror the original hardware build; a JSON
/// config file can override any subset of fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Tuning {
    pub(crate) dead_zone: f32,
    /// Radians per logic tick at full stick deflection.
    pub(crate) rotation_speed: f32,
    /// Tiles per logic tick at full stick deflection.
    pub(crate) move_speed: f32,
    pub(crate) fov_scale: f32,
    pub(crate) player_health: i32,
    pub(crate) enemy_health: i32,
    pub(crate) combat_range: f32,
    /// Radians of facing error a shot still connects within.
    pub(crate) facing_tolerance: f32,
    pub(crate) score_bonus: u32,
    /// Tiles per AI tick.
    pub(crate) enemy_speed: f32,
    pub(crate) chase_min_distance: f32,
    pub(crate) aggro_range: f32,
    pub(crate) melee_range: f32,
    pub(crate) melee_damage: i32,
    pub(crate) knockback: f32,
    /// The AI pass runs every N-th logic tick.
    pub(crate) ai_tick_divider: u64,
    /// Arcade mode respawns toward this population floor.
    pub(crate) arcade_min_enemies: usize,
    /// Length of the level-clear countdown in logic ticks.
    pub(crate) transition_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            dead_zone: 0.15,
            rotation_speed: 0.06,
            move_speed: 0.10,
            fov_scale: 0.66,
            player_health: 100,
            enemy_health: 3,
            combat_range: 8.0,
            facing_tolerance: 0.25,
            score_bonus: 100,
            enemy_speed: 0.15,
            chase_min_distance: 0.5,
            aggro_range: 12.0,
            melee_range: 0.6,
            melee_damage: 5,
            knockback: 0.5,
            ai_tick_divider: 5,
            arcade_min_enemies: 3,
            transition_ticks: 250,
        }
    }
}

/// The single shared world instance. The logic task is the only writer;
/// the render task reads whole frames under the same lock.
pub(crate) struct WorldState {
    pub(crate) scene: SceneState,
    pub(crate) mode: GameMode,
    pub(crate) menu_cursor: GameMode,
    pub(crate) level_index: usize,
    pub(crate) player: Player,
    pub(crate) score: u32,
    pub(crate) high_score: u32,
    pub(crate) transition_ticks_left: u32,
    pub(crate) enemies: [Enemy; MAX_ENEMIES],
    /// Previous tick's fire level; confirmation actions trigger on the
    /// rising edge only.
    pub(crate) was_firing: bool,
    pub(crate) logic_tick: u64,
    pub(crate) hit_marker_ticks: u32,
}

impl WorldState {
    pub(crate) fn new(high_score: u32, tuning: &Tuning) -> Self {
        let mut world = Self {
            scene: SceneState::Menu,
            mode: GameMode::Classic,
            menu_cursor: GameMode::Classic,
            level_index: 0,
            player: Player {
                pose: Pose::from_angle(Vec2::ZERO, 0.0, tuning.fov_scale),
                health: tuning.player_health,
            },
            score: 0,
            high_score,
            transition_ticks_left: 0,
            enemies: [Enemy::empty_slot(); MAX_ENEMIES],
            was_firing: false,
            logic_tick: 0,
            hit_marker_ticks: 0,
        };
        world.load_level(0, tuning);
        world
    }

    pub(crate) fn level(&self) -> &'static Level {
        &LEVELS[self.level_index]
    }

    /// Resets the player pose and health and repopulates the enemy slots
    /// from the level's spawn table. Loading the same index twice yields
    /// identical state.
    pub(crate) fn load_level(&mut self, level_index: usize, tuning: &Tuning) {
        self.level_index = if level_index < LEVELS.len() {
            level_index
        } else {
            0
        };
        let level = &LEVELS[self.level_index];

        self.player = Player {
            pose: Pose::from_angle(level.start, level.start_angle, tuning.fov_scale),
            health: tuning.player_health,
        };

        self.enemies = [Enemy::empty_slot(); MAX_ENEMIES];
        for (slot, spawn) in level.spawns.iter().take(MAX_ENEMIES).enumerate() {
            self.enemies[slot] = Enemy {
                position: *spawn,
                active: true,
                health: tuning.enemy_health,
                distance: (*spawn - level.start).length(),
            };
        }
    }

    /// Begins a fresh run in the given mode from level zero.
    pub(crate) fn start_run(&mut self, mode: GameMode, tuning: &Tuning) {
        self.mode = mode;
        self.score = 0;
        self.scene = SceneState::Playing;
        self.transition_ticks_left = 0;
        self.logic_tick = 0;
        self.hit_marker_ticks = 0;
        self.load_level(0, tuning);
    }

    pub(crate) fn active_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|enemy| enemy.active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_starts_in_the_menu_with_level_zero_loaded() {
        let tuning = Tuning::default();
        let world = WorldState::new(1234, &tuning);

        assert_eq!(world.scene, SceneState::Menu);
        assert_eq!(world.high_score, 1234);
        assert_eq!(world.level_index, 0);
        assert_eq!(world.active_enemy_count(), LEVELS[0].spawns.len());
        assert_eq!(world.player.health, tuning.player_health);
    }

    #[test]
    fn load_level_is_idempotent() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(0, &tuning);

        world.load_level(1, &tuning);
        let first_player = world.player;
        let first_enemies = world.enemies;

        // Perturb, then reload the same index.
        world.player.health = 1;
        world.player.pose.position = Vec2::new(9.0, 9.0);
        world.enemies[0].active = false;
        world.enemies[1].health = 0;

        world.load_level(1, &tuning);
        assert_eq!(world.player, first_player);
        assert_eq!(world.enemies, first_enemies);
    }

    #[test]
    fn load_level_wraps_out_of_range_indices_to_zero() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(0, &tuning);
        world.load_level(LEVELS.len(), &tuning);
        assert_eq!(world.level_index, 0);
    }

    #[test]
    fn load_level_caps_population_at_the_slot_count() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(0, &tuning);
        for index in 0..LEVELS.len() {
            world.load_level(index, &tuning);
            assert!(world.active_enemy_count() <= MAX_ENEMIES);
            assert_eq!(world.active_enemy_count(), LEVELS[index].spawns.len());
        }
    }

    #[test]
    fn start_run_resets_score_and_enters_playing() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(500, &tuning);
        world.score = 900;
        world.start_run(GameMode::Arcade, &tuning);

        assert_eq!(world.scene, SceneState::Playing);
        assert_eq!(world.mode, GameMode::Arcade);
        assert_eq!(world.score, 0);
        assert_eq!(world.level_index, 0);
        // Beating the old high score is still pending, not reset.
        assert_eq!(world.high_score, 500);
    }

    #[test]
    fn loaded_pose_preserves_the_plane_invariant() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(0, &tuning);
        for index in 0..LEVELS.len() {
            world.load_level(index, &tuning);
            let pose = world.player.pose;
            let dot = pose.dir.x * pose.plane.x + pose.dir.y * pose.plane.y;
            assert!(dot.abs() < 1e-5);
            assert!((pose.plane.length() - tuning.fov_scale).abs() < 1e-5);
        }
    }
}
