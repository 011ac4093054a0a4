use monoray_engine::{Vec2, WorldMap};

pub(crate) const MAP_WIDTH: usize = 16;
pub(crate) const MAP_HEIGHT: usize = 16;

pub(crate) const TILE_EMPTY: u8 = 0;
/// Exit marker: collides like a wall and serves as the HUD compass target.
pub(crate) const TILE_EXIT: u8 = 9;

/// One compiled-in level: the tile grid (0 empty, 1-8 wall textures,
/// 9 exit), the player's start pose, and the enemy spawn table.
pub(crate) struct Level {
    pub(crate) name: &'static str,
    pub(crate) tiles: [[u8; MAP_WIDTH]; MAP_HEIGHT],
    pub(crate) start: Vec2,
    pub(crate) start_angle: f32,
    pub(crate) spawns: &'static [Vec2],
}

impl Level {
    pub(crate) fn tile_code(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= MAP_WIDTH as i32 || y >= MAP_HEIGHT as i32 {
            return None;
        }
        Some(self.tiles[y as usize][x as usize])
    }

    /// Whether actors may occupy the tile. The exit counts as solid; it is
    /// a landmark, not a door.
    pub(crate) fn is_open(&self, x: i32, y: i32) -> bool {
        self.tile_code(x, y) == Some(TILE_EMPTY)
    }

    /// Center of the first exit tile, if the level has one.
    pub(crate) fn exit_position(&self) -> Option<Vec2> {
        for y in 0..MAP_HEIGHT {
            for x in 0..MAP_WIDTH {
                if self.tiles[y][x] == TILE_EXIT {
                    return Some(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                }
            }
        }
        None
    }
}

impl WorldMap for Level {
    fn width(&self) -> u32 {
        MAP_WIDTH as u32
    }

    fn height(&self) -> u32 {
        MAP_HEIGHT as u32
    }

    fn tile(&self, x: i32, y: i32) -> Option<u8> {
        self.tile_code(x, y)
    }
}

/// The campaign, in play order.
pub(crate) static LEVELS: [Level; 3] = [
    Level {
        name: "BUNKER",
        tiles: [
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 2, 2, 2, 2, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 2, 2, 2, 2, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 2, 2, 2, 2, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 2, 2, 2, 2, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 9],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ],
        start: Vec2::new(1.5, 1.5),
        start_angle: 0.0,
        spawns: &[Vec2::new(13.5, 6.5), Vec2::new(3.5, 12.5)],
    },
    Level {
        name: "WARRENS",
        tiles: [
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 3, 3, 3, 3, 0, 3, 3, 3, 3, 0, 3, 3, 3, 3, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 3, 3, 3, 0, 3, 3, 3, 3, 0, 3, 3, 3, 3, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 3, 0, 3, 3, 3, 3, 3, 0, 3, 3, 3, 3, 3, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 9, 1, 1, 1, 1, 1, 1],
        ],
        start: Vec2::new(2.5, 13.5),
        start_angle: -std::f32::consts::FRAC_PI_2,
        spawns: &[
            Vec2::new(13.5, 1.5),
            Vec2::new(8.5, 5.5),
            Vec2::new(3.5, 9.5),
        ],
    },
    Level {
        name: "KEEP",
        tiles: [
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 4, 4, 0, 1],
            [1, 0, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 4, 4, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 2, 2, 0, 0, 2, 2, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 2, 0, 0, 0, 0, 2, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 2, 0, 0, 0, 0, 2, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 2, 2, 0, 0, 2, 2, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 4, 4, 0, 1],
            [1, 0, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 4, 4, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ],
        start: Vec2::new(8.5, 8.5),
        start_angle: std::f32::consts::PI,
        spawns: &[
            Vec2::new(1.5, 1.5),
            Vec2::new(14.5, 1.5),
            Vec2::new(1.5, 14.5),
            Vec2::new(14.5, 14.5),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::types::MAX_ENEMIES;

    #[test]
    fn every_level_is_fully_walled_in() {
        for level in &LEVELS {
            for x in 0..MAP_WIDTH {
                assert_ne!(level.tiles[0][x], TILE_EMPTY, "{}: open north edge", level.name);
                assert_ne!(
                    level.tiles[MAP_HEIGHT - 1][x],
                    TILE_EMPTY,
                    "{}: open south edge",
                    level.name
                );
            }
            for y in 0..MAP_HEIGHT {
                assert_ne!(level.tiles[y][0], TILE_EMPTY, "{}: open west edge", level.name);
                assert_ne!(
                    level.tiles[y][MAP_WIDTH - 1],
                    TILE_EMPTY,
                    "{}: open east edge",
                    level.name
                );
            }
        }
    }

    #[test]
    fn every_start_tile_is_empty_and_inside_the_map() {
        for level in &LEVELS {
            let x = level.start.x.floor() as i32;
            let y = level.start.y.floor() as i32;
            assert!(level.is_open(x, y), "{}: start tile blocked", level.name);
            assert!(level.start_angle.is_finite());
        }
    }

    #[test]
    fn spawn_tables_fit_the_enemy_slots_and_sit_on_empty_tiles() {
        for level in &LEVELS {
            assert!(
                level.spawns.len() <= MAX_ENEMIES,
                "{}: too many spawns",
                level.name
            );
            for spawn in level.spawns {
                let x = spawn.x.floor() as i32;
                let y = spawn.y.floor() as i32;
                assert!(
                    level.is_open(x, y),
                    "{}: spawn ({}, {}) blocked",
                    level.name,
                    spawn.x,
                    spawn.y
                );
            }
        }
    }

    #[test]
    fn every_level_has_an_exit_marker() {
        for level in &LEVELS {
            let exit = level.exit_position();
            assert!(exit.is_some(), "{}: no exit tile", level.name);
        }
    }

    #[test]
    fn tile_code_is_none_outside_the_grid() {
        let level = &LEVELS[0];
        assert_eq!(level.tile_code(-1, 0), None);
        assert_eq!(level.tile_code(0, -1), None);
        assert_eq!(level.tile_code(MAP_WIDTH as i32, 0), None);
        assert_eq!(level.tile_code(0, MAP_HEIGHT as i32), None);
        assert_eq!(level.tile_code(0, 0), Some(1));
    }

    #[test]
    fn exit_tiles_collide_like_walls() {
        for level in &LEVELS {
            let exit = level.exit_position().expect("exit exists");
            assert!(!level.is_open(exit.x.floor() as i32, exit.y.floor() as i32));
        }
    }
}
