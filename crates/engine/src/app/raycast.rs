use super::geometry::{Pose, Vec2};
use super::rendering::{FrameBuffer, Pattern, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Read-only grid access for the caster. `tile` returns `None` outside the
/// map, which terminates any ray touching the edge: the caster cannot
/// index out of range by construction.
pub trait WorldMap {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn tile(&self, x: i32, y: i32) -> Option<u8>;
}

/// Rays further than this report a miss; also the depth assigned to
/// columns with no wall in range.
pub const MAX_RENDER_DISTANCE: f32 = 16.0;

pub const SPRITE_SIZE: usize = 16;

/// Sprites at or behind the camera plane are rejected before projection.
const BEHIND_CAMERA_EPSILON: f32 = 1e-4;

/// Distance thresholds for the dither buckets.
const DIST_SOLID: f32 = 4.0;
const DIST_CHECKER: f32 = 8.0;

/// Walls closer than this clamp, keeping projected heights finite.
const MIN_WALL_DISTANCE: f32 = 1e-3;

pub type DepthBuffer = [f32; DISPLAY_WIDTH];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnHit {
    pub perp_distance: f32,
    pub tile: u8,
    pub side: Side,
}

/// Result of a single hitscan ray. A miss (max distance exceeded or the
/// ray left the map) carries `tile: None` and the full cast distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub tile: Option<u8>,
}

/// One billboard to project. `distance` is the caller's cached distance to
/// the viewer, used only for far-to-near ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteView {
    pub position: Vec2,
    pub distance: f32,
}

fn delta_distance(component: f32) -> f32 {
    if component == 0.0 {
        f32::INFINITY
    } else {
        (1.0 / component).abs()
    }
}

/// DDA grid walk: advance to the next grid boundary on whichever axis is
/// nearer until a tile with code > 0 is hit, the travelled distance
/// exceeds `max_distance`, or the walk leaves the map.
fn cast(map: &impl WorldMap, origin: Vec2, ray_dir: Vec2, max_distance: f32) -> Option<ColumnHit> {
    let mut map_x = origin.x.floor() as i32;
    let mut map_y = origin.y.floor() as i32;

    let delta_x = delta_distance(ray_dir.x);
    let delta_y = delta_distance(ray_dir.y);

    let (step_x, mut side_dist_x) = if ray_dir.x < 0.0 {
        (-1, (origin.x - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - origin.x) * delta_x)
    };
    let (step_y, mut side_dist_y) = if ray_dir.y < 0.0 {
        (-1, (origin.y - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - origin.y) * delta_y)
    };

    loop {
        let (travelled, side) = if side_dist_x < side_dist_y {
            let travelled = side_dist_x;
            side_dist_x += delta_x;
            map_x += step_x;
            (travelled, Side::X)
        } else {
            let travelled = side_dist_y;
            side_dist_y += delta_y;
            map_y += step_y;
            (travelled, Side::Y)
        };

        if travelled > max_distance {
            return None;
        }

        let tile = map.tile(map_x, map_y)?;
        if tile > 0 {
            let perp_distance = match side {
                Side::X => (map_x as f32 - origin.x + (1 - step_x) as f32 / 2.0) / ray_dir.x,
                Side::Y => (map_y as f32 - origin.y + (1 - step_y) as f32 / 2.0) / ray_dir.y,
            };
            return Some(ColumnHit {
                perp_distance,
                tile,
                side,
            });
        }
    }
}

/// Casts one ray from `origin` along `dir` rotated by `angle_offset`.
/// Used by combat for "what is directly ahead" queries.
pub fn cast_ray(
    map: &impl WorldMap,
    origin: Vec2,
    dir: Vec2,
    angle_offset: f32,
    max_distance: f32,
) -> RayHit {
    let ray_dir = if angle_offset == 0.0 {
        dir
    } else {
        dir.rotated(angle_offset)
    };
    match cast(map, origin, ray_dir, max_distance) {
        Some(hit) => RayHit {
            distance: hit.perp_distance,
            tile: Some(hit.tile),
        },
        None => RayHit {
            distance: max_distance,
            tile: None,
        },
    }
}

/// Casts the wall pass for a single screen column without drawing.
pub fn cast_column(map: &impl WorldMap, pose: &Pose, column: usize) -> Option<ColumnHit> {
    let camera_x = 2.0 * column as f32 / DISPLAY_WIDTH as f32 - 1.0;
    let ray_dir = Vec2::new(
        pose.dir.x + pose.plane.x * camera_x,
        pose.dir.y + pose.plane.y * camera_x,
    );
    cast(map, pose.position, ray_dir, MAX_RENDER_DISTANCE)
}

/// Full wall pass: one ray per screen column, wall slices drawn with the
/// distance-derived dither pattern, perpendicular distances recorded in
/// the depth buffer for sprite occlusion. Columns with no hit keep the
/// max render distance as their depth.
pub fn render_walls(
    map: &impl WorldMap,
    pose: &Pose,
    frame: &mut FrameBuffer,
    depth: &mut DepthBuffer,
) {
    let half_height = DISPLAY_HEIGHT as i32 / 2;
    for column in 0..DISPLAY_WIDTH {
        depth[column] = MAX_RENDER_DISTANCE;
        let Some(hit) = cast_column(map, pose, column) else {
            continue;
        };

        let perp_distance = hit.perp_distance.max(MIN_WALL_DISTANCE);
        depth[column] = perp_distance;

        let line_height = (DISPLAY_HEIGHT as f32 / perp_distance) as i32;
        let draw_start = half_height - line_height / 2;
        let draw_end = half_height + line_height / 2;
        frame.draw_vline(
            column as i32,
            draw_start,
            draw_end,
            wall_pattern(perp_distance, hit.side),
        );
    }
}

/// Near walls render solid, mid checkered, far sparse; Y-side hits are
/// pushed one step darker for cheap side shading.
fn wall_pattern(distance: f32, side: Side) -> Pattern {
    const LADDER: [Pattern; 4] = [
        Pattern::Solid,
        Pattern::Checker,
        Pattern::Stripes,
        Pattern::Sparse,
    ];
    let mut level: usize = if distance <= DIST_SOLID {
        0
    } else if distance <= DIST_CHECKER {
        1
    } else {
        3
    };
    if side == Side::Y {
        level = (level + 1).min(LADDER.len() - 1);
    }
    LADDER[level]
}

/// 16x16 1-bit billboard bitmap, one row per entry, MSB = leftmost texel.
static ENEMY_BITMAP: [u16; SPRITE_SIZE] = [
    0b0000_0011_1100_0000,
    0b0000_1111_1111_0000,
    0b0001_1111_1111_1000,
    0b0011_1111_1111_1100,
    0b0011_1001_1001_1100,
    0b0011_1001_1001_1100,
    0b0111_1111_1111_1110,
    0b0111_1111_1111_1110,
    0b0111_1011_1101_1110,
    0b0011_1111_1111_1100,
    0b0001_1111_1111_1000,
    0b0000_1111_1111_0000,
    0b0000_0110_0110_0000,
    0b0000_0110_0110_0000,
    0b0000_1100_0011_0000,
    0b0001_1000_0001_1000,
];

fn texel(x: i32, y: i32) -> bool {
    let x = x.clamp(0, SPRITE_SIZE as i32 - 1) as usize;
    let y = y.clamp(0, SPRITE_SIZE as i32 - 1) as usize;
    ENEMY_BITMAP[y] & (0x8000 >> x) != 0
}

/// Sprite pass: projects each billboard into camera space and draws the
/// columns that pass the per-column depth test. Sprites draw far to near
/// using the caller-provided distances so closer ones overdraw.
pub fn render_sprites(
    sprites: &[SpriteView],
    pose: &Pose,
    frame: &mut FrameBuffer,
    depth: &DepthBuffer,
) {
    let mut order: Vec<usize> = (0..sprites.len()).collect();
    order.sort_by(|a, b| sprites[*b].distance.total_cmp(&sprites[*a].distance));
    for index in order {
        draw_sprite(sprites[index].position, pose, frame, depth);
    }
}

fn draw_sprite(position: Vec2, pose: &Pose, frame: &mut FrameBuffer, depth: &DepthBuffer) {
    let rel = position - pose.position;

    // Inverse of the [plane dir] column basis.
    let det = pose.plane.x * pose.dir.y - pose.dir.x * pose.plane.y;
    if det.abs() < f32::EPSILON {
        return;
    }
    let inv_det = 1.0 / det;
    let transform_x = inv_det * (pose.dir.y * rel.x - pose.dir.x * rel.y);
    let transform_y = inv_det * (-pose.plane.y * rel.x + pose.plane.x * rel.y);

    if transform_y <= BEHIND_CAMERA_EPSILON {
        return;
    }

    let screen_x = ((DISPLAY_WIDTH as f32 / 2.0) * (1.0 + transform_x / transform_y)) as i32;
    let size = (DISPLAY_HEIGHT as f32 / transform_y) as i32;
    if size <= 0 {
        return;
    }
    let half = size / 2;
    let center_y = DISPLAY_HEIGHT as i32 / 2;
    let left = screen_x - half;
    let top = center_y - half;

    let first_column = left.max(0);
    let last_column = (left + size).min(DISPLAY_WIDTH as i32);
    let first_row = top.max(0);
    let last_row = (top + size).min(DISPLAY_HEIGHT as i32);

    for column in first_column..last_column {
        if transform_y >= depth[column as usize] {
            continue;
        }
        let tex_x = (column - left) * SPRITE_SIZE as i32 / size;
        for row in first_row..last_row {
            let tex_y = (row - top) * SPRITE_SIZE as i32 / size;
            if texel(tex_x, tex_y) {
                frame.set_pixel(column, row, true);
            }
        }
    }
}
