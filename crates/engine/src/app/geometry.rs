use std::f32::consts::{PI, TAU};
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Angle of this vector in radians, in (-PI, PI].
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        rotate_by(self, sin, cos)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Normalizes an angle into (-PI, PI].
pub fn normalize_angle(angle: f32) -> f32 {
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    }
    if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

/// A viewpoint in the map: world position, unit facing direction, and the
/// camera plane spanning the horizontal field of view.
///
/// The plane is always the facing direction rotated a quarter turn and
/// scaled by the FOV factor; `rotate` applies one rotation to both vectors
/// so the invariant survives every update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec2,
    pub dir: Vec2,
    pub plane: Vec2,
}

impl Pose {
    pub fn from_angle(position: Vec2, angle: f32, fov_scale: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            position,
            dir: Vec2::new(cos, sin),
            plane: Vec2::new(-fov_scale * sin, fov_scale * cos),
        }
    }

    pub fn rotate(&mut self, delta: f32) {
        let (sin, cos) = delta.sin_cos();
        self.dir = rotate_by(self.dir, sin, cos);
        self.plane = rotate_by(self.plane, sin, cos);
    }

    pub fn facing_angle(&self) -> f32 {
        self.dir.angle()
    }
}

fn rotate_by(v: Vec2, sin: f32, cos: f32) -> Vec2 {
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
