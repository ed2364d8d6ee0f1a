//! 2D vector arithmetic for positions, velocities and headings.
//!
//! The in-place helpers (`add`, `sub`, `scale`, `normalize`) mutate the
//! receiver and return it for chaining. `Vec2` is `Copy`: callers that need
//! the original intact work on a copy (`let mut v = pos;`).

use serde::{Deserialize, Serialize};

/// Lengths below this are treated as zero by `normalize`.
pub const NORMALIZE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Project a 3D point onto the horizontal ground plane.
    /// Height (`y` in a y-up world) is discarded; `z` becomes the second axis.
    pub fn from_horizontal(x: f64, _height: f64, z: f64) -> Self {
        Self { x, y: z }
    }

    pub fn add(&mut self, other: Vec2) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self
    }

    pub fn sub(&mut self, other: Vec2) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self
    }

    pub fn scale(&mut self, s: f64) -> &mut Self {
        self.x *= s;
        self.y *= s;
        self
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn length_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Scale to unit length. Vectors shorter than `NORMALIZE_EPSILON`
    /// become exactly zero instead of dividing by a near-zero length.
    pub fn normalize(&mut self) -> &mut Self {
        let len = self.length();
        if len > NORMALIZE_EPSILON {
            self.scale(1.0 / len);
        } else {
            *self = Vec2::ZERO;
        }
        self
    }

    /// Copying counterpart of `normalize`.
    pub fn normalized(self) -> Vec2 {
        let mut v = self;
        v.normalize();
        v
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(a: Vec2, b: Vec2) -> f64 {
        (a.x - b.x).hypot(a.y - b.y)
    }

    pub fn distance_sq(a: Vec2, b: Vec2) -> f64 {
        let mut d = a;
        d.sub(b).length_sq()
    }
}
