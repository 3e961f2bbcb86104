//! Small 3D value types: vectors, Euler rotations, transforms, colours.

use std::ops::{Add, Mul, Sub};

// ════════════════════════════════════════════════════════════════════════════
// Vec3
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const UP:   Vec3 = Vec3::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub fn dot(self, o: Vec3) -> f32 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Vec3) -> Vec3 {
        Vec3::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, o: Vec3) -> f32 {
        (self - o).length()
    }

    pub fn normalized(self) -> Vec3 {
        let l = self.length();
        if l < 1e-9 { self } else { self * (1.0 / l) }
    }

    /// Rotate about the world Y axis.
    pub fn rotate_y(self, angle: f32) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(c * self.x + s * self.z, self.y, -s * self.x + c * self.z)
    }

    pub fn rotate_x(self, angle: f32) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x, c * self.y - s * self.z, s * self.y + c * self.z)
    }

    pub fn rotate_z(self, angle: f32) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(c * self.x - s * self.y, s * self.x + c * self.y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 { Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z) }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 { Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z) }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 { Vec3::new(self.x * s, self.y * s, self.z * s) }
}

// ════════════════════════════════════════════════════════════════════════════
// Euler
// ════════════════════════════════════════════════════════════════════════════

/// Axis order in which an [`Euler`] is composed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EulerOrder {
    #[default]
    Xyz,
    Yxz,
}

/// Intrinsic Euler rotation in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Euler {
    pub x:     f32,
    pub y:     f32,
    pub z:     f32,
    pub order: EulerOrder,
}

impl Euler {
    pub const IDENTITY: Euler = Euler { x: 0.0, y: 0.0, z: 0.0, order: EulerOrder::Xyz };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Euler { x, y, z, order: EulerOrder::Xyz }
    }

    pub const fn with_order(x: f32, y: f32, z: f32, order: EulerOrder) -> Self {
        Euler { x, y, z, order }
    }

    /// Apply the rotation to a vector (the matrix for order `XYZ` is
    /// `Rx·Ry·Rz`, for `YXZ` it is `Ry·Rx·Rz`).
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let v = v.rotate_z(self.z);
        match self.order {
            EulerOrder::Xyz => v.rotate_y(self.y).rotate_x(self.x),
            EulerOrder::Yxz => v.rotate_x(self.x).rotate_y(self.y),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transform
// ════════════════════════════════════════════════════════════════════════════

/// Position, rotation and uniform scale of one scene item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Euler,
    pub scale:    f32,
}

impl Default for Transform {
    fn default() -> Self {
        Transform { position: Vec3::ZERO, rotation: Euler::IDENTITY, scale: 1.0 }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Euler, scale: f32) -> Self {
        Transform { position, rotation, scale }
    }

    /// Map a point from this transform's local space into its parent.
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation.rotate(local * self.scale)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Color
// ════════════════════════════════════════════════════════════════════════════

/// Linear RGB colour, components 0.0–1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    /// From a packed `0xRRGGBB` value.
    pub fn from_hex(rgb: u32) -> Self {
        Color {
            r: ((rgb >> 16) & 0xFF) as f32 / 255.0,
            g: ((rgb >>  8) & 0xFF) as f32 / 255.0,
            b: ( rgb        & 0xFF) as f32 / 255.0,
        }
    }

    /// Packed ARGB with opaque alpha.
    pub fn to_argb(self) -> u32 {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        0xFF000000 | (c(self.r) << 16) | (c(self.g) << 8) | c(self.b)
    }

    /// HSV → RGB, hue in degrees.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h  = h.rem_euclid(360.0);
        let hi = (h / 60.0) as u32;
        let f  = h / 60.0 - hi as f32;
        let p  = v * (1.0 - s);
        let q  = v * (1.0 - s * f);
        let t  = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match hi {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Color::new(r, g, b)
    }
}
