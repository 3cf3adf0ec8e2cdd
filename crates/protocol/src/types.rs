use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point or direction in scene space (1 unit = 10 cm).
///
/// Serializes as a plain `[x, y, z]` array so view registries and scene
/// dumps stay readable on the JS side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const NEG_Z: Vec3 = Vec3::new(0.0, 0.0, -1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn try_normalize(self) -> Option<Vec3> {
        let len = self.length();
        if len > 1e-12 && len.is_finite() {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    /// Componentwise linear interpolation: `a + (b - a) * t`.
    pub fn lerp(a: Vec3, b: Vec3, t: f64) -> Vec3 {
        a + (b - a) * t
    }

    /// Rotate by intrinsic XYZ Euler angles in radians (matrix `Rx·Ry·Rz`,
    /// so the Z rotation is applied to the vector first).
    pub fn rotate_euler(self, euler: Vec3) -> Vec3 {
        let (sx, cx) = euler.x.sin_cos();
        let (sy, cy) = euler.y.sin_cos();
        let (sz, cz) = euler.z.sin_cos();

        let v = Vec3::new(self.x * cz - self.y * sz, self.x * sz + self.y * cz, self.z);
        let v = Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);
        Vec3::new(v.x, v.y * cx - v.z * sx, v.y * sx + v.z * cx)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Vec3::new(x, y, z)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// A camera pose: where the eye is and the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub target: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` (leading `#` optional). Returns `None` for anything
    /// else; hardware tables are author-controlled so callers fall back to a
    /// neutral color rather than failing.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Like [`Color::from_hex`] but substitutes mid gray for malformed input.
    pub fn hex_or_gray(hex: &str) -> Self {
        Self::from_hex(hex).unwrap_or(Self::rgb(0.5, 0.5, 0.5))
    }

    /// HSL with every component in `[0, 1]` (hue wraps).
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            let v = l as f32;
            return Self::rgb(v, v, v);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let hue = |t: f64| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            v as f32
        };
        Self::rgb(hue(h + 1.0 / 3.0), hue(h), hue(h - 1.0 / 3.0))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_hex(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}
