// ── 4x4 matrix ────────────────────────────────────────────────────────────────
//
// Pure value type, no global state.  Storage and conventions follow the
// fixed-function pipeline this replaces:
//   • column-major, `m[col * 4 + row]`, so `to_cols_array()` can be uploaded
//     to a shader uniform as-is;
//   • angles in degrees (glRotate);
//   • `rotate` / `translate` / `scale` post-multiply (`M = M · X`).

use std::fmt;
use std::ops::{Index, Mul};

/// A homogeneous 4-component vector `[x, y, z, w]`.
pub type Vec4 = [f32; 4];

/// A 4x4 column-major matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat4 {
    m: [f32; 16],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, //
        ],
    };

    /// A 4x4 matrix with all elements set to 0.
    pub const ZERO: Self = Self { m: [0.0; 16] };

    /// Builds a matrix from 16 column-major floats.
    #[inline]
    pub const fn from_cols_array(m: &[f32; 16]) -> Self {
        Self { m: *m }
    }

    /// The 16 column-major floats.
    #[inline]
    pub const fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }

    /// Element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    /// Row `index` as `[c0, c1, c2, c3]`.
    #[inline]
    pub fn row(&self, index: usize) -> Vec4 {
        [
            self.m[index],
            self.m[index + 4],
            self.m[index + 8],
            self.m[index + 12],
        ]
    }

    // ── Constructors ──────────────────────────────────────────────────────────

    /// Rotation of `angle_degrees` around the axis `(x, y, z)`, as built by
    /// `glRotatef`.
    ///
    /// The axis is normalised first.  A zero-length axis has no direction to
    /// rotate around and yields the identity.
    pub fn from_rotation_deg(angle_degrees: f32, x: f32, y: f32, z: f32) -> Self {
        let len = (x * x + y * y + z * z).sqrt();
        if len == 0.0 {
            return Self::IDENTITY;
        }
        let (x, y, z) = (x / len, y / len, z / len);

        let (s, c) = f64::from(angle_degrees).to_radians().sin_cos();
        let (s, c) = (s as f32, c as f32);
        let t = 1.0 - c;

        Self {
            m: [
                // column 0
                x * x * t + c,
                y * x * t + z * s,
                x * z * t - y * s,
                0.0,
                // column 1
                x * y * t - z * s,
                y * y * t + c,
                y * z * t + x * s,
                0.0,
                // column 2
                x * z * t + y * s,
                y * z * t - x * s,
                z * z * t + c,
                0.0,
                // column 3
                0.0,
                0.0,
                0.0,
                1.0,
            ],
        }
    }

    /// Translation by `(x, y, z)`.
    #[inline]
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.m[12] = x;
        m.m[13] = y;
        m.m[14] = z;
        m
    }

    /// Non-uniform scale.
    #[inline]
    pub fn from_scale(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.m[0] = x;
        m.m[5] = y;
        m.m[10] = z;
        m
    }

    /// Orthographic projection, identical to `glOrtho(left, right, bottom,
    /// top, near, far)`.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let mut m = Self::ZERO;
        m.m[0] = 2.0 / (right - left);
        m.m[5] = 2.0 / (top - bottom);
        m.m[10] = -2.0 / (far - near);
        m.m[12] = -(right + left) / (right - left);
        m.m[13] = -(top + bottom) / (top - bottom);
        m.m[14] = -(far + near) / (far - near);
        m.m[15] = 1.0;
        m
    }

    /// Perspective projection, identical to `glFrustum`.
    ///
    /// Takes `f64` like the GL entry point; the terms are evaluated in double
    /// precision and rounded once.
    pub fn frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        let mut m = Self::ZERO;
        m.m[0] = ((2.0 * near) / (right - left)) as f32;
        m.m[5] = ((2.0 * near) / (top - bottom)) as f32;
        m.m[8] = ((right + left) / (right - left)) as f32;
        m.m[9] = ((top + bottom) / (top - bottom)) as f32;
        m.m[10] = (-(far + near) / (far - near)) as f32;
        m.m[11] = -1.0;
        m.m[14] = (-2.0 * (far * near) / (far - near)) as f32;
        m
    }

    // ── In-place transforms ───────────────────────────────────────────────────

    /// `M = M · R(angle, axis)`.
    #[inline]
    pub fn rotate(&mut self, angle_degrees: f32, x: f32, y: f32, z: f32) {
        *self = *self * Self::from_rotation_deg(angle_degrees, x, y, z);
    }

    /// `M = M · T(x, y, z)`.
    ///
    /// Only column 3 changes, so this is done without a full product.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        let m = &mut self.m;
        m[12] += m[0] * x + m[4] * y + m[8] * z;
        m[13] += m[1] * x + m[5] * y + m[9] * z;
        m[14] += m[2] * x + m[6] * y + m[10] * z;
        m[15] += m[3] * x + m[7] * y + m[11] * z;
    }

    /// `M = M · S(x, y, z)`: columns 0, 1 and 2 are scaled.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        for (col, factor) in [x, y, z].into_iter().enumerate() {
            for v in &mut self.m[col * 4..col * 4 + 4] {
                *v *= factor;
            }
        }
    }

    // ── Vector transforms ─────────────────────────────────────────────────────

    /// `M · v`.
    #[inline]
    pub fn transform_vec4(&self, v: Vec4) -> Vec4 {
        let m = &self.m;
        [
            m[0] * v[0] + m[4] * v[1] + m[8] * v[2] + m[12] * v[3],
            m[1] * v[0] + m[5] * v[1] + m[9] * v[2] + m[13] * v[3],
            m[2] * v[0] + m[6] * v[1] + m[10] * v[2] + m[14] * v[3],
            m[3] * v[0] + m[7] * v[1] + m[11] * v[2] + m[15] * v[3],
        ]
    }

    /// `M · (x, y, z, 1)`.
    #[inline]
    pub fn transform_point(&self, x: f32, y: f32, z: f32) -> Vec4 {
        self.transform_vec4([x, y, z, 1.0])
    }
}

impl Default for Mat4 {
    /// Returns the 4x4 identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Index<usize> for Mat4 {
    type Output = f32;

    /// Column-major element access.
    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.m[index]
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;

    /// Standard matrix product `self · rhs`.  Not commutative.
    fn mul(self, rhs: Mat4) -> Self {
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = (0..4)
                    .map(|k| self.m[k * 4 + row] * rhs.m[col * 4 + k])
                    .sum();
            }
        }
        Self { m: out }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, rhs: Vec4) -> Vec4 {
        self.transform_vec4(rhs)
    }
}

impl fmt::Display for Mat4 {
    /// Four rows, one per line: `  [1.000 0.000 0.000 0.000]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..4 {
            let [a, b, c, d] = self.row(i);
            writeln!(f, "  [{a:5.3} {b:5.3} {c:5.3} {d:5.3}]")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
