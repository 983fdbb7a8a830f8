//! Minimal column-major linear algebra for anchor poses and listener
//! orientation. Only the operations the session crates need are provided;
//! this is not a general-purpose math library.

use serde::{Deserialize, Serialize};

/// 3-component vector, used for locations, offsets, and scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Unit quaternion with imaginary components `i, j, k` and real part `w`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub i: f32,
    pub j: f32,
    pub k: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self {
        i: 0.0,
        j: 0.0,
        k: 0.0,
        w: 1.0,
    };

    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let half = angle * 0.5;
        let s = half.sin();
        Self {
            i: axis.x * s,
            j: axis.y * s,
            k: axis.z * s,
            w: half.cos(),
        }
    }

    /// Rotation by `angle` about the +Y axis.
    pub fn from_yaw(angle: f32) -> Self {
        Self::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), angle)
    }

    /// Row `r`, column `c` entries of the equivalent 3x3 rotation matrix.
    fn rotation_entries(self) -> [[f32; 3]; 3] {
        let Self { i, j, k, w } = self;
        [
            [
                1.0 - 2.0 * (j * j + k * k),
                2.0 * (i * j - k * w),
                2.0 * (i * k + j * w),
            ],
            [
                2.0 * (i * j + k * w),
                1.0 - 2.0 * (i * i + k * k),
                2.0 * (j * k - i * w),
            ],
            [
                2.0 * (i * k - j * w),
                2.0 * (j * k + i * w),
                1.0 - 2.0 * (i * i + j * j),
            ],
        ]
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 4x4 transform stored as four columns, matching the column-vector
/// convention of the pose providers: `cols[3]` is the translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_translation(translation: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.set_translation(translation);
        m
    }

    /// Embed a 3x3 rotation given in row-major order. Motion-sensor
    /// attitude samples arrive as row-major rotation matrices; the columns
    /// of the result are the rows of the input.
    pub fn from_rotation_rows(rows: [[f32; 3]; 3]) -> Self {
        let mut m = Self::IDENTITY;
        for c in 0..3 {
            for r in 0..3 {
                m.cols[c][r] = rows[r][c];
            }
        }
        m
    }

    /// Compose translation, rotation, and per-axis scale into one
    /// transform (scale first, then rotation, then translation).
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let rot = rotation.rotation_entries();
        let scale = [scale.x, scale.y, scale.z];
        let mut m = Self::IDENTITY;
        for c in 0..3 {
            for r in 0..3 {
                m.cols[c][r] = rot[r][c] * scale[c];
            }
        }
        m.set_translation(translation);
        m
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.cols[3][0], self.cols[3][1], self.cols[3][2])
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.cols[3][0] = translation.x;
        self.cols[3][1] = translation.y;
        self.cols[3][2] = translation.z;
    }

    /// Length of each basis column; recovers the per-axis scale of a
    /// transform built from [`Mat4::from_trs`].
    pub fn basis_scale(&self) -> Vec3 {
        let axis = |c: usize| Vec3::new(self.cols[c][0], self.cols[c][1], self.cols[c][2]).length();
        Vec3::new(axis(0), axis(1), axis(2))
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = Self {
            cols: [[0.0; 4]; 4],
        };
        for c in 0..4 {
            for r in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.cols[k][r] * rhs.cols[c][k];
                }
                out.cols[c][r] = sum;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{Mat4, Quat, Vec3};

    #[test]
    fn identity_multiplication_is_neutral() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m * Mat4::IDENTITY, m);
        assert_eq!(Mat4::IDENTITY * m, m);
    }

    #[test]
    fn translations_compose_by_addition() {
        let a = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let b = Mat4::from_translation(Vec3::new(0.0, 2.0, 5.0));
        let composed = a * b;
        assert_eq!(composed.translation(), Vec3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn trs_transform_recovers_translation_and_scale() {
        let m = Mat4::from_trs(
            Vec3::new(4.0, 5.0, 6.0),
            Quat::from_yaw(1.2),
            Vec3::new(0.25, 1.0, 0.5),
        );
        assert_eq!(m.translation(), Vec3::new(4.0, 5.0, 6.0));
        let scale = m.basis_scale();
        assert!((scale.x - 0.25).abs() < 1e-5);
        assert!((scale.y - 1.0).abs() < 1e-5);
        assert!((scale.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn rotation_rows_are_transposed_into_columns() {
        let rows = [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let m = Mat4::from_rotation_rows(rows);
        assert_eq!(m.cols[0][1], -1.0);
        assert_eq!(m.cols[1][0], 1.0);
        assert_eq!(m.cols[3][3], 1.0);
    }

    #[test]
    fn yaw_quaternion_rotates_x_axis_toward_negative_z() {
        let m = Mat4::from_trs(
            Vec3::ZERO,
            Quat::from_yaw(std::f32::consts::FRAC_PI_2),
            Vec3::ONE,
        );
        // Column 0 is the image of the +X basis vector.
        assert!(m.cols[0][0].abs() < 1e-6);
        assert!((m.cols[0][2] - -1.0).abs() < 1e-6);
    }
}
