//! In-place transforms over ordered point sets.
//!
//! Posing works by mutating point coordinates directly rather than composing
//! deferred matrices, so the order in which transforms are applied is part of
//! a caller's contract. A `PointTransform` value is reusable and cheap to
//! copy.

use super::core::{Point3, Vec3};

/// A single transform step applied in place to an ordered set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointTransform {
    /// `p' = p + v`.
    Translate(Vec3),
    /// Component-wise scale; non-uniform and negative factors are allowed.
    Scale(Vec3),
    /// Rodrigues rotation, counter-clockwise about `axis` (right-hand rule)
    /// around `origin`. The axis is renormalized at application time; a
    /// zero-length axis degenerates to the identity instead of producing
    /// NaNs.
    Rotate {
        axis: Vec3,
        angle: f64,
        origin: Point3,
    },
    /// Display-only pinhole approximation: `x' = x·focal/z`, `y' = y·focal/z`,
    /// z unchanged. Points with z = 0 are left untouched.
    Perspective { focal: f64 },
}

impl PointTransform {
    /// Rotation about the coordinate origin.
    #[must_use]
    pub const fn rotation(axis: Vec3, angle: f64) -> Self {
        Self::Rotate {
            axis,
            angle,
            origin: Point3::ORIGIN,
        }
    }

    /// Uniform scale.
    #[must_use]
    pub const fn uniform_scale(s: f64) -> Self {
        Self::Scale(Vec3::new(s, s, s))
    }

    /// Apply this transform to every point, in place.
    pub fn apply(&self, points: &mut [Point3]) {
        match *self {
            Self::Translate(v) => {
                for p in points {
                    *p = p.add_vec(v);
                }
            }
            Self::Scale(s) => {
                for p in points {
                    *p = Point3::new(p.x * s.x, p.y * s.y, p.z * s.z);
                }
            }
            Self::Rotate {
                axis,
                angle,
                origin,
            } => {
                let Some(m) = rotation_matrix(axis, angle) else {
                    return;
                };
                for p in points {
                    let v = p.sub_point(origin);
                    let rotated = Vec3::new(
                        m[0].dot(v),
                        m[1].dot(v),
                        m[2].dot(v),
                    );
                    *p = origin.add_vec(rotated);
                }
            }
            Self::Perspective { focal } => {
                for p in points {
                    if p.z != 0.0 {
                        p.x = p.x * focal / p.z;
                        p.y = p.y * focal / p.z;
                    }
                }
            }
        }
    }
}

/// Row-major rotation matrix for a counter-clockwise rotation of `angle`
/// radians about `axis`. `None` when the axis cannot be normalized.
#[must_use]
pub fn rotation_matrix(axis: Vec3, angle: f64) -> Option<[Vec3; 3]> {
    let axis = axis.normalized()?;
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let Vec3 { x, y, z } = axis;

    Some([
        Vec3::new(t * x * x + c, t * x * y - s * z, t * x * z + s * y),
        Vec3::new(t * x * y + s * z, t * y * y + c, t * y * z - s * x),
        Vec3::new(t * x * z - s * y, t * y * z + s * x, t * z * z + c),
    ])
}
