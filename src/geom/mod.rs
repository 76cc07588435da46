mod core;
mod transform;

pub use self::core::{Point3, Vec3};
pub use transform::{PointTransform, rotation_matrix};
