//! Math utilities and types
//!
//! Provides the vector and rotation types used to place pooled objects.

pub use nalgebra::{
    Vector3,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Spawn placement of a pooled object: where it is and which way it faces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Position in world space
    pub position: Vec3,

    /// Orientation quaternion
    pub orientation: Quat,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
        }
    }
}

impl Placement {
    /// Create a placement from a position and orientation
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Unit vector the placement faces along (local -Z)
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::new(0.0, 0.0, -1.0)
    }
}
