//! Presentation poses: the numeric state a renderer maps onto its own instances.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Height used to park retired instances far below the world.
pub const HIDDEN_Y: f32 = -9999.0;

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Upright pose turned by `yaw` about +Y with a uniform scale.
    pub fn from_yaw(position: Vec3, yaw: f32, scale: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw),
            scale: Vec3::splat(scale),
        }
    }

    /// Pose from intrinsic X-Y-Z euler angles (pitch, yaw, roll).
    pub fn from_euler(position: Vec3, angles: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z),
            scale,
        }
    }

    /// Off-world, zero-scale pose for retired instances.
    pub fn hidden() -> Self {
        Self {
            position: Vec3::new(0.0, HIDDEN_Y, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::ZERO,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.scale == Vec3::ZERO
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Facing direction. Heading 0 faces +Z.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

/// Raw transform data for GPU upload (instance data).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 4]; 4],
}

impl From<&Transform> for TransformRaw {
    fn from(transform: &Transform) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
        }
    }
}

impl From<Transform> for TransformRaw {
    fn from(transform: Transform) -> Self {
        Self::from(&transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_zero_faces_positive_z() {
        let t = Transform::from_yaw(Vec3::ZERO, 0.0, 1.0);
        assert!((t.forward() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn quarter_yaw_faces_positive_x() {
        let t = Transform::from_yaw(Vec3::ZERO, std::f32::consts::FRAC_PI_2, 1.0);
        assert!((t.forward() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn hidden_pose_collapses_matrix() {
        let raw = TransformRaw::from(Transform::hidden());
        assert_eq!(raw.model[0][0], 0.0);
        assert_eq!(raw.model[3][1], HIDDEN_Y);
        assert!(Transform::hidden().is_hidden());
    }
}
