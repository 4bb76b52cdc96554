//! Local transformation data of scene nodes.
//!
//! A [`Transform`] is what a node stores relative to its parent. World
//! transforms are plain matrices obtained by multiplying the parent's world
//! matrix with the local matrix, see
//! [`SceneNode::update_world_transforms`](crate::data_structures::scene_graph::SceneNode::update_world_transforms).

use cgmath::{Matrix4, Rad, Vector3};

/// Euler angles in radians, applied in X, then Y, then Z order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(Rad(self.x))
            * Matrix4::from_angle_y(Rad(self.y))
            * Matrix4::from_angle_z(Rad(self.z))
    }
}

/// Position, rotation and scale of a node relative to its parent.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Rotation,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Rotation::ZERO,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vector3::new(x, y, z);
        self
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Rotation::new(x, y, z);
        self
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * self.rotation.to_matrix()
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use cgmath::{InnerSpace, Vector4};

    use super::*;

    #[test]
    fn quarter_turn_about_y_maps_z_onto_x() {
        let t = Transform::new().with_rotation(0.0, FRAC_PI_2, 0.0);
        let n = t.to_matrix() * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!((n.truncate() - Vector3::unit_x()).magnitude() < 1e-6);
    }

    #[test]
    fn negative_quarter_turn_about_x_maps_z_onto_y() {
        let t = Transform::new().with_rotation(-FRAC_PI_2, 0.0, 0.0);
        let n = t.to_matrix() * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!((n.truncate() - Vector3::unit_y()).magnitude() < 1e-6);
    }

    #[test]
    fn translation_is_applied_after_rotation() {
        let t = Transform::new()
            .with_position(0.0, 1.01, 0.0)
            .with_rotation(-FRAC_PI_2, 0.0, 0.0);
        let p = t.to_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((p.truncate() - Vector3::new(0.0, 1.01, 0.0)).magnitude() < 1e-6);
    }
}
