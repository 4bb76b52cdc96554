//! Camera and projection.
//!
//! The scene uses a fixed camera on the +Z axis looking at the origin; only
//! the projection's aspect ratio changes over the lifetime of a mount.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    /// A camera `distance` units along +Z, looking at the origin.
    pub fn on_z_axis(distance: f32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, distance),
            target: Point3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }

    /// Camera right and up vectors in world space, used to face point sprites.
    pub fn basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward);
        (right, up)
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
        Self {
            aspect,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Ignores degenerate sizes so the last usable aspect is kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    pub right: [f32; 4],
    pub up: [f32; 4],
}

impl CameraUniform {
    pub fn new(camera: &Camera, projection: &Projection) -> Self {
        let (right, up) = camera.basis();
        Self {
            view_position: camera.position.to_homogeneous().into(),
            view_proj: (projection.calc_matrix() * camera.calc_matrix()).into(),
            right: right.extend(0.0).into(),
            up: up.extend(0.0).into(),
        }
    }
}
