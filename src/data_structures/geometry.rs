//! Procedural geometry for the primitives the scene is built from.
//!
//! All shapes are generated on the CPU as [`Geometry`] (vertices, indices and
//! a topology) and handed to a [`RenderBackend`](crate::render::RenderBackend)
//! once, which returns a handle. Nothing here touches the GPU.

use std::f32::consts::PI;

/// How the vertices of a [`Geometry`] are assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Triangles,
    Lines,
    /// One sprite per vertex, expanded by the backend.
    Points,
}

/// Vertex layout shared by every pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl SceneVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// CPU-side geometry ready for upload.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub label: &'static str,
    pub vertices: Vec<SceneVertex>,
    /// Empty for [`Topology::Points`].
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Axis-aligned box centred at the origin with outward normals and
    /// per-face UVs.
    pub fn cuboid(label: &'static str, width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        #[rustfmt::skip]
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]]),
            ([0.0, 0.0, -1.0], [[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]]),
            ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]]),
            ([1.0, 0.0, 0.0], [[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]]),
            ([0.0, 1.0, 0.0], [[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]]),
            ([0.0, -1.0, 0.0], [[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]]),
        ];
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = vertices.len() as u32;
            for (position, tex_coords) in corners.into_iter().zip(uvs) {
                vertices.push(SceneVertex {
                    position,
                    normal,
                    tex_coords,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self {
            label,
            vertices,
            indices,
            topology: Topology::Triangles,
        }
    }

    /// The twelve edges of a box as a line list.
    pub fn cuboid_edges(label: &'static str, width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        let corners = [
            [-x, -y, -z],
            [x, -y, -z],
            [x, y, -z],
            [-x, y, -z],
            [-x, -y, z],
            [x, -y, z],
            [x, y, z],
            [-x, y, z],
        ];
        let vertices = corners
            .into_iter()
            .map(|position| SceneVertex {
                position,
                ..Default::default()
            })
            .collect();
        #[rustfmt::skip]
        let indices = vec![
            // back square
            0, 1, 1, 2, 2, 3, 3, 0,
            // front square
            4, 5, 5, 6, 6, 7, 7, 4,
            // connecting struts
            0, 4, 1, 5, 2, 6, 3, 7,
        ];
        Self {
            label,
            vertices,
            indices,
            topology: Topology::Lines,
        }
    }

    /// Flat quad in the XY plane facing +Z. The top edge of a texture maps to +Y.
    pub fn plane(label: &'static str, width: f32, height: f32) -> Self {
        let (x, y) = (width / 2.0, height / 2.0);
        let normal = [0.0, 0.0, 1.0];
        let vertices = vec![
            SceneVertex {
                position: [-x, y, 0.0],
                normal,
                tex_coords: [0.0, 0.0],
            },
            SceneVertex {
                position: [-x, -y, 0.0],
                normal,
                tex_coords: [0.0, 1.0],
            },
            SceneVertex {
                position: [x, -y, 0.0],
                normal,
                tex_coords: [1.0, 1.0],
            },
            SceneVertex {
                position: [x, y, 0.0],
                normal,
                tex_coords: [1.0, 0.0],
            },
        ];
        Self {
            label,
            vertices,
            indices: vec![0, 1, 2, 2, 3, 0],
            topology: Topology::Triangles,
        }
    }

    /// Torus lying in the XY plane, so spinning it about Z keeps it in place.
    pub fn torus(
        label: &'static str,
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    ) -> Self {
        let radial = radial_segments.max(3);
        let tubular = tubular_segments.max(3);

        let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
        for j in 0..=radial {
            let v = j as f32 / radial as f32 * PI * 2.0;
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * PI * 2.0;
                let ring = radius + tube * v.cos();
                let position = [ring * u.cos(), ring * u.sin(), tube * v.sin()];
                let centre = [radius * u.cos(), radius * u.sin(), 0.0];
                let normal = [
                    (position[0] - centre[0]) / tube,
                    (position[1] - centre[1]) / tube,
                    position[2] / tube,
                ];
                vertices.push(SceneVertex {
                    position,
                    normal,
                    tex_coords: [i as f32 / tubular as f32, j as f32 / radial as f32],
                });
            }
        }

        let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);
        let stride = tubular + 1;
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = stride * j + i - 1;
                let b = stride * (j - 1) + i - 1;
                let c = stride * (j - 1) + i;
                let d = stride * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            label,
            vertices,
            indices,
            topology: Topology::Triangles,
        }
    }

    /// A cloud of points; the backend decides how big each one is drawn.
    pub fn points(label: &'static str, positions: impl IntoIterator<Item = [f32; 3]>) -> Self {
        let vertices = positions
            .into_iter()
            .map(|position| SceneVertex {
                position,
                ..Default::default()
            })
            .collect();
        Self {
            label,
            vertices,
            indices: Vec::new(),
            topology: Topology::Points,
        }
    }
}
