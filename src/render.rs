//! The boundary between the scene and whatever draws it.
//!
//! The scene controller never talks to wgpu directly. It allocates GPU-side
//! objects through a [`RenderBackend`], keeps the returned handles, and once
//! per frame hands over a [`Frame`]: the per-frame uniforms plus a flat list of
//! [`DrawCommand`]s in the order they should be drawn.
//!
//! The production backend is [`WgpuBackend`](crate::context::WgpuBackend).
//! Tests substitute a recording double.

use std::future::Future;

use crate::{
    camera::CameraUniform,
    context::Viewport,
    data_structures::{geometry::Geometry, material::Material},
    pipelines::light::LightUniform,
};

/// Handle of an uploaded [`Geometry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u32);

/// Handle of an uploaded [`Material`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Handle of an uploaded raster texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// One drawable with its world matrix for this frame.
#[derive(Clone, Copy, Debug)]
pub struct DrawCommand {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub world: cgmath::Matrix4<f32>,
}

/// Uniforms shared by every draw of a frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub camera: CameraUniform,
    pub light: LightUniform,
}

pub struct Frame<'a> {
    pub uniform: FrameUniform,
    pub draws: &'a [DrawCommand],
}

/// Everything the scene needs from a graphics implementation.
///
/// Every `create_*` call must eventually be matched by the corresponding
/// `release_*` call; releasing an unknown handle must be tolerated.
pub trait RenderBackend: Sized {
    /// What the host hands over to draw into (a canvas, a window).
    type Surface;

    /// Acquire the device for `surface`. This is the only asynchronous step of
    /// mounting because adapters are requested asynchronously on the web.
    fn create(surface: Self::Surface, viewport: &Viewport)
    -> impl Future<Output = anyhow::Result<Self>>;

    /// Adopt a new output size. Degenerate (zero-sized) viewports leave the
    /// backend unconfigured and make [`render`](Self::render) a no-op.
    fn resize(&mut self, viewport: &Viewport);

    fn create_geometry(&mut self, geometry: &Geometry) -> anyhow::Result<GeometryId>;

    fn create_texture(&mut self, raster: &image::RgbaImage, label: &str)
    -> anyhow::Result<TextureId>;

    fn create_material(&mut self, material: &Material) -> anyhow::Result<MaterialId>;

    fn update_material(&mut self, id: MaterialId, material: &Material);

    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()>;

    fn release_geometry(&mut self, id: GeometryId);

    fn release_material(&mut self, id: MaterialId);

    fn release_texture(&mut self, id: TextureId);

    /// Drop the device and surface. Called once, after every handle was released.
    fn dispose(self);
}
