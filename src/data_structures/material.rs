//! Material descriptions.
//!
//! A [`Material`] is plain data: the backend turns it into a pipeline choice
//! plus a uniform/texture bind group and hands back a
//! [`MaterialId`](crate::render::MaterialId). Changing a colour later means
//! sending an updated description through
//! [`RenderBackend::update_material`](crate::render::RenderBackend::update_material).

use crate::{data_structures::color::Color, render::TextureId};

/// How fragments are composited onto the framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Blending {
    /// Straight-alpha "over" compositing.
    Normal,
    /// Colour is summed onto the framebuffer, used for glow.
    Additive,
}

/// Parameters of the translucent glass look.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlassParams {
    pub roughness: f32,
    pub transmission: f32,
    pub thickness: f32,
    pub ior: f32,
    pub reflectivity: f32,
}

/// The shading model, which also selects the pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shading {
    /// Lit by the hemisphere and directional lights.
    Glass(GlassParams),
    /// Flat colour, optionally multiplied by a texture.
    Unlit,
    /// Flat colour for line lists.
    Line,
    /// Flat colour for camera facing point sprites of `size` world units.
    Points { size: f32 },
}

impl Shading {
    pub fn kind(&self) -> ShadingKind {
        match self {
            Shading::Glass(_) => ShadingKind::Glass,
            Shading::Unlit => ShadingKind::Unlit,
            Shading::Line => ShadingKind::Line,
            Shading::Points { .. } => ShadingKind::Points,
        }
    }
}

/// [`Shading`] without its parameters, usable as a pipeline cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShadingKind {
    Glass,
    Unlit,
    Line,
    Points,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub label: &'static str,
    pub shading: Shading,
    pub color: Color,
    pub opacity: f32,
    pub blending: Blending,
    pub texture: Option<TextureId>,
    pub depth_write: bool,
}

impl Material {
    /// An opaque-by-default unlit material.
    pub fn unlit(label: &'static str, color: Color) -> Self {
        Self {
            label,
            shading: Shading::Unlit,
            color,
            opacity: 1.0,
            blending: Blending::Normal,
            texture: None,
            depth_write: true,
        }
    }

    pub fn glass(label: &'static str, color: Color, opacity: f32, params: GlassParams) -> Self {
        Self {
            shading: Shading::Glass(params),
            opacity,
            depth_write: false,
            ..Self::unlit(label, color)
        }
    }

    pub fn line(label: &'static str, color: Color, opacity: f32) -> Self {
        Self {
            shading: Shading::Line,
            opacity,
            depth_write: false,
            ..Self::unlit(label, color)
        }
    }

    pub fn points(label: &'static str, color: Color, size: f32, opacity: f32) -> Self {
        Self {
            shading: Shading::Points { size },
            opacity,
            ..Self::unlit(label, color)
        }
    }

    /// Additive, non depth-writing glow.
    pub fn glow(label: &'static str, color: Color, opacity: f32) -> Self {
        Self {
            opacity,
            blending: Blending::Additive,
            depth_write: false,
            ..Self::unlit(label, color)
        }
    }

    /// A textured decal, visible from the side its plane faces.
    pub fn decal(label: &'static str, texture: TextureId) -> Self {
        Self {
            texture: Some(texture),
            depth_write: false,
            ..Self::unlit(label, Color::WHITE)
        }
    }
}
