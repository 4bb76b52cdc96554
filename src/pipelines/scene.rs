//! Bind group layouts, uniforms and pipeline variants of the scene shader.
//!
//! There is a single shader (`scene.wgsl`). Pipelines differ by shading
//! model, blending, depth writes and culling, and are created lazily the first
//! time a material asks for a combination, see [`PipelineKey`].

use wgpu::util::DeviceExt;

use crate::{
    data_structures::material::{Blending, Material, Shading, ShadingKind},
    pipelines::basic::{PipelineParams, mk_render_pipeline},
};

/// Per-material uniform, group 1 binding 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    /// Point size, texture flag, transmission, roughness.
    pub params: [f32; 4],
    /// Index of refraction, reflectivity, thickness, unused.
    pub glass: [f32; 4],
}

impl MaterialUniform {
    pub fn new(material: &Material) -> Self {
        let [r, g, b, a] = material.color.to_linear();
        let mut params = [0.0; 4];
        let mut glass = [1.0, 0.0, 0.0, 0.0];
        params[1] = if material.texture.is_some() { 1.0 } else { 0.0 };
        match material.shading {
            Shading::Points { size } => params[0] = size,
            Shading::Glass(p) => {
                params[2] = p.transmission;
                params[3] = p.roughness;
                glass = [p.ior, p.reflectivity, p.thickness, 0.0];
            }
            Shading::Unlit | Shading::Line => {}
        }
        Self {
            color: [r, g, b, a * material.opacity],
            params,
            glass,
        }
    }
}

/// Per-draw model matrix, group 2 binding 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
}

/// Selects one pipeline variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub kind: ShadingKind,
    pub blending: Blending,
    pub depth_write: bool,
}

impl From<&Material> for PipelineKey {
    fn from(material: &Material) -> Self {
        Self {
            kind: material.shading.kind(),
            blending: material.blending,
            depth_write: material.depth_write,
        }
    }
}

/// Layouts shared by every pipeline variant.
pub struct SceneLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
    pub pipeline: wgpu::PipelineLayout,
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0)],
            label: Some("frame_bind_group_layout"),
        });
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("material_bind_group_layout"),
        });
        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0)],
            label: Some("object_bind_group_layout"),
        });
        let pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[Some(&frame), Some(&material), Some(&object)],
            immediate_size: 0,
        });
        Self {
            frame,
            material,
            object,
            pipeline,
        }
    }
}

pub fn mk_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
    })
}

pub fn mk_uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, label: &str, value: &T) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_frame_bind_group(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layouts.frame,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("frame_bind_group"),
    })
}

pub fn mk_object_bind_group(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layouts.object,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some("object_bind_group"),
    })
}

pub fn mk_material_bind_group(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    buffer: &wgpu::Buffer,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layouts.material,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(label),
    })
}

fn blend_state(blending: Blending) -> wgpu::BlendState {
    match blending {
        Blending::Normal => wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
        Blending::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

pub fn mk_scene_pipeline(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let (topology, vs_entry, fs_entry) = match key.kind {
        ShadingKind::Glass => (wgpu::PrimitiveTopology::TriangleList, "vs_main", "fs_glass"),
        ShadingKind::Unlit => (wgpu::PrimitiveTopology::TriangleList, "vs_main", "fs_unlit"),
        ShadingKind::Line => (wgpu::PrimitiveTopology::LineList, "vs_main", "fs_unlit"),
        ShadingKind::Points => (wgpu::PrimitiveTopology::TriangleList, "vs_points", "fs_unlit"),
    };
    let cull_mode = cull_mode(key.kind);
    let label = format!("{:?} Pipeline", key);
    mk_render_pipeline(
        device,
        &layouts.pipeline,
        shader,
        &PipelineParams {
            label: &label,
            color_format,
            blend: Some(blend_state(key.blending)),
            topology,
            cull_mode,
            depth_write: key.depth_write,
            vs_entry,
            fs_entry,
            sample_count,
        },
    )
}

/// Surfaces are front-face only; lines and camera-facing sprites have no back.
pub fn cull_mode(kind: ShadingKind) -> Option<wgpu::Face> {
    match kind {
        ShadingKind::Line | ShadingKind::Points => None,
        ShadingKind::Glass | ShadingKind::Unlit => Some(wgpu::Face::Back),
    }
}
