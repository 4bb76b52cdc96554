//! Output sizing and the wgpu implementation of [`RenderBackend`].
//!
//! [`viewport_for`] is the single place where a container size and a device
//! pixel ratio turn into drawing-buffer dimensions. [`WgpuBackend`] owns the
//! surface, device and queue plus every GPU object the scene allocated.

use std::{collections::HashMap, iter};

use anyhow::{Context as _, anyhow};

use crate::{
    data_structures::{
        geometry::{Geometry, SceneVertex, Topology},
        material::Material,
        texture::Texture,
    },
    error::SceneError,
    pipelines::scene::{
        MaterialUniform, ObjectUniform, PipelineKey, SceneLayouts, mk_frame_bind_group,
        mk_material_bind_group, mk_object_bind_group, mk_scene_pipeline, mk_shader,
        mk_uniform_buffer,
    },
    render::{Frame, FrameUniform, GeometryId, MaterialId, RenderBackend, TextureId},
};

/// Output size in CSS pixels plus the derived drawing-buffer size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
    pub physical_width: u32,
    pub physical_height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        if self.is_degenerate() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// A zero-sized viewport cannot be drawn into.
    pub fn is_degenerate(&self) -> bool {
        self.physical_width == 0 || self.physical_height == 0
    }
}

/// Derive the viewport for a container of `size` CSS pixels.
///
/// The device pixel ratio is capped at `max_pixel_ratio`; non-finite or
/// non-positive ratios count as 1.
pub fn viewport_for(size: (u32, u32), device_pixel_ratio: f64, max_pixel_ratio: f32) -> Viewport {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio as f32
    } else {
        1.0
    };
    let pixel_ratio = dpr.min(max_pixel_ratio.max(1.0));
    let (width, height) = size;
    Viewport {
        width,
        height,
        pixel_ratio,
        physical_width: (width as f32 * pixel_ratio).round() as u32,
        physical_height: (height as f32 * pixel_ratio).round() as u32,
    }
}

struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuMaterial {
    key: PipelineKey,
    texture: Option<TextureId>,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct ObjectSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Sprite corners of one expanded point, stored in `tex_coords`.
const SPRITE_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

/// Turn a point list into one camera-facing quad per point.
fn expand_points(vertices: &[SceneVertex]) -> (Vec<SceneVertex>, Vec<u32>) {
    let mut quads = Vec::with_capacity(vertices.len() * 4);
    let mut indices = Vec::with_capacity(vertices.len() * 6);
    for point in vertices {
        let base = quads.len() as u32;
        quads.extend(SPRITE_CORNERS.iter().map(|&tex_coords| SceneVertex {
            tex_coords,
            ..*point
        }));
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (quads, indices)
}

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    is_surface_configured: bool,
    sample_count: u32,
    depth_texture: Texture,
    msaa_texture: Option<Texture>,
    layouts: SceneLayouts,
    shader: wgpu::ShaderModule,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    fallback_texture: Texture,
    object_slots: Vec<ObjectSlot>,
    draw_order: Vec<usize>,
    geometries: HashMap<GeometryId, GpuGeometry>,
    materials: HashMap<MaterialId, GpuMaterial>,
    textures: HashMap<TextureId, Texture>,
    next_id: u32,
}

impl WgpuBackend {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if !self.pipelines.contains_key(&key) {
            log::debug!("creating pipeline {:?}", key);
            let pipeline = mk_scene_pipeline(
                &self.device,
                &self.layouts,
                &self.shader,
                self.config.format,
                self.sample_count,
                key,
            );
            self.pipelines.insert(key, pipeline);
        }
    }

    fn material_bind_group(
        &self,
        uniform: &wgpu::Buffer,
        texture: Option<TextureId>,
        label: &str,
    ) -> anyhow::Result<wgpu::BindGroup> {
        let texture = match texture {
            Some(id) => self
                .textures
                .get(&id)
                .ok_or_else(|| anyhow!("material {label} references unknown texture {:?}", id))?,
            None => &self.fallback_texture,
        };
        let sampler = texture
            .sampler
            .as_ref()
            .or(self.fallback_texture.sampler.as_ref())
            .ok_or_else(|| anyhow!("no sampler available for material {label}"))?;
        Ok(mk_material_bind_group(
            &self.device,
            &self.layouts,
            uniform,
            &texture.view,
            sampler,
            label,
        ))
    }

    fn recreate_targets(&mut self) {
        let size = [self.config.width, self.config.height];
        self.depth_texture =
            Texture::create_depth_texture(&self.device, size, self.sample_count, "depth_texture");
        self.msaa_texture = (self.sample_count > 1).then(|| {
            Texture::create_msaa_texture(&self.device, size, self.config.format, self.sample_count)
        });
    }

    fn ensure_object_slots(&mut self, count: usize) {
        while self.object_slots.len() < count {
            let buffer = mk_uniform_buffer(
                &self.device,
                "Object Buffer",
                &ObjectUniform {
                    model: cgmath::Matrix4::from_scale(1.0f32).into(),
                },
            );
            let bind_group = mk_object_bind_group(&self.device, &self.layouts, &buffer);
            self.object_slots.push(ObjectSlot { buffer, bind_group });
        }
    }
}

impl RenderBackend for WgpuBackend {
    type Surface = wgpu::SurfaceTarget<'static>;

    async fn create(surface: Self::Surface, viewport: &Viewport) -> anyhow::Result<Self> {
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance
            .create_surface(surface)
            .map_err(|e| SceneError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| SceneError::NoAdapter)?;
        log::debug!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
                } else {
                    wgpu::Limits::default()
                },
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| SceneError::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| SceneError::Surface("surface reports no formats".into()))?;
        // The shader writes premultiplied colour over a transparent clear.
        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let present_mode = surface_caps
            .present_modes
            .first()
            .copied()
            .unwrap_or(wgpu::PresentMode::Fifo);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.physical_width.max(1),
            height: viewport.physical_height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let sample_count = if adapter
            .get_texture_format_features(format)
            .flags
            .sample_count_supported(4)
        {
            4
        } else {
            1
        };
        log::info!("surface {:?}, {}x msaa", format, sample_count);

        let layouts = SceneLayouts::new(&device);
        let shader = mk_shader(&device);
        let frame_buffer = mk_uniform_buffer(
            &device,
            "Frame Buffer",
            &<FrameUniform as bytemuck::Zeroable>::zeroed(),
        );
        let frame_bind_group = mk_frame_bind_group(&device, &layouts, &frame_buffer);
        let fallback_texture = Texture::create_fallback(&device, &queue)?;
        let size = [config.width, config.height];
        let depth_texture = Texture::create_depth_texture(&device, size, sample_count, "depth_texture");

        let mut backend = Self {
            surface,
            device,
            queue,
            config,
            is_surface_configured: false,
            sample_count,
            depth_texture,
            msaa_texture: None,
            layouts,
            shader,
            pipelines: HashMap::new(),
            frame_buffer,
            frame_bind_group,
            fallback_texture,
            object_slots: Vec::new(),
            draw_order: Vec::new(),
            geometries: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            next_id: 0,
        };
        backend.resize(viewport);
        Ok(backend)
    }

    fn resize(&mut self, viewport: &Viewport) {
        if viewport.is_degenerate() {
            log::warn!(
                "viewport {}x{} is empty, drawing is paused",
                viewport.width,
                viewport.height
            );
            self.is_surface_configured = false;
            return;
        }
        let max = self.device.limits().max_texture_dimension_2d;
        self.config.width = viewport.physical_width.min(max);
        self.config.height = viewport.physical_height.min(max);
        self.surface.configure(&self.device, &self.config);
        self.recreate_targets();
        self.is_surface_configured = true;
    }

    fn create_geometry(&mut self, geometry: &Geometry) -> anyhow::Result<GeometryId> {
        use wgpu::util::DeviceExt;

        let expanded;
        let (vertices, indices) = match geometry.topology {
            Topology::Points => {
                expanded = expand_points(&geometry.vertices);
                (&expanded.0, &expanded.1)
            }
            Topology::Triangles | Topology::Lines => (&geometry.vertices, &geometry.indices),
        };
        anyhow::ensure!(!indices.is_empty(), "geometry {} is empty", geometry.label);

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", geometry.label)),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", geometry.label)),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let id = GeometryId(self.next_id());
        self.geometries.insert(
            id,
            GpuGeometry {
                vertex_buffer,
                index_buffer,
                index_count: indices.len() as u32,
            },
        );
        Ok(id)
    }

    fn create_texture(&mut self, raster: &image::RgbaImage, label: &str) -> anyhow::Result<TextureId> {
        let texture = Texture::from_raster(&self.device, &self.queue, raster, label)
            .with_context(|| format!("uploading texture {label}"))?;
        let id = TextureId(self.next_id());
        self.textures.insert(id, texture);
        Ok(id)
    }

    fn create_material(&mut self, material: &Material) -> anyhow::Result<MaterialId> {
        let key = PipelineKey::from(material);
        let uniform = mk_uniform_buffer(&self.device, material.label, &MaterialUniform::new(material));
        let bind_group = self.material_bind_group(&uniform, material.texture, material.label)?;
        self.ensure_pipeline(key);
        let id = MaterialId(self.next_id());
        self.materials.insert(
            id,
            GpuMaterial {
                key,
                texture: material.texture,
                uniform,
                bind_group,
            },
        );
        Ok(id)
    }

    fn update_material(&mut self, id: MaterialId, material: &Material) {
        let key = PipelineKey::from(material);
        let Some(gpu) = self.materials.get(&id) else {
            log::warn!("update of unknown material {:?}", id);
            return;
        };
        self.queue
            .write_buffer(&gpu.uniform, 0, bytemuck::bytes_of(&MaterialUniform::new(material)));

        let rebind = (gpu.texture != material.texture)
            .then(|| self.material_bind_group(&gpu.uniform, material.texture, material.label));
        if gpu.key != key {
            self.ensure_pipeline(key);
        }
        if let Some(gpu) = self.materials.get_mut(&id) {
            gpu.key = key;
            match rebind {
                Some(Ok(bind_group)) => {
                    gpu.bind_group = bind_group;
                    gpu.texture = material.texture;
                }
                Some(Err(e)) => log::warn!("keeping previous texture of {}: {e:#}", material.label),
                None => {}
            }
        }
    }

    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        if !self.is_surface_configured {
            return Ok(());
        }

        let (output, suboptimal) = match self.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) => (output, false),
            wgpu::CurrentSurfaceTexture::Suboptimal(output) => (output, true),
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                log::trace!("no surface texture this frame");
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                log::debug!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Validation => {
                return Err(anyhow!("validation error acquiring the next surface texture"));
            }
        };

        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame.uniform));
        self.ensure_object_slots(frame.draws.len());
        for (slot, draw) in self.object_slots.iter().zip(frame.draws) {
            let uniform = ObjectUniform {
                model: draw.world.into(),
            };
            self.queue
                .write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&uniform));
        }

        // Depth writers first, then blended parts in graph order.
        let mut order = std::mem::take(&mut self.draw_order);
        order.clear();
        order.extend(0..frame.draws.len());
        order.sort_by_key(|&i| {
            !self
                .materials
                .get(&frame.draws[i].material)
                .is_some_and(|m| m.key.depth_write)
        });

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });
        {
            let (target, resolve_target) = match &self.msaa_texture {
                Some(msaa) => (&msaa.view, Some(&view)),
                None => (&view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for &i in &order {
                let draw = &frame.draws[i];
                let (Some(geometry), Some(material)) = (
                    self.geometries.get(&draw.geometry),
                    self.materials.get(&draw.material),
                ) else {
                    log::warn!("skipping draw of released handles {:?}", draw);
                    continue;
                };
                let Some(pipeline) = self.pipelines.get(&material.key) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &material.bind_group, &[]);
                pass.set_bind_group(2, &self.object_slots[i].bind_group, &[]);
                pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..geometry.index_count, 0, 0..1);
            }
        }
        self.draw_order = order;

        self.queue.submit(iter::once(encoder.finish()));
        output.present();
        if suboptimal {
            self.surface.configure(&self.device, &self.config);
        }
        Ok(())
    }

    fn release_geometry(&mut self, id: GeometryId) {
        if self.geometries.remove(&id).is_none() {
            log::warn!("release of unknown geometry {:?}", id);
        }
    }

    fn release_material(&mut self, id: MaterialId) {
        if self.materials.remove(&id).is_none() {
            log::warn!("release of unknown material {:?}", id);
        }
    }

    fn release_texture(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_none() {
            log::warn!("release of unknown texture {:?}", id);
        }
    }

    fn dispose(self) {
        let leaked = self.geometries.len() + self.materials.len() + self.textures.len();
        if leaked > 0 {
            log::warn!("disposing backend with {} live resources", leaked);
        }
        log::info!("GPU resources released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped() {
        let viewport = viewport_for((420, 420), 3.0, 2.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!((viewport.physical_width, viewport.physical_height), (840, 840));
        assert_eq!(viewport.aspect(), 1.0);
    }

    #[test]
    fn low_ratios_are_kept() {
        let viewport = viewport_for((300, 150), 1.5, 2.0);
        assert_eq!(viewport.pixel_ratio, 1.5);
        assert_eq!((viewport.physical_width, viewport.physical_height), (450, 225));
        assert_eq!(viewport.aspect(), 2.0);
    }

    #[test]
    fn bogus_ratio_counts_as_one() {
        assert_eq!(viewport_for((10, 10), f64::NAN, 2.0).pixel_ratio, 1.0);
        assert_eq!(viewport_for((10, 10), 0.0, 2.0).pixel_ratio, 1.0);
    }

    #[test]
    fn zero_size_is_degenerate() {
        let viewport = viewport_for((0, 300), 2.0, 2.0);
        assert!(viewport.is_degenerate());
        assert_eq!(viewport.aspect(), 1.0);
    }

    #[test]
    fn points_expand_to_quads() {
        let points = Geometry::points("p", [[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]]);
        let (vertices, indices) = expand_points(&points.vertices);
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices.len(), 12);
        assert!(vertices[4..].iter().all(|v| v.position == [1.0, 2.0, 3.0]));
    }
}
