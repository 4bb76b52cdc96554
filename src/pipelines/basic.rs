use crate::data_structures::{geometry::SceneVertex, texture::Texture};

/// Everything that differs between the scene's render pipelines.
pub struct PipelineParams<'a> {
    pub label: &'a str,
    pub color_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub topology: wgpu::PrimitiveTopology,
    pub cull_mode: Option<wgpu::Face>,
    pub depth_write: bool,
    pub vs_entry: &'a str,
    pub fs_entry: &'a str,
    pub sample_count: u32,
}

/// Depth is always tested; only opaque-ish parts write it.
pub fn depth_state(depth_write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: Texture::DEPTH_FORMAT,
        depth_write_enabled: Some(depth_write),
        depth_compare: Some(wgpu::CompareFunction::LessEqual),
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    params: &PipelineParams<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(params.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(params.vs_entry),
            buffers: &[SceneVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(params.fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: params.color_format,
                blend: params.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: params.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: params.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(depth_state(params.depth_write)),
        multisample: wgpu::MultisampleState {
            count: params.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blended_parts_test_depth_without_writing_it() {
        let blended = depth_state(false);
        assert_eq!(blended.depth_write_enabled, Some(false));
        assert_eq!(blended.depth_compare, Some(wgpu::CompareFunction::LessEqual));
        assert_eq!(depth_state(true).depth_write_enabled, Some(true));
        assert_eq!(blended.format, Texture::DEPTH_FORMAT);
    }
}
