use wgpu::naga::ShaderStage;

use super::shaders::{
    compile_glsl, BLIT_FRAGMENT_GLSL, SCENE_FRAGMENT_GLSL, VERTEX_SHADER_GLSL,
};

/// Format of the offscreen scene and accumulation targets.
pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Adds the source scaled by the blend constant, which carries the pass weight.
const WEIGHTED_ADD: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Constant,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Constant,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub vertex_module: wgpu::ShaderModule,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pass uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit texture layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let vertex_module = compile_glsl(
            device,
            "fullscreen triangle vertex",
            VERTEX_SHADER_GLSL,
            ShaderStage::Vertex,
        );

        Self {
            uniform_layout,
            texture_layout,
            vertex_module,
        }
    }
}

/// The three pipelines a frame needs: draw the scene, fold it into the
/// accumulation target, and copy the result to the surface.
pub(crate) struct FramePipelines {
    pub scene: wgpu::RenderPipeline,
    pub accumulate: wgpu::RenderPipeline,
    pub present: wgpu::RenderPipeline,
}

impl FramePipelines {
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let scene_fragment = compile_glsl(
            device,
            "scene fragment",
            SCENE_FRAGMENT_GLSL,
            ShaderStage::Fragment,
        );
        let blit_fragment = compile_glsl(
            device,
            "blit fragment",
            BLIT_FRAGMENT_GLSL,
            ShaderStage::Fragment,
        );

        let scene = build_pipeline(
            device,
            "scene pipeline",
            &layouts.uniform_layout,
            &layouts.vertex_module,
            &scene_fragment,
            TARGET_FORMAT,
            None,
        );
        let accumulate = build_pipeline(
            device,
            "accumulate pipeline",
            &layouts.texture_layout,
            &layouts.vertex_module,
            &blit_fragment,
            TARGET_FORMAT,
            Some(WEIGHTED_ADD),
        );
        let present = build_pipeline(
            device,
            "present pipeline",
            &layouts.texture_layout,
            &layouts.vertex_module,
            &blit_fragment,
            surface_format,
            None,
        );

        Self {
            scene,
            accumulate,
            present,
        }
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
    vertex_module: &wgpu::ShaderModule,
    fragment_module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: Some("main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}
