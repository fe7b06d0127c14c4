use anyhow::{anyhow, Result};
use compositor::{Body, PassParams, RenderHost, Viewport};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, info};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use super::context::GpuContext;
use super::pipeline::{FramePipelines, PipelineLayouts, TARGET_FORMAT};
use super::uniforms::PassUniforms;

/// An offscreen colour target plus the bind group that samples it.
struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampling: wgpu::BindGroup,
}

impl Target {
    fn new(
        device: &wgpu::Device,
        label: &str,
        size: PhysicalSize<u32>,
        usage: wgpu::TextureUsages,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: usage
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampling = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        Self {
            texture,
            view,
            sampling,
        }
    }
}

fn extent(size: PhysicalSize<u32>) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width.max(1),
        height: size.height.max(1),
        depth_or_array_layers: 1,
    }
}

/// GPU side of the compositor: every pass renders into the scene target,
/// accumulation folds it into a second target, and `present` blits the scene
/// target to the window.
pub(crate) struct GpuState {
    context: GpuContext,
    layouts: PipelineLayouts,
    pipelines: FramePipelines,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    scene: Target,
    accumulation: Target,
    encoder: Option<wgpu::CommandEncoder>,
}

impl GpuState {
    pub(crate) fn new<T>(target: &T, initial_size: PhysicalSize<u32>) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size)?;
        let device = &context.device;

        let layouts = PipelineLayouts::new(device);
        let pipelines = FramePipelines::new(device, &layouts, context.surface_format);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pass uniforms"),
            size: std::mem::size_of::<PassUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pass uniform bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("target sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let (scene, accumulation) =
            Self::create_targets(device, context.size, &layouts, &sampler);

        info!(
            adapter = %context.adapter_profile.name,
            backend = ?context.adapter_profile.backend,
            width = context.size.width,
            height = context.size.height,
            "renderer ready"
        );

        Ok(Self {
            context,
            layouts,
            pipelines,
            uniform_buffer,
            uniform_bind_group,
            sampler,
            scene,
            accumulation,
            encoder: None,
        })
    }

    fn create_targets(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        layouts: &PipelineLayouts,
        sampler: &wgpu::Sampler,
    ) -> (Target, Target) {
        let scene = Target::new(
            device,
            "scene target",
            size,
            wgpu::TextureUsages::COPY_DST,
            &layouts.texture_layout,
            sampler,
        );
        let accumulation = Target::new(
            device,
            "accumulation target",
            size,
            wgpu::TextureUsages::COPY_SRC,
            &layouts.texture_layout,
            sampler,
        );
        (scene, accumulation)
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn viewport(&self) -> Viewport {
        Viewport::new(self.context.size.width, self.context.size.height)
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        let (scene, accumulation) =
            Self::create_targets(&self.context.device, new_size, &self.layouts, &self.sampler);
        self.scene = scene;
        self.accumulation = accumulation;
        self.encoder = None;
        debug!(width = new_size.width, height = new_size.height, "render targets resized");
    }

    fn encoder(&mut self) -> Result<&mut wgpu::CommandEncoder> {
        self.encoder
            .as_mut()
            .ok_or_else(|| anyhow!("render pass issued outside of a frame"))
    }

    /// Blits the scene target to the surface and submits the frame.
    pub(crate) fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.encoder.take().unwrap_or_else(|| {
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("present encoder"),
                })
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.present);
            pass.set_bind_group(0, &self.scene.sampling, &[]);
            pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn clear_pass(encoder: &mut wgpu::CommandEncoder, label: &str, view: &wgpu::TextureView) {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });
}

impl RenderHost for GpuState {
    fn begin_frame(&mut self, accumulate: bool) -> Result<()> {
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });
        clear_pass(&mut encoder, "clear scene", &self.scene.view);
        if accumulate {
            clear_pass(&mut encoder, "clear accumulation", &self.accumulation.view);
        }
        self.encoder = Some(encoder);
        Ok(())
    }

    fn render_pass(&mut self, pass: &PassParams, bodies: &[Body]) -> Result<()> {
        let uniforms = PassUniforms::new(pass, bodies, &self.viewport());

        // Each pass gets its own staging copy so the encoder sees per-pass values.
        let staging = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("uniform staging"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::COPY_SRC,
            });

        let scene_view = self.scene.view.clone();
        let uniform_buffer = self.uniform_buffer.clone();
        let bind_group = self.uniform_bind_group.clone();
        let pipeline = self.pipelines.scene.clone();

        let encoder = self.encoder()?;
        encoder.copy_buffer_to_buffer(
            &staging,
            0,
            &uniform_buffer,
            0,
            std::mem::size_of::<PassUniforms>() as u64,
        );
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &scene_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.draw(0..3, 0..1);
        Ok(())
    }

    fn accumulate(&mut self, weight: f32) -> Result<()> {
        let accumulation_view = self.accumulation.view.clone();
        let scene_sampling = self.scene.sampling.clone();
        let pipeline = self.pipelines.accumulate.clone();

        let encoder = self.encoder()?;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("accumulate pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &accumulation_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        let weight = f64::from(weight);
        pass.set_pipeline(&pipeline);
        pass.set_blend_constant(wgpu::Color {
            r: weight,
            g: weight,
            b: weight,
            a: weight,
        });
        pass.set_bind_group(0, &scene_sampling, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }

    fn resolve_accumulation(&mut self) -> Result<()> {
        let size = extent(self.context.size);
        let source = self.accumulation.texture.clone();
        let destination = self.scene.texture.clone();

        let encoder = self.encoder()?;
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &source,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: &destination,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            size,
        );
        Ok(())
    }
}
