use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::reload::{FileSource, HotReloader, ReloadEvent};
use crate::types::RendererConfig;

use super::context::GpuContext;
use super::overlay::OverlayQuad;
use super::pipeline::{FractalPipelineBuilder, PipelineLayouts};
use super::uniforms::{FractalUniforms, FrameParameters};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

pub(crate) struct GpuState {
    context: GpuContext,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    reloader: HotReloader<FileSource, FractalPipelineBuilder>,
    overlay: Option<OverlayQuad>,
}

impl GpuState {
    pub(crate) fn new(
        window: Arc<Window>,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
    ) -> Result<Self> {
        let context = GpuContext::new(window, initial_size, config.vsync)?;
        let device = &context.device;

        let layouts = PipelineLayouts::new(device);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fractal uniforms"),
            contents: bytemuck::bytes_of(&FractalUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fractal uniform bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let builder = FractalPipelineBuilder::new(device, &layouts, context.surface_format);
        let mut reloader = HotReloader::new(
            FileSource::new(&config.shader_source),
            builder,
            config.reload_policy,
        );
        reloader
            .load_initial()
            .context("failed to load fractal shader")?;

        let overlay = config
            .overlay_image
            .as_deref()
            .map(|path| OverlayQuad::new(device, &context.queue, context.surface_format, path));

        Ok(Self {
            context,
            uniform_buffer,
            uniform_bind_group,
            reloader,
            overlay,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Rebuilds the fractal pipeline if the shader file changed on disk.
    pub(crate) fn poll_reload(&mut self) -> ReloadEvent {
        self.reloader.poll()
    }

    pub(crate) fn has_fractal(&self) -> bool {
        self.reloader.has_program()
    }

    pub(crate) fn render(&mut self, frame: &FrameParameters<'_>) -> Result<(), wgpu::SurfaceError> {
        let uniforms = FractalUniforms::new(self.context.size, frame);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = self.context.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.reloader.program() {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
            if let Some(overlay) = &self.overlay {
                overlay.draw(&mut pass);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}
