use crate::compile::{compile_fragment_shader, compile_vertex_shader, validate_fragment_source};
use crate::reload::{ProgramCompiler, ShaderError};

pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub vertex_module: wgpu::ShaderModule,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fractal uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let vertex_module = compile_vertex_shader(device);

        Self {
            uniform_layout,
            vertex_module,
        }
    }
}

/// Builds fractal render pipelines from user shader text.
///
/// Source is validated with naga first so diagnostics carry user line
/// numbers; anything wgpu still rejects is caught by a validation error scope.
pub(crate) struct FractalPipelineBuilder {
    device: wgpu::Device,
    layout: wgpu::PipelineLayout,
    vertex_module: wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
}

impl FractalPipelineBuilder {
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fractal pipeline layout"),
            bind_group_layouts: &[&layouts.uniform_layout],
            push_constant_ranges: &[],
        });
        Self {
            device: device.clone(),
            layout,
            vertex_module: layouts.vertex_module.clone(),
            surface_format,
        }
    }

    fn create_pipeline(&self, fragment_module: &wgpu::ShaderModule) -> wgpu::RenderPipeline {
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("fractal pipeline"),
                layout: Some(&self.layout),
                vertex: wgpu::VertexState {
                    module: &self.vertex_module,
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
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview: None,
                cache: None,
            })
    }
}

impl ProgramCompiler for FractalPipelineBuilder {
    type Program = wgpu::RenderPipeline;

    fn compile(&mut self, source: &str) -> Result<wgpu::RenderPipeline, ShaderError> {
        let wrapped = validate_fragment_source(source)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let fragment_module = compile_fragment_shader(&self.device, &wrapped);
        let pipeline = self.create_pipeline(&fragment_module);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(error) => Err(ShaderError::Pipeline(error.to_string())),
            None => Ok(pipeline),
        }
    }
}
