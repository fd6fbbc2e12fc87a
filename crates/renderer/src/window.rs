use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::dpi::PhysicalSize;
use winit::event::{Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use tracing::{error, info, warn};

use crate::animation::{window_title, AnimationDriver};
use crate::gpu::{FrameParameters, GpuState};
use crate::input::InputState;
use crate::runtime::SystemTimeSource;
use crate::types::RendererConfig;
use crate::view::ViewState;

/// Everything the event loop owns: window, GPU resources and viewer state.
pub(crate) struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    input: InputState,
    view: ViewState,
    animation: AnimationDriver,
    mirror_imaginary: bool,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.clone(), size, config)?;
        if !gpu.has_fractal() {
            warn!("starting without a fractal program; fix the shader and save to load it");
        }

        let animation = AnimationDriver::new(config.animation.clone(), SystemTimeSource::new());

        Ok(Self {
            window,
            gpu,
            input: InputState::new(),
            view: ViewState::new(config.view.clone()),
            animation,
            mirror_imaginary: config.animation.mirror_imaginary,
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// Runs one iteration of the render loop.
    pub(crate) fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.gpu.poll_reload();

        let size = self.window.inner_size();
        if size != self.gpu.size() {
            self.gpu.resize(size);
        }

        let result = self.gpu.render(&FrameParameters {
            view: &self.view,
            constant: self.animation.constant(),
            mirror_imaginary: self.mirror_imaginary,
        });

        self.input.apply_held_keys(&mut self.view);
        if let Some(sample) = self.animation.tick() {
            let title = window_title(
                &self.animation.settings().caption,
                &sample,
                self.view.iterations,
                self.view.zoom,
            );
            self.window.set_title(&title);
        }

        result
    }

    fn window_extent(&self) -> [f64; 2] {
        let size = self.window.inner_size();
        [f64::from(size.width), f64::from(size.height)]
    }
}

/// Opens the viewer window and drives the `winit` event loop until the user
/// closes it.
pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create viewer window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window.clone(), config)?;
    info!(
        shader = %config.shader_source.display(),
        width = window_size.width,
        height = window_size.height,
        "viewer ready"
    );
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            elwt.exit();
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            state.input.handle_key_event(&event);
                            if state.input.close_requested() {
                                elwt.exit();
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            state.input.handle_cursor_moved(position);
                        }
                        WindowEvent::MouseInput {
                            state: button_state,
                            button: MouseButton::Left,
                            ..
                        } => {
                            let extent = state.window_extent();
                            state
                                .input
                                .handle_left_button(button_state, extent, &mut state.view);
                        }
                        WindowEvent::MouseWheel { delta, .. } => {
                            state.input.handle_scroll(delta, &mut state.view);
                        }
                        WindowEvent::Resized(new_size) => {
                            state.resize(new_size);
                        }
                        WindowEvent::RedrawRequested => match state.render_frame() {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.gpu.reconfigure();
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("surface out of memory; exiting");
                                elwt.exit();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                warn!("surface timeout; retrying next frame");
                            }
                            Err(other) => {
                                warn!("surface error: {other:?}; retrying next frame");
                            }
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    state.window().request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}
