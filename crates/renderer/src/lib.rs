//! Renderer crate for fracview, a live Julia set viewer.
//!
//! The crate glues the `winit` window, the `wgpu` pipelines and a polling
//! shader hot reloader together. The overall flow is:
//!
//! ```text
//!   fracview CLI
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!                        │                                   │
//!                        ├─ InputState ─▶ ViewState ─────────┤
//!                        ├─ AnimationDriver ─▶ JuliaConstant ─┤
//!                        └─ HotReloader ─▶ RenderPipeline ────┴─▶ GPU
//! ```
//!
//! User fragment shaders are plain GLSL defining `mainImage`. They are wrapped
//! at runtime with a uniform block header so the familiar uniform names
//! (`center`, `zoom`, `itr`, ...) resolve, then validated with naga before
//! any GPU object is created.

pub mod animation;
mod compile;
mod gpu;
pub mod input;
pub mod reload;
pub mod runtime;
mod types;
pub mod view;
mod window;

use anyhow::Result;

pub use animation::{window_title, AnimationDriver, AnimationSample, AnimationSettings, JuliaConstant};
pub use compile::validate_fragment_source;
pub use reload::{FileSource, HotReloader, ProgramCompiler, ReloadEvent, ShaderError, WatchedSource};
pub use types::{ReloadPolicy, RendererConfig};
pub use view::{ViewSettings, ViewState};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the viewer window and blocks until it is closed.
    ///
    /// Fails if the window, GPU device or initial shader file cannot be set
    /// up. A shader that fails to compile is not an error here; the viewer
    /// starts without a fractal and picks it up on the next save.
    pub fn run(&mut self) -> Result<()> {
        window::run(&self.config)
    }
}
