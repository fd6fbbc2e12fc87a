//! GPU side of the viewer.
//!
//! - `context` owns the wgpu instance, device and surface and reconfigures the
//!   swapchain on resize.
//! - `pipeline` turns user fragment shaders into render pipelines and plugs
//!   into the hot reloader as its compiler.
//! - `uniforms` mirrors the injected uniform block.
//! - `overlay` draws the fixed textured quad.
//! - `state` glues everything together for `window`.

mod context;
mod overlay;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
pub(crate) use uniforms::FrameParameters;
