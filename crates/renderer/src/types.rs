use std::path::PathBuf;

use crate::animation::AnimationSettings;
use crate::view::ViewSettings;

/// What happens to the live fractal program when an edited shader fails to
/// compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPolicy {
    /// Drop the old program first; the fractal disappears until the shader
    /// is fixed.
    #[default]
    Abandon,
    /// Keep drawing the last program that compiled.
    KeepPrevious,
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` is the merged result of the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Initial window title; replaced by the live caption after the first
    /// animation sample.
    pub title: String,
    /// Fragment shader watched for changes.
    pub shader_source: PathBuf,
    pub reload_policy: ReloadPolicy,
    /// Image drawn on the overlay quad; `None` disables the overlay.
    pub overlay_image: Option<PathBuf>,
    pub animation: AnimationSettings,
    pub view: ViewSettings,
    pub vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (640, 480),
            title: "Mandelbrot".to_string(),
            shader_source: PathBuf::from("shaders/fractal.glsl"),
            reload_policy: ReloadPolicy::default(),
            overlay_image: Some(PathBuf::from("assets/overlay.png")),
            animation: AnimationSettings::default(),
            view: ViewSettings::default(),
            vsync: true,
        }
    }
}
