use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories_next::ProjectDirs;
use renderer::{
    validate_fragment_source, AnimationSettings, ReloadPolicy, Renderer, RendererConfig,
    ViewSettings,
};
use tracing_subscriber::EnvFilter;
use viewconfig::{OnError, ViewerConfig};

use crate::cli::{CheckArgs, RunArgs};

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "fracview";
const APPLICATION: &str = "fracview";
const CONFIG_FILE: &str = "config.toml";

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = load_viewer_config(args.config.as_deref())?;
    let renderer_config = build_renderer_config(config, &args);
    tracing::debug!(?renderer_config, "resolved renderer configuration");

    let mut renderer = Renderer::new(renderer_config);
    renderer.run()
}

pub fn check(args: CheckArgs) -> Result<()> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read shader at {}", args.file.display()))?;
    validate_fragment_source(&source)
        .map_err(|err| anyhow!("{}: {err}", args.file.display()))?;
    println!("{}: ok", args.file.display());
    Ok(())
}

/// Loads the explicit config file, or the user's default one when present.
///
/// Relative paths inside a config file resolve against the file's directory;
/// built-in defaults resolve against the working directory.
fn load_viewer_config(explicit: Option<&Path>) -> Result<ViewerConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.is_file()),
    };

    let Some(path) = path else {
        tracing::debug!("no configuration file found; using defaults");
        return Ok(ViewerConfig::default());
    };

    let mut config = ViewerConfig::load(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    if let Some(base) = path.parent() {
        config.rebase(base);
    }
    tracing::info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Merges the config file with CLI flags; flags win.
fn build_renderer_config(config: ViewerConfig, args: &RunArgs) -> RendererConfig {
    let ViewerConfig {
        window,
        shader,
        overlay,
        animation,
        view,
    } = config;

    let overlay_image = if args.no_overlay {
        None
    } else if let Some(path) = &args.overlay {
        Some(path.clone())
    } else if overlay.enabled {
        Some(overlay.image)
    } else {
        None
    };

    let reload_policy = if args.keep_previous {
        ReloadPolicy::KeepPrevious
    } else {
        match shader.on_error {
            OnError::Abandon => ReloadPolicy::Abandon,
            OnError::KeepPrevious => ReloadPolicy::KeepPrevious,
        }
    };

    RendererConfig {
        surface_size: args.size.unwrap_or((window.width, window.height)),
        title: window.title,
        shader_source: args.shader.clone().unwrap_or(shader.path),
        reload_policy,
        overlay_image,
        animation: AnimationSettings {
            interval: animation.interval,
            period: animation.period,
            radius: animation.radius,
            mirror_imaginary: animation.mirror_imaginary,
            caption: animation.caption,
        },
        view: ViewSettings {
            center: view.center,
            zoom: view.zoom,
            min_zoom: view.min_zoom,
            iterations: view.iterations,
            pan_step: view.pan_step,
            iteration_step: view.iteration_step,
            scroll_factor: view.scroll_factor,
        },
        vsync: window.vsync && !args.no_vsync,
    }
}
