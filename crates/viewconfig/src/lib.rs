//! Configuration schema for the fracview viewer.
//!
//! Every field has a default so an empty file (or no file at all) yields the
//! stock viewer: 640x480 window, `shaders/fractal.glsl`, Julia constant on a
//! circle of radius 0.7885 sampled every 50ms.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub window: WindowSection,
    pub shader: ShaderSection,
    pub overlay: OverlaySection,
    pub animation: AnimationSection,
    pub view: ViewSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            title: "Mandelbrot".to_string(),
            vsync: true,
        }
    }
}

/// What happens to the running program when a reload fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnError {
    /// Drop the old program; nothing is drawn until the shader compiles again.
    #[default]
    Abandon,
    /// Keep drawing with the last program that compiled.
    KeepPrevious,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShaderSection {
    pub path: PathBuf,
    pub on_error: OnError,
}

impl Default for ShaderSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("shaders/fractal.glsl"),
            on_error: OnError::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlaySection {
    pub enabled: bool,
    pub image: PathBuf,
}

impl Default for OverlaySection {
    fn default() -> Self {
        Self {
            enabled: true,
            image: PathBuf::from("assets/overlay.png"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationSection {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub interval: Duration,
    pub period: u32,
    pub radius: f64,
    /// Feed `C_re` into the `C_im` uniform as well.
    pub mirror_imaginary: bool,
    /// Leading tag of the window caption.
    pub caption: String,
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            period: 250,
            radius: 0.7885,
            mirror_imaginary: true,
            caption: "fracview".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewSection {
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: f64,
    pub iterations: u32,
    pub pan_step: f64,
    pub iteration_step: u32,
    pub scroll_factor: f64,
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: 0.5,
            min_zoom: 0.1,
            iterations: 256,
            pan_step: 0.1,
            iteration_step: 10,
            scroll_factor: 0.1,
        }
    }
}

fn default_interval() -> Duration {
    Duration::from_millis(50)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be finite and non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl ViewerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ViewerConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Resolves relative shader and overlay paths against `base`.
    pub fn rebase(&mut self, base: &Path) {
        if self.shader.path.is_relative() {
            self.shader.path = base.join(&self.shader.path);
        }
        if self.overlay.image.is_relative() {
            self.overlay.image = base.join(&self.overlay.image);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero (got {}x{})",
                self.window.width, self.window.height
            )));
        }

        if self.shader.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("shader.path may not be empty".into()));
        }

        if self.overlay.enabled && self.overlay.image.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "overlay.image may not be empty while the overlay is enabled".into(),
            ));
        }

        if self.animation.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "animation.interval must be greater than zero".into(),
            ));
        }

        if self.animation.period == 0 {
            return Err(ConfigError::Invalid(
                "animation.period must be greater than zero".into(),
            ));
        }

        if !self.animation.radius.is_finite() {
            return Err(ConfigError::Invalid(
                "animation.radius must be a finite number".into(),
            ));
        }

        if !(self.view.min_zoom.is_finite() && self.view.min_zoom > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "view.min_zoom must be > 0 (got {})",
                self.view.min_zoom
            )));
        }

        if !self.view.zoom.is_finite() || self.view.zoom < self.view.min_zoom {
            return Err(ConfigError::Invalid(format!(
                "view.zoom must be >= view.min_zoom ({} < {})",
                self.view.zoom, self.view.min_zoom
            )));
        }

        if self.view.center.iter().any(|value| !value.is_finite()) {
            return Err(ConfigError::Invalid(
                "view.center must contain finite numbers".into(),
            ));
        }

        if !(self.view.pan_step.is_finite() && self.view.pan_step > 0.0) {
            return Err(ConfigError::Invalid("view.pan_step must be > 0".into()));
        }

        if !(self.view.scroll_factor.is_finite() && self.view.scroll_factor > 0.0) {
            return Err(ConfigError::Invalid(
                "view.scroll_factor must be > 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[window]
width = 1280
height = 720
vsync = false

[shader]
path = "my/julia.glsl"
on_error = "keep-previous"

[overlay]
enabled = false

[animation]
interval = "100ms"
period = 500
mirror_imaginary = false
caption = "studio"

[view]
center = [-0.5, 0.25]
zoom = 2.0
iterations = 512
"#;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ViewerConfig::from_toml_str("").expect("parse config");
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.shader.path, PathBuf::from("shaders/fractal.glsl"));
        assert_eq!(config.shader.on_error, OnError::Abandon);
        assert_eq!(config.animation.interval, Duration::from_millis(50));
        assert_eq!(config.animation.period, 250);
        assert!((config.animation.radius - 0.7885).abs() < f64::EPSILON);
        assert!(config.animation.mirror_imaginary);
        assert_eq!(config.view.iterations, 256);
        assert!((config.view.zoom - 0.5).abs() < f64::EPSILON);
        assert!((config.view.min_zoom - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_sample_config() {
        let config = ViewerConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.window.width, 1280);
        assert!(!config.window.vsync);
        assert_eq!(config.shader.on_error, OnError::KeepPrevious);
        assert!(!config.overlay.enabled);
        assert_eq!(config.animation.interval, Duration::from_millis(100));
        assert_eq!(config.animation.period, 500);
        assert!(!config.animation.mirror_imaginary);
        assert_eq!(config.animation.caption, "studio");
        assert_eq!(config.view.center, [-0.5, 0.25]);
        assert_eq!(config.view.iterations, 512);
        // untouched fields keep their defaults
        assert_eq!(config.view.iteration_step, 10);
    }

    #[test]
    fn numeric_interval_is_seconds() {
        let config = ViewerConfig::from_toml_str("[animation]\ninterval = 2").unwrap();
        assert_eq!(config.animation.interval, Duration::from_secs(2));
    }

    #[test]
    fn fractional_interval_is_seconds() {
        let config = ViewerConfig::from_toml_str("[animation]\ninterval = 0.25").unwrap();
        assert_eq!(config.animation.interval, Duration::from_millis(250));
    }

    #[test]
    fn rejects_unrepresentable_intervals() {
        for value in ["inf", "nan", "-0.5", "1e300"] {
            let err = ViewerConfig::from_toml_str(&format!("[animation]\ninterval = {value}"))
                .unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "interval = {value}");
        }
    }

    #[test]
    fn rejects_zero_period() {
        let err = ViewerConfig::from_toml_str("[animation]\nperiod = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zoom_below_floor() {
        let err = ViewerConfig::from_toml_str("[view]\nzoom = 0.05\nmin_zoom = 0.1").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ViewerConfig::from_toml_str("[window]\nfullscreen = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rebase_only_touches_relative_paths() {
        let mut config = ViewerConfig::from_toml_str(
            r#"
[shader]
path = "/abs/fractal.glsl"
[overlay]
image = "pics/tag.png"
"#,
        )
        .unwrap();
        config.rebase(Path::new("/etc/fracview"));
        assert_eq!(config.shader.path, PathBuf::from("/abs/fractal.glsl"));
        assert_eq!(
            config.overlay.image,
            PathBuf::from("/etc/fracview/pics/tag.png")
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ViewerConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
