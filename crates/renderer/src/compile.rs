use std::borrow::Cow;

use wgpu::naga::front::glsl::{Frontend, Options};
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::{ShaderStage, Span};

use crate::reload::ShaderError;

/// Names the wrapper injects; user declarations of these are stripped.
const INJECTED_UNIFORMS: [&str; 7] = [
    "screen_size",
    "screen_ratio",
    "C_re",
    "C_im",
    "center",
    "zoom",
    "itr",
];

/// Optional device features requested in `gpu/context.rs`.
pub(crate) const DEVICE_FEATURES: wgpu::Features = wgpu::Features::empty();

/// Shader capabilities available with [`DEVICE_FEATURES`]; no `FLOAT64`.
const SHADER_CAPABILITIES: Capabilities = Capabilities::empty();

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Hands an already wrapped fractal fragment shader to wgpu.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device, wrapped: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fractal fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(wrapped.to_owned()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

pub(crate) fn compile_overlay_shaders(
    device: &wgpu::Device,
) -> (wgpu::ShaderModule, wgpu::ShaderModule) {
    let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("overlay vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(OVERLAY_VERTEX_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    });
    let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("overlay fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(OVERLAY_FRAGMENT_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    });
    (vertex, fragment)
}

/// Parses and validates a user fragment shader without touching the GPU.
///
/// Returns the wrapped source on success so callers can feed it straight to
/// [`compile_fragment_shader`]. Line numbers in the diagnostics refer to the
/// user's file, not the wrapped source.
pub fn validate_fragment_source(source: &str) -> Result<String, ShaderError> {
    let wrapped = wrap_fractal_fragment(source);

    let mut frontend = Frontend::default();
    let module = frontend
        .parse(&Options::from(ShaderStage::Fragment), &wrapped)
        .map_err(|errors| {
            let lines: Vec<String> = errors
                .errors
                .iter()
                .map(|error| describe(&wrapped, error.meta, &error.kind.to_string()))
                .collect();
            ShaderError::Parse(lines.join("\n"))
        })?;

    Validator::new(ValidationFlags::all(), SHADER_CAPABILITIES)
        .validate(&module)
        .map_err(|error| {
            let mut lines = vec![error.as_inner().to_string()];
            for (span, label) in error.spans() {
                lines.push(describe(&wrapped, *span, label));
            }
            ShaderError::Validation(lines.join("\n"))
        })?;

    Ok(wrapped)
}

fn describe(wrapped: &str, span: Span, message: &str) -> String {
    if !span.is_defined() {
        return message.to_string();
    }
    let location = span.location(wrapped);
    // HEADER, a blank separator line, then USER_MARKER
    let header_lines = HEADER.lines().count() as u32 + 2;
    match location.line_number.checked_sub(header_lines) {
        Some(line) if line > 0 => format!("{line}:{}: {message}", location.line_position),
        _ => format!("<prelude>:{}: {message}", location.line_number),
    }
}

/// Produces a self-contained GLSL fragment shader from the user's fractal code.
///
/// 1. Strip `#version` and declarations of the injected uniforms (desktop GLSL
///    shaders declare them as loose `uniform double ...`).
/// 2. Prepend [`HEADER`] which declares the uniform block and aliases each
///    uniform name onto it.
/// 3. Append [`FOOTER`] which flips `gl_FragCoord` to a bottom-left origin and
///    calls `mainImage`.
pub(crate) fn wrap_fractal_fragment(source: &str) -> String {
    let mut sanitized = String::with_capacity(source.len());
    let mut skipped_version = false;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            sanitized.push('\n');
            continue;
        }
        if let Some(replacement) = strip_injected_uniforms(line) {
            // one line out per line in, so diagnostics stay aligned
            sanitized.push_str(&replacement);
            sanitized.push('\n');
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!("{HEADER}\n{USER_MARKER}\n{sanitized}{FOOTER}")
}

/// Rewrites a single-line `uniform` declaration without the injected names.
///
/// Returns `None` when the line should be kept untouched, an empty string when
/// every declared name is injected, and a shortened declaration otherwise.
/// Only the declarators are inspected; comments and identifiers inside
/// initializers never count.
fn strip_injected_uniforms(line: &str) -> Option<String> {
    let code = code_before_comment(line).trim_start();
    let rest = code.strip_prefix("uniform")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let (declaration, _) = rest.split_once(';')?;

    let mut declarators = declaration.split(',');
    let first = declarators.next()?;
    let head_end = first.find(['=', '[']).unwrap_or(first.len());
    let (ty, first_name) = first[..head_end].trim().rsplit_once(char::is_whitespace)?;
    let tail = first[head_end..].trim();
    let first = if tail.starts_with('=') {
        format!("{first_name} {tail}")
    } else {
        format!("{first_name}{tail}")
    };

    let all: Vec<String> = std::iter::once(first)
        .chain(declarators.map(|declarator| declarator.trim().to_string()))
        .collect();
    let kept: Vec<&str> = all
        .iter()
        .map(String::as_str)
        .filter(|declarator| !INJECTED_UNIFORMS.contains(&declared_name(declarator)))
        .collect();

    if kept.len() == all.len() {
        None
    } else if kept.is_empty() {
        Some(String::new())
    } else {
        Some(format!("uniform {} {};", ty.trim(), kept.join(", ")))
    }
}

fn code_before_comment(line: &str) -> &str {
    let end = [line.find("//"), line.find("/*")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(line.len());
    &line[..end]
}

fn declared_name(declarator: &str) -> &str {
    declarator
        .trim_start()
        .split(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
        .next()
        .unwrap_or_default()
}

/// Separates the injected prologue from the user's first line.
const USER_MARKER: &str = "// fractal shader";

/// GLSL prologue injected ahead of every fractal shader.
///
/// The block layout must match `FractalUniforms` in `gpu/uniforms.rs`.
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 fracview_out_color;

layout(std140, set = 0, binding = 0) uniform FractalParams {
    vec2 _screen_size;
    float _screen_ratio;
    float _C_re;
    float _C_im;
    float _zoom;
    vec2 _center;
    int _itr;
    float _padding0;
    float _padding1;
    float _padding2;
} params;

#define screen_size params._screen_size
#define screen_ratio params._screen_ratio
#define C_re params._C_re
#define C_im params._C_im
#define center params._center
#define zoom params._zoom
#define itr params._itr
";

const FOOTER: &str = r"
void main() {
    vec2 frag_coord = vec2(gl_FragCoord.x, params._screen_size.y - gl_FragCoord.y);
    vec4 color = vec4(0.0);
    mainImage(color, frag_coord);
    fracview_out_color = color;
}
";

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

const OVERLAY_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
layout(location = 2) in vec2 a_tex_coord;

layout(location = 0) out vec3 v_color;
layout(location = 1) out vec2 v_tex_coord;

void main() {
    gl_Position = vec4(a_position, 1.0);
    v_color = a_color;
    v_tex_coord = a_tex_coord;
}
";

const OVERLAY_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec3 v_color;
layout(location = 1) in vec2 v_tex_coord;
layout(location = 0) out vec4 out_color;

layout(set = 0, binding = 0) uniform texture2D overlay_texture;
layout(set = 0, binding = 1) uniform sampler overlay_sampler;

void main() {
    out_color = texture(sampler2D(overlay_texture, overlay_sampler), v_tex_coord);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP_SHADER: &str = r#"#version 410
uniform dvec2 screen_size;
uniform double screen_ratio;
uniform double C_re;
uniform double C_im;
uniform dvec2 center;
uniform double zoom;
uniform int itr;

void mainImage(out vec4 color, in vec2 frag_coord) {
    color = vec4(frag_coord / screen_size, zoom, 1.0);
}
"#;

    #[test]
    fn wrap_strips_injected_uniforms() {
        let wrapped = wrap_fractal_fragment(DESKTOP_SHADER);
        assert!(!wrapped.contains("uniform double C_re"));
        assert!(!wrapped.contains("uniform dvec2 center"));
        assert!(!wrapped.contains("uniform int itr"));
        assert!(!wrapped.contains("#version 410"));
        assert!(wrapped.contains("mainImage(color, frag_coord)"));
        assert!(wrapped.starts_with("#version 450"));
    }

    #[test]
    fn wrap_keeps_unrelated_uniform_lines() {
        let wrapped = wrap_fractal_fragment("uniform float palette_shift;\n");
        assert!(wrapped.contains("uniform float palette_shift;"));
    }

    #[test]
    fn wrap_preserves_user_line_count() {
        let wrapped = wrap_fractal_fragment(DESKTOP_SHADER);
        let body = wrapped
            .split(&format!("{USER_MARKER}\n"))
            .nth(1)
            .and_then(|rest| rest.split(FOOTER).next())
            .unwrap();
        assert_eq!(body.lines().count(), DESKTOP_SHADER.lines().count());
    }

    #[test]
    fn injected_uniform_matching_looks_at_declared_names() {
        assert_eq!(strip_injected_uniforms("uniform double zoom;"), Some(String::new()));
        assert_eq!(strip_injected_uniforms("  uniform highp vec2 center[1];"), Some(String::new()));
        assert_eq!(strip_injected_uniforms("uniform float zoomed_out;"), None);
        assert_eq!(strip_injected_uniforms("uniform float palette_shift; // depends on zoom"), None);
        assert_eq!(strip_injected_uniforms("uniform float shade /* not center */;"), None);
        assert_eq!(strip_injected_uniforms("float zoom = 1.0;"), None);
    }

    #[test]
    fn mixed_declarations_keep_user_names() {
        assert_eq!(
            strip_injected_uniforms("uniform double zoom, palette_shift;"),
            Some("uniform double palette_shift;".to_string())
        );
        assert_eq!(
            strip_injected_uniforms("uniform float glow = 0.5, itr;"),
            Some("uniform float glow = 0.5;".to_string())
        );
    }

    #[test]
    fn uniform_with_commented_injected_name_still_compiles() {
        let source = "uniform float palette_shift; // depends on zoom\n\
void mainImage(out vec4 color, in vec2 frag_coord) {\n\
    color = vec4(palette_shift * zoom, 0.0, 0.0, 1.0);\n\
}\n";
        let wrapped = wrap_fractal_fragment(source);
        assert!(wrapped.contains("uniform float palette_shift;"));
        if let Err(ShaderError::Parse(message)) = validate_fragment_source(source) {
            assert!(!message.contains("Unknown variable"), "{message}");
        }
    }

    #[test]
    fn double_precision_needs_a_device_feature() {
        let source = "void mainImage(out vec4 color, in vec2 frag_coord) {\n\
    dvec2 z = dvec2(frag_coord) / double(zoom);\n\
    color = vec4(vec2(z), 0.0, 1.0);\n\
}\n";
        assert!(!DEVICE_FEATURES.contains(wgpu::Features::SHADER_F64));
        assert!(matches!(
            validate_fragment_source(source),
            Err(ShaderError::Validation(_))
        ));
    }

    #[test]
    fn validation_reports_parse_errors() {
        let err = validate_fragment_source(
            "void mainImage(out vec4 color, in vec2 frag_coord) { color = ; }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ShaderError::Parse(_)));
    }

    #[test]
    fn diagnostics_use_user_line_numbers() {
        let source = "void mainImage(out vec4 color, in vec2 frag_coord) {\n    color = ;\n}\n";
        match validate_fragment_source(source) {
            Err(ShaderError::Parse(message)) => assert!(message.contains("2:"), "{message}"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn minimal_shader_validates() {
        let source = "void mainImage(out vec4 color, in vec2 frag_coord) {\n    color = vec4(frag_coord / screen_size, C_re * zoom, float(itr));\n}\n";
        let wrapped = validate_fragment_source(source).unwrap();
        assert!(wrapped.contains("mainImage(color, frag_coord)"));
    }
}
