use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "fracview",
    author,
    version,
    about = "Live Julia set viewer with a hot-reloaded fragment shader"
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Configuration file; defaults to `fracview/config.toml` in the user config directory.
    #[arg(long, value_name = "FILE", env = "FRACVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fragment shader to render and watch for changes.
    #[arg(long, value_name = "FILE")]
    pub shader: Option<PathBuf>,

    /// Image drawn on the overlay quad.
    #[arg(long, value_name = "FILE", conflicts_with = "no_overlay")]
    pub overlay: Option<PathBuf>,

    /// Do not draw the overlay quad.
    #[arg(long)]
    pub no_overlay: bool,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Keep drawing the last good shader when an edit fails to compile.
    #[arg(long)]
    pub keep_previous: bool,

    /// Present without waiting for vertical blank.
    #[arg(long)]
    pub no_vsync: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a fractal shader without opening a window.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Shader file to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1280x720".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in size specification '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in size specification '{trimmed}'"))?;

    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_surface_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_surface_size(" 800 X 600 "), Ok((800, 600)));
        assert!(parse_surface_size("0x600").is_err());
        assert!(parse_surface_size("800").is_err());
        assert!(parse_surface_size("wide x tall").is_err());
    }

    #[test]
    fn check_subcommand_takes_a_file() {
        let cli = Cli::try_parse_from(["fracview", "check", "shaders/fractal.glsl"]).unwrap();
        match cli.command {
            Some(Command::Check(args)) => {
                assert_eq!(args.file, PathBuf::from("shaders/fractal.glsl"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn overlay_flags_conflict() {
        let result = Cli::try_parse_from([
            "fracview",
            "--overlay",
            "banner.png",
            "--no-overlay",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "fracview",
            "--shader",
            "julia.glsl",
            "--size",
            "1024x768",
            "--keep-previous",
            "--no-vsync",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.shader, Some(PathBuf::from("julia.glsl")));
        assert_eq!(cli.run.size, Some((1024, 768)));
        assert!(cli.run.keep_previous);
        assert!(cli.run.no_vsync);
    }
}
