use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "slidewall",
    author,
    version,
    about = "Shader transition slideshow",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the slideshow headlessly, reading navigation commands from stdin.
    Run(RunArgs),
    /// List every effect family with its parameters and presets.
    Effects(EffectsArgs),
    /// Render one transition frame between two images to a PNG.
    Render(RenderArgs),
    /// Print a randomized effect configuration as JSON.
    Randomize(RandomizeArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Deck configuration; defaults to `deck.toml` in the config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Stop after this long (e.g. `30s`, `2m`); runs until `quit` otherwise.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Frames per second of the render loop.
    #[arg(long, value_name = "FPS", default_value_t = 30.0, value_parser = parse_fps)]
    pub fps: f32,

    /// Override the render resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Seed for the `random` command.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Rasterize frames on the CPU and write every Nth one into this directory.
    #[arg(long, value_name = "DIR")]
    pub frames: Option<PathBuf>,

    /// Keep every Nth frame when `--frames` is set.
    #[arg(long, value_name = "N", default_value_t = 1, requires = "frames")]
    pub frame_stride: u64,

    /// Downscale slide images whose longer side exceeds this many pixels.
    #[arg(long, value_name = "PIXELS")]
    pub max_texture: Option<u32>,

    /// Ignore the saved effect configuration and use the deck's.
    #[arg(long)]
    pub fresh: bool,
}

#[derive(Args, Debug)]
pub struct EffectsArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Image shown at progress 0.
    #[arg(long, value_name = "IMAGE")]
    pub from: PathBuf,

    /// Image shown at progress 1.
    #[arg(long, value_name = "IMAGE")]
    pub to: PathBuf,

    /// Effect family (glass, frost, ripple, plasma, timeshift).
    #[arg(long, value_name = "NAME", default_value = "glass")]
    pub effect: String,

    /// Preset of the chosen family.
    #[arg(long, value_name = "NAME", default_value = "Default")]
    pub preset: String,

    /// Parameter override as `key=value`; repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub overrides: Vec<(String, f32)>,

    /// Transition progress in `0..=1`.
    #[arg(long, value_name = "X", value_parser = parse_progress)]
    pub progress: f32,

    /// Output resolution.
    #[arg(long, value_name = "WIDTHxHEIGHT", default_value = "960x540", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Output PNG path.
    #[arg(long, value_name = "FILE")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct RandomizeArgs {
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{w}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err("size must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err("duration must be non-negative".into());
        }
        return Ok(Duration::from_secs_f64(seconds));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid fps '{value}'"))?;
    if !fps.is_finite() || fps <= 0.0 || fps > 240.0 {
        return Err("fps must be in (0, 240]".into());
    }
    Ok(fps)
}

fn parse_progress(value: &str) -> Result<f32, String> {
    let progress: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid progress '{value}'"))?;
    if !(0.0..=1.0).contains(&progress) {
        return Err("progress must be between 0 and 1".into());
    }
    Ok(progress)
}

pub fn parse_assignment(value: &str) -> Result<(String, f32), String> {
    let (key, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("parameter name must not be empty".into());
    }
    let parsed = raw
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid value '{}' for {key}", raw.trim()))?;
    Ok((key.to_string(), parsed))
}
