//! CPU reference renderer.
//!
//! Evaluates the active family's blend for every output pixel with the same
//! values the GPU block carries. Output pixel `(x, y)` samples at
//! `((x + 0.5) / width, (y + 0.5) / height)`, with row zero at the top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use effects::math::Vec2;
use effects::{BlendInput, TransitionFunction};
use image::RgbaImage;

use crate::frame::FrameRenderer;
use crate::uniforms::FrameUniforms;

pub fn render_image(frame: &FrameUniforms) -> RgbaImage {
    let width = frame.resolution[0].max(1.0) as u32;
    let height = frame.resolution[1].max(1.0) as u32;
    let resolution = Vec2::new(width as f32, height as f32);
    let function = TransitionFunction::for_family(frame.effect);
    let input = BlendInput {
        from: &frame.texture1,
        to: &frame.texture2,
        resolution,
        values: &frame.values,
    };

    RgbaImage::from_fn(width, height, |x, y| {
        let uv = Vec2::new(
            (x as f32 + 0.5) / resolution.x,
            (y as f32 + 0.5) / resolution.y,
        );
        image::Rgba(function.evaluate(&input, uv, frame.progress).to_rgba8())
    })
}

pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write frame to {}", path.display()))
}

/// Frame renderer that rasterizes on the CPU and optionally writes every
/// `stride`-th frame as a numbered PNG.
#[derive(Debug)]
pub struct ReferenceRenderer {
    output_dir: Option<PathBuf>,
    stride: u64,
    frames: u64,
    last: Option<RgbaImage>,
}

impl ReferenceRenderer {
    pub fn new() -> Self {
        Self {
            output_dir: None,
            stride: 1,
            frames: 0,
            last: None,
        }
    }

    pub fn with_output(dir: impl Into<PathBuf>, stride: u64) -> Self {
        Self {
            output_dir: Some(dir.into()),
            stride: stride.max(1),
            ..Self::new()
        }
    }

    pub fn last_image(&self) -> Option<&RgbaImage> {
        self.last.as_ref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Default for ReferenceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRenderer for ReferenceRenderer {
    fn render_frame(&mut self, frame: &FrameUniforms) -> Result<()> {
        let image = render_image(frame);
        if let Some(dir) = &self.output_dir {
            if self.frames % self.stride == 0 {
                let path = dir.join(format!("frame-{:06}.png", self.frames));
                save_png(&image, &path)?;
                tracing::debug!(path = %path.display(), progress = frame.progress, "wrote frame");
            }
        }
        self.last = Some(image);
        self.frames += 1;
        Ok(())
    }
}
