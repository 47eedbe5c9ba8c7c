use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use effects::math::{Rgba, Vec2};
use effects::Sampler;
use image::{GenericImageView, RgbaImage};

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Decoded image plus its pixel dimensions. Clones share the pixel buffer;
/// two handles are equal when they refer to the same decoded image.
#[derive(Clone)]
pub struct TextureHandle {
    id: u64,
    width: u32,
    height: u32,
    pixels: Arc<RgbaImage>,
}

impl TextureHandle {
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            pixels: Arc::new(image),
        }
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::from_image(RgbaImage::from_pixel(width, height, image::Rgba(color)))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    fn texel(&self, x: u32, y: u32) -> Rgba {
        Rgba::from_rgba8(self.pixels.get_pixel(x, y).0)
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextureHandle {}

impl fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureHandle")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Sampler for TextureHandle {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Bilinear filtering with clamp-to-edge addressing; `uv` (0, 0) is the
    /// top-left corner.
    fn sample(&self, uv: Vec2) -> Rgba {
        if self.width == 0 || self.height == 0 {
            return Rgba::default();
        }
        let w = self.width as f32;
        let h = self.height as f32;
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        let x = finite(uv.x * w - 0.5).clamp(0.0, w - 1.0);
        let y = finite(uv.y * h - 0.5).clamp(0.0, h - 1.0);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let top = self.texel(x0, y0).mix(self.texel(x1, y0), fx);
        let bottom = self.texel(x0, y1).mix(self.texel(x1, y1), fx);
        top.mix(bottom, fy)
    }
}

/// Turns a media reference into a ready-to-sample texture.
pub trait TextureLoader {
    fn load(&self, media: &Path) -> Result<TextureHandle>;
}

/// Loads textures from local image files through the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    max_dimension: Option<u32>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Downscales images whose longer side exceeds `max` pixels.
    pub fn with_max_dimension(max: u32) -> Self {
        Self {
            max_dimension: Some(max.max(1)),
        }
    }
}

impl TextureLoader for ImageLoader {
    fn load(&self, media: &Path) -> Result<TextureHandle> {
        let mut image = image::open(media)
            .with_context(|| format!("failed to open slide image at {}", media.display()))?;
        let (width, height) = image.dimensions();
        if let Some(max) = self.max_dimension {
            if width.max(height) > max {
                image = image.resize(max, max, image::imageops::FilterType::Triangle);
                tracing::debug!(
                    path = %media.display(),
                    from = ?(width, height),
                    to = ?image.dimensions(),
                    "downscaled slide image"
                );
            }
        }
        Ok(TextureHandle::from_image(image.to_rgba8()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTexture {
    pub slide_id: String,
    pub texture: TextureHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub slide_id: String,
    pub media: PathBuf,
    pub error: String,
}

/// Textures that loaded successfully, in slide order, plus the slides that
/// did not. Failed slides are excluded rather than retried.
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    loaded: Vec<LoadedTexture>,
    failures: Vec<LoadFailure>,
}

impl TextureSet {
    pub fn load_all<'a, I, L>(entries: I, loader: &L) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Path)>,
        L: TextureLoader + ?Sized,
    {
        let mut set = TextureSet::default();
        for (slide_id, media) in entries {
            match loader.load(media) {
                Ok(texture) => {
                    tracing::debug!(
                        slide = slide_id,
                        width = texture.width(),
                        height = texture.height(),
                        "loaded slide texture"
                    );
                    set.loaded.push(LoadedTexture {
                        slide_id: slide_id.to_string(),
                        texture,
                    });
                }
                Err(err) => {
                    tracing::warn!(slide = slide_id, error = %format!("{err:#}"), "skipping slide");
                    set.failures.push(LoadFailure {
                        slide_id: slide_id.to_string(),
                        media: media.to_path_buf(),
                        error: format!("{err:#}"),
                    });
                }
            }
        }
        set
    }

    pub fn from_loaded(loaded: Vec<LoadedTexture>) -> Self {
        Self {
            loaded,
            failures: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LoadedTexture> {
        self.loaded.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedTexture> {
        self.loaded.iter()
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    pub fn into_loaded(self) -> Vec<LoadedTexture> {
        self.loaded
    }

    /// Releases every texture reference held by the set.
    pub fn dispose(&mut self) {
        self.loaded.clear();
    }
}
