use anyhow::Result;

use crate::uniforms::{FrameUniforms, UniformBlock};

/// Draws one frame from the uniforms the slider publishes.
pub trait FrameRenderer {
    fn render_frame(&mut self, frame: &FrameUniforms) -> Result<()>;
}

/// Renderer without a surface. Packs the uniform block each frame exactly as
/// a GPU backend would upload it and keeps the latest one for inspection.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    last: Option<UniformBlock>,
    last_textures: Option<(u64, u64)>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn last_block(&self) -> Option<&UniformBlock> {
        self.last.as_ref()
    }

    /// Ids of the textures bound for the latest frame.
    pub fn last_textures(&self) -> Option<(u64, u64)> {
        self.last_textures
    }
}

impl FrameRenderer for HeadlessRenderer {
    fn render_frame(&mut self, frame: &FrameUniforms) -> Result<()> {
        let block = UniformBlock::from_frame(frame);
        let textures = (frame.texture1.id(), frame.texture2.id());
        if self.last_textures != Some(textures) {
            tracing::debug!(
                texture1 = textures.0,
                texture2 = textures.1,
                effect = %frame.effect,
                "rebinding slide textures"
            );
        }
        self.last = Some(block);
        self.last_textures = Some(textures);
        self.frames += 1;
        Ok(())
    }
}
