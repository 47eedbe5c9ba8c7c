use effects::ParameterStore;
use renderer::FrameUniforms;

use crate::engine::TransitionEngine;

/// Assembles the per-frame uniform set from the store and the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformBridge {
    resolution: [f32; 2],
}

impl UniformBridge {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.resolution = [width as f32, height as f32];
    }

    pub fn resolution(&self) -> [f32; 2] {
        self.resolution
    }

    /// `None` until the engine has textures to show.
    pub fn frame(&self, store: &ParameterStore, engine: &TransitionEngine) -> Option<FrameUniforms> {
        let texture1 = engine.from_texture()?.clone();
        let texture2 = engine.to_texture()?.clone();
        let config = store.get_all();
        Some(FrameUniforms {
            progress: engine.progress(),
            effect: config.current_effect,
            values: config.values,
            texture1,
            texture2,
            resolution: self.resolution,
        })
    }
}
