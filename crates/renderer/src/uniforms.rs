use bytemuck::{Pod, Zeroable};
use effects::shader::{param_location, PARAM_VEC4_COUNT};
use effects::{EffectFamily, ParamKey, ParamValues};

use crate::texture::TextureHandle;

/// Everything the renderer consumes for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUniforms {
    pub progress: f32,
    pub effect: EffectFamily,
    pub values: ParamValues,
    pub texture1: TextureHandle,
    pub texture2: TextureHandle,
    pub resolution: [f32; 2],
}

impl FrameUniforms {
    pub fn selector(&self) -> i32 {
        self.effect.selector()
    }

    pub fn texture1_size(&self) -> [f32; 2] {
        self.texture1.size()
    }

    pub fn texture2_size(&self) -> [f32; 2] {
        self.texture2.size()
    }

    pub fn global_params(&self) -> [(ParamKey, f32); 4] {
        ParamKey::GLOBALS.map(|key| (key, self.values.get(key)))
    }

    /// Parameters of the active family, in schema order.
    pub fn family_params(&self) -> Vec<(ParamKey, f32)> {
        self.effect
            .params()
            .iter()
            .map(|&key| (key, self.values.get(key)))
            .collect()
    }
}

/// std140 image of the `SlideParams` block in `transition.frag`.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformBlock {
    pub resolution: [f32; 2],
    pub texture1_size: [f32; 2],
    pub texture2_size: [f32; 2],
    pub progress: f32,
    pub effect_type: i32,
    pub params: [[f32; 4]; PARAM_VEC4_COUNT],
}

unsafe impl Zeroable for UniformBlock {}
unsafe impl Pod for UniformBlock {}

const _: () = assert!(std::mem::size_of::<UniformBlock>() == 32 + 16 * PARAM_VEC4_COUNT);

impl UniformBlock {
    pub fn from_frame(frame: &FrameUniforms) -> Self {
        let mut params = [[0.0; 4]; PARAM_VEC4_COUNT];
        for (key, value) in frame.values.iter() {
            if let Some((vec, component)) = param_location(key) {
                params[vec][component] = value;
            }
        }
        Self {
            resolution: frame.resolution,
            texture1_size: frame.texture1_size(),
            texture2_size: frame.texture2_size(),
            progress: frame.progress.clamp(0.0, 1.0),
            effect_type: frame.selector(),
            params,
        }
    }

    pub fn param(&self, key: ParamKey) -> Option<f32> {
        param_location(key).map(|(vec, component)| self.params[vec][component])
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(effect: EffectFamily, progress: f32) -> FrameUniforms {
        FrameUniforms {
            progress,
            effect,
            values: ParamValues::defaults(),
            texture1: TextureHandle::solid(640, 480, [0, 0, 0, 255]),
            texture2: TextureHandle::solid(300, 900, [255, 255, 255, 255]),
            resolution: [1920.0, 1080.0],
        }
    }

    #[test]
    fn block_matches_std140_layout() {
        assert_eq!(std::mem::size_of::<UniformBlock>(), 160);
        assert_eq!(std::mem::align_of::<UniformBlock>(), 16);
        let block = UniformBlock::from_frame(&frame(EffectFamily::Ripple, 0.25));
        let bytes = block.as_bytes();
        assert_eq!(bytes.len(), 160);
        assert_eq!(&bytes[24..28], &0.25f32.to_ne_bytes());
        assert_eq!(&bytes[28..32], &2i32.to_ne_bytes());
    }

    #[test]
    fn packs_sizes_selector_and_parameters() {
        let frame = frame(EffectFamily::Frost, 0.5);
        let block = UniformBlock::from_frame(&frame);
        assert_eq!(block.texture1_size, [640.0, 480.0]);
        assert_eq!(block.texture2_size, [300.0, 900.0]);
        assert_eq!(block.effect_type, EffectFamily::Frost.selector());
        for key in ParamKey::ALL {
            match key.shader_slot() {
                Some(_) => assert_eq!(block.param(key), Some(frame.values.get(key)), "{key}"),
                None => assert_eq!(block.param(key), None, "{key}"),
            }
        }
    }

    #[test]
    fn progress_is_clamped_into_unit_range() {
        assert_eq!(UniformBlock::from_frame(&frame(EffectFamily::Glass, 1.7)).progress, 1.0);
        assert_eq!(UniformBlock::from_frame(&frame(EffectFamily::Glass, -0.2)).progress, 0.0);
    }

    #[test]
    fn family_params_follow_the_active_effect() {
        let frame = frame(EffectFamily::Plasma, 0.0);
        let keys: Vec<_> = frame.family_params().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, EffectFamily::Plasma.params());
        assert_eq!(frame.global_params().len(), 4);
    }
}
