//! GLSL sources for the GPU path and the slot layout they expect.
//!
//! The fragment shader reads every parameter out of a `vec4 params[N]`
//! array inside a std140 block; `#define` aliases give each slot its
//! `u`-prefixed uniform name.

use crate::params::ParamKey;

pub const FRAGMENT_SHADER: &str = include_str!("../shaders/transition.frag");
pub const VERTEX_SHADER: &str = include_str!("../shaders/fullscreen.vert");

/// Number of `vec4`s reserved for parameters in the uniform block.
pub const PARAM_VEC4_COUNT: usize = 8;

const COMPONENTS: [char; 4] = ['x', 'y', 'z', 'w'];

/// `(vec4 index, component index)` a key is packed into, or `None` for
/// keys that never reach the GPU.
pub fn param_location(key: ParamKey) -> Option<(usize, usize)> {
    key.shader_slot().map(|slot| (slot / 4, slot % 4))
}

/// The `#define` line the fragment shader carries for `key`.
pub fn param_define(key: ParamKey) -> Option<String> {
    let (vec, component) = param_location(key)?;
    Some(format!(
        "#define {} ubo.params[{vec}].{}",
        key.uniform_name(),
        COMPONENTS[component]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_gpu_parameter_is_aliased() {
        for key in ParamKey::ALL {
            match param_define(key) {
                Some(define) => assert!(FRAGMENT_SHADER.contains(&define), "missing `{define}`"),
                None => assert!(!FRAGMENT_SHADER.contains(&key.uniform_name())),
            }
        }
    }

    #[test]
    fn slots_fit_the_block() {
        for key in ParamKey::ALL {
            if let Some((vec, _)) = param_location(key) {
                assert!(vec < PARAM_VEC4_COUNT, "{key}");
            }
        }
        assert!(FRAGMENT_SHADER.contains(&format!("vec4 params[{PARAM_VEC4_COUNT}]")));
    }

    #[test]
    fn fragment_declares_every_family_entry() {
        for family in crate::EffectFamily::ALL {
            let function = crate::TransitionFunction::for_family(family);
            assert!(FRAGMENT_SHADER.contains(&format!("vec4 {}(", function.glsl_entry)));
            assert!(FRAGMENT_SHADER.contains(&format!("uEffectType == {}", function.selector))
                || function.selector == 4);
        }
        assert!(VERTEX_SHADER.contains("gl_VertexIndex"));
    }
}
