//! Effect families, their parameter schemas and presets, the live
//! parameter store, and the per-pixel transition functions.

mod blend;
mod catalog;
mod error;
mod family;
pub mod math;
mod params;
mod randomizer;
pub mod shader;
mod store;

pub use blend::{cover_uv, BlendInput, Sampler, TransitionFunction, CLEANUP_TAIL_START};
pub use catalog::{
    random_range, spec, EffectCatalog, Preset, PresetTable, Schema, CUSTOM_PRESET, DEFAULT_PRESET,
};
pub use error::{NotFoundError, ParamError};
pub use family::EffectFamily;
pub use params::{ParamGroup, ParamKey, ParamSpec, ParamValues, RandomRange};
pub use randomizer::Randomizer;
pub use store::{EffectConfig, ParamChange, ParameterStore, StoreEvent};
