use crate::family::EffectFamily;
use crate::params::ParamKey;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotFoundError {
    #[error("effect '{0}' not found")]
    Effect(String),
    #[error("preset '{preset}' not found for effect '{effect}'")]
    Preset { effect: EffectFamily, preset: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("invalid value {value} for {key}: expected {min}..={max}")]
    Validation {
        key: ParamKey,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}
