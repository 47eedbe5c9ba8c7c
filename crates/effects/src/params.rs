use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::family::EffectFamily;

/// Every tunable value the slider knows about.
///
/// Serialized names match the control panel field names (`glassEdgeGlow`,
/// `rippleFrequency`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamKey {
    GlobalIntensity,
    SpeedMultiplier,
    DistortionStrength,
    ColorEnhancement,

    TransitionDuration,
    AutoSlideSpeed,

    GlassRefractionStrength,
    GlassChromaticAberration,
    GlassBubbleClarity,
    GlassEdgeGlow,
    GlassLiquidFlow,

    FrostIntensity,
    FrostCrystalSize,
    FrostIceCoverage,
    FrostTemperature,
    FrostTexture,

    RippleFrequency,
    RippleAmplitude,
    RippleWaveSpeed,
    RippleRippleCount,
    RippleDecay,

    PlasmaIntensity,
    PlasmaSpeed,
    PlasmaEnergyIntensity,
    PlasmaContrastBoost,
    PlasmaTurbulence,

    TimeshiftDistortion,
    TimeshiftBlur,
    TimeshiftFlow,
    TimeshiftChromatic,
    TimeshiftTurbulence,
}

/// Which part of the configuration a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamGroup {
    /// Shared by every family (intensity, speed, distortion, color).
    Global,
    /// Transition duration and auto-advance interval.
    Timing,
    Family(EffectFamily),
}

impl ParamKey {
    pub const COUNT: usize = 31;

    pub const ALL: [ParamKey; Self::COUNT] = [
        ParamKey::GlobalIntensity,
        ParamKey::SpeedMultiplier,
        ParamKey::DistortionStrength,
        ParamKey::ColorEnhancement,
        ParamKey::TransitionDuration,
        ParamKey::AutoSlideSpeed,
        ParamKey::GlassRefractionStrength,
        ParamKey::GlassChromaticAberration,
        ParamKey::GlassBubbleClarity,
        ParamKey::GlassEdgeGlow,
        ParamKey::GlassLiquidFlow,
        ParamKey::FrostIntensity,
        ParamKey::FrostCrystalSize,
        ParamKey::FrostIceCoverage,
        ParamKey::FrostTemperature,
        ParamKey::FrostTexture,
        ParamKey::RippleFrequency,
        ParamKey::RippleAmplitude,
        ParamKey::RippleWaveSpeed,
        ParamKey::RippleRippleCount,
        ParamKey::RippleDecay,
        ParamKey::PlasmaIntensity,
        ParamKey::PlasmaSpeed,
        ParamKey::PlasmaEnergyIntensity,
        ParamKey::PlasmaContrastBoost,
        ParamKey::PlasmaTurbulence,
        ParamKey::TimeshiftDistortion,
        ParamKey::TimeshiftBlur,
        ParamKey::TimeshiftFlow,
        ParamKey::TimeshiftChromatic,
        ParamKey::TimeshiftTurbulence,
    ];

    pub const GLOBALS: [ParamKey; 4] = [
        ParamKey::GlobalIntensity,
        ParamKey::SpeedMultiplier,
        ParamKey::DistortionStrength,
        ParamKey::ColorEnhancement,
    ];

    pub const TIMING: [ParamKey; 2] = [ParamKey::TransitionDuration, ParamKey::AutoSlideSpeed];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamKey::GlobalIntensity => "globalIntensity",
            ParamKey::SpeedMultiplier => "speedMultiplier",
            ParamKey::DistortionStrength => "distortionStrength",
            ParamKey::ColorEnhancement => "colorEnhancement",
            ParamKey::TransitionDuration => "transitionDuration",
            ParamKey::AutoSlideSpeed => "autoSlideSpeed",
            ParamKey::GlassRefractionStrength => "glassRefractionStrength",
            ParamKey::GlassChromaticAberration => "glassChromaticAberration",
            ParamKey::GlassBubbleClarity => "glassBubbleClarity",
            ParamKey::GlassEdgeGlow => "glassEdgeGlow",
            ParamKey::GlassLiquidFlow => "glassLiquidFlow",
            ParamKey::FrostIntensity => "frostIntensity",
            ParamKey::FrostCrystalSize => "frostCrystalSize",
            ParamKey::FrostIceCoverage => "frostIceCoverage",
            ParamKey::FrostTemperature => "frostTemperature",
            ParamKey::FrostTexture => "frostTexture",
            ParamKey::RippleFrequency => "rippleFrequency",
            ParamKey::RippleAmplitude => "rippleAmplitude",
            ParamKey::RippleWaveSpeed => "rippleWaveSpeed",
            ParamKey::RippleRippleCount => "rippleRippleCount",
            ParamKey::RippleDecay => "rippleDecay",
            ParamKey::PlasmaIntensity => "plasmaIntensity",
            ParamKey::PlasmaSpeed => "plasmaSpeed",
            ParamKey::PlasmaEnergyIntensity => "plasmaEnergyIntensity",
            ParamKey::PlasmaContrastBoost => "plasmaContrastBoost",
            ParamKey::PlasmaTurbulence => "plasmaTurbulence",
            ParamKey::TimeshiftDistortion => "timeshiftDistortion",
            ParamKey::TimeshiftBlur => "timeshiftBlur",
            ParamKey::TimeshiftFlow => "timeshiftFlow",
            ParamKey::TimeshiftChromatic => "timeshiftChromatic",
            ParamKey::TimeshiftTurbulence => "timeshiftTurbulence",
        }
    }

    pub fn group(self) -> ParamGroup {
        let index = self.index();
        match index {
            0..=3 => ParamGroup::Global,
            4 | 5 => ParamGroup::Timing,
            _ => ParamGroup::Family(EffectFamily::ALL[(index - 6) / 5]),
        }
    }

    pub fn family(self) -> Option<EffectFamily> {
        match self.group() {
            ParamGroup::Family(family) => Some(family),
            _ => None,
        }
    }

    /// Slot in the shader parameter array; timing keys never reach the GPU.
    pub fn shader_slot(self) -> Option<usize> {
        match self.group() {
            ParamGroup::Global => Some(self.index()),
            ParamGroup::Timing => None,
            ParamGroup::Family(_) => Some(self.index() - 2),
        }
    }

    /// GLSL name the shader aliases onto its parameter slot (`uGlassEdgeGlow`).
    pub fn uniform_name(self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("u{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamKey {
    type Err = ParamError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParamError::UnknownParameter(value.to_string()))
    }
}

/// Schema entry for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub key: ParamKey,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

impl ParamSpec {
    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    pub fn validate(&self, value: f32) -> Result<f32, ParamError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ParamError::Validation {
                key: self.key,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Sampling window used by the randomizer, distinct from the schema bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomRange {
    pub min: f32,
    pub max: f32,
}

/// Flat value table indexed by [`ParamKey::index`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<ParamKey, f32>",
    into = "BTreeMap<ParamKey, f32>"
)]
pub struct ParamValues([f32; ParamKey::COUNT]);

impl ParamValues {
    pub fn defaults() -> Self {
        let mut values = [0.0; ParamKey::COUNT];
        for key in ParamKey::ALL {
            values[key.index()] = crate::catalog::spec(key).default;
        }
        Self(values)
    }

    pub fn get(&self, key: ParamKey) -> f32 {
        self.0[key.index()]
    }

    pub(crate) fn set(&mut self, key: ParamKey, value: f32) {
        self.0[key.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamKey, f32)> + '_ {
        ParamKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }
}

impl Default for ParamValues {
    fn default() -> Self {
        Self::defaults()
    }
}

impl From<BTreeMap<ParamKey, f32>> for ParamValues {
    /// Keys missing from the map keep their schema default.
    fn from(map: BTreeMap<ParamKey, f32>) -> Self {
        let mut values = Self::defaults();
        for (key, value) in map {
            values.set(key, value);
        }
        values
    }
}

impl From<ParamValues> for BTreeMap<ParamKey, f32> {
    fn from(values: ParamValues) -> Self {
        values.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_declaration_order() {
        for (index, key) in ParamKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), index);
        }
    }

    #[test]
    fn groups_partition_keys() {
        assert_eq!(ParamKey::ColorEnhancement.group(), ParamGroup::Global);
        assert_eq!(ParamKey::AutoSlideSpeed.group(), ParamGroup::Timing);
        assert_eq!(
            ParamKey::GlassLiquidFlow.family(),
            Some(EffectFamily::Glass)
        );
        assert_eq!(ParamKey::FrostIntensity.family(), Some(EffectFamily::Frost));
        assert_eq!(
            ParamKey::TimeshiftTurbulence.family(),
            Some(EffectFamily::Timeshift)
        );
        for family in EffectFamily::ALL {
            for key in family.params() {
                assert_eq!(key.family(), Some(family));
            }
        }
    }

    #[test]
    fn shader_slots_are_dense() {
        let slots: Vec<usize> = ParamKey::ALL
            .iter()
            .filter_map(|key| key.shader_slot())
            .collect();
        assert_eq!(slots, (0..29).collect::<Vec<_>>());
    }

    #[test]
    fn uniform_names_are_prefixed() {
        assert_eq!(ParamKey::GlassEdgeGlow.uniform_name(), "uGlassEdgeGlow");
        assert_eq!(
            ParamKey::GlobalIntensity.uniform_name(),
            "uGlobalIntensity"
        );
    }

    #[test]
    fn parses_control_panel_names() {
        assert_eq!(
            "rippleFrequency".parse::<ParamKey>().unwrap(),
            ParamKey::RippleFrequency
        );
        assert!(matches!(
            "rippleFreq".parse::<ParamKey>(),
            Err(ParamError::UnknownParameter(_))
        ));
    }

    #[test]
    fn serializes_values_by_name() {
        let values = ParamValues::defaults();
        let json = serde_json::to_value(values).unwrap();
        assert_eq!(json["frostIntensity"], serde_json::json!(1.5));
        let back: ParamValues = serde_json::from_value(json).unwrap();
        assert_eq!(back, values);
    }
}
