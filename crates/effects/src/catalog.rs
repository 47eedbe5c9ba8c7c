//! Declarative registry of effect families: parameter bounds, defaults,
//! named presets, randomization windows and the blend function each family
//! hands to the renderer.

use crate::blend::TransitionFunction;
use crate::error::NotFoundError;
use crate::family::EffectFamily;
use crate::params::{ParamKey, ParamSpec, RandomRange};

/// Name of the sentinel preset that marks hand-tuned values.
pub const CUSTOM_PRESET: &str = "Custom";

/// Preset every family ships and falls back to when selected.
pub const DEFAULT_PRESET: &str = "Default";

const fn p(key: ParamKey, min: f32, max: f32, step: f32, default: f32) -> ParamSpec {
    ParamSpec {
        key,
        min,
        max,
        step,
        default,
    }
}

/// Bounds, step and default for every key.
pub fn spec(key: ParamKey) -> ParamSpec {
    use ParamKey::*;
    match key {
        GlobalIntensity => p(key, 0.1, 2.0, 0.1, 1.0),
        SpeedMultiplier => p(key, 0.1, 3.0, 0.1, 1.0),
        DistortionStrength => p(key, 0.1, 3.0, 0.1, 1.0),
        ColorEnhancement => p(key, 0.5, 2.0, 0.1, 1.0),

        TransitionDuration => p(key, 0.5, 5.0, 0.1, 2.5),
        AutoSlideSpeed => p(key, 2000.0, 10000.0, 500.0, 5000.0),

        GlassRefractionStrength => p(key, 0.1, 3.0, 0.1, 1.0),
        GlassChromaticAberration => p(key, 0.1, 3.0, 0.1, 1.0),
        GlassBubbleClarity => p(key, 0.1, 2.0, 0.1, 1.0),
        GlassEdgeGlow => p(key, 0.0, 2.0, 0.1, 1.0),
        GlassLiquidFlow => p(key, 0.1, 3.0, 0.1, 1.0),

        FrostIntensity => p(key, 0.5, 3.0, 0.1, 1.5),
        FrostCrystalSize => p(key, 0.3, 2.0, 0.1, 1.0),
        FrostIceCoverage => p(key, 0.1, 2.0, 0.1, 1.0),
        FrostTemperature => p(key, 0.1, 3.0, 0.1, 1.0),
        FrostTexture => p(key, 0.3, 2.0, 0.1, 1.0),

        RippleFrequency => p(key, 10.0, 50.0, 1.0, 25.0),
        RippleAmplitude => p(key, 0.02, 0.2, 0.01, 0.08),
        RippleWaveSpeed => p(key, 0.2, 3.0, 0.1, 1.0),
        RippleRippleCount => p(key, 0.1, 2.0, 0.1, 1.0),
        RippleDecay => p(key, 0.2, 2.0, 0.1, 1.0),

        PlasmaIntensity => p(key, 0.5, 3.0, 0.1, 1.2),
        PlasmaSpeed => p(key, 0.2, 2.0, 0.1, 0.8),
        PlasmaEnergyIntensity => p(key, 0.0, 1.0, 0.05, 0.4),
        PlasmaContrastBoost => p(key, 0.0, 1.0, 0.05, 0.3),
        PlasmaTurbulence => p(key, 0.1, 3.0, 0.1, 1.0),

        TimeshiftDistortion => p(key, 0.3, 3.0, 0.1, 1.6),
        TimeshiftBlur => p(key, 0.3, 3.0, 0.1, 1.5),
        TimeshiftFlow => p(key, 0.3, 3.0, 0.1, 1.4),
        TimeshiftChromatic => p(key, 0.0, 3.0, 0.1, 1.5),
        TimeshiftTurbulence => p(key, 0.3, 3.0, 0.1, 1.4),
    }
}

/// Window the randomizer samples from. Timing keys are never randomized.
pub fn random_range(key: ParamKey) -> Option<RandomRange> {
    use ParamKey::*;
    let (min, max) = match key {
        GlobalIntensity => (0.5, 2.0),
        SpeedMultiplier => (0.5, 2.0),
        DistortionStrength => (0.5, 2.0),
        ColorEnhancement => (0.7, 2.0),

        TransitionDuration | AutoSlideSpeed => return None,

        GlassRefractionStrength => (0.5, 2.0),
        GlassChromaticAberration => (0.3, 2.3),
        GlassBubbleClarity => (0.5, 2.0),
        GlassEdgeGlow => (0.0, 2.0),
        GlassLiquidFlow => (0.3, 2.8),

        FrostIntensity => (0.5, 3.0),
        FrostCrystalSize => (0.3, 2.0),
        FrostIceCoverage => (0.3, 1.8),
        FrostTemperature => (0.3, 2.5),
        FrostTexture => (0.5, 2.0),

        RippleFrequency => (10.0, 50.0),
        RippleAmplitude => (0.03, 0.18),
        RippleWaveSpeed => (0.3, 2.8),
        RippleRippleCount => (0.2, 2.0),
        RippleDecay => (0.3, 2.0),

        PlasmaIntensity => (0.6, 2.8),
        PlasmaSpeed => (0.3, 2.0),
        PlasmaEnergyIntensity => (0.0, 1.0),
        PlasmaContrastBoost => (0.0, 0.8),
        PlasmaTurbulence => (0.3, 2.8),

        TimeshiftDistortion => (0.4, 2.2),
        TimeshiftBlur => (0.4, 2.1),
        TimeshiftFlow => (0.4, 2.0),
        TimeshiftChromatic => (0.3, 2.0),
        TimeshiftTurbulence => (0.4, 2.0),
    };
    Some(RandomRange { min, max })
}

/// A named, fixed parameter vector scoped to one family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub values: &'static [(ParamKey, f32)],
}

impl Preset {
    pub fn value(&self, key: ParamKey) -> Option<f32> {
        self.values
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| *value)
    }
}

macro_rules! presets {
    ($( $name:literal => [ $( $key:ident = $value:expr ),* $(,)? ] ),* $(,)?) => {
        &[ $( Preset { name: $name, values: &[ $( (ParamKey::$key, $value) ),* ] } ),* ]
    };
}

static GLASS_PRESETS: &[Preset] = presets![
    "Subtle" => [GlassRefractionStrength = 0.6, GlassChromaticAberration = 0.5, GlassBubbleClarity = 1.3, GlassEdgeGlow = 0.7, GlassLiquidFlow = 0.8],
    "Default" => [GlassRefractionStrength = 1.0, GlassChromaticAberration = 1.0, GlassBubbleClarity = 1.0, GlassEdgeGlow = 1.0, GlassLiquidFlow = 1.0],
    "Crystal" => [GlassRefractionStrength = 1.5, GlassChromaticAberration = 1.8, GlassBubbleClarity = 0.7, GlassEdgeGlow = 1.4, GlassLiquidFlow = 0.5],
    "Liquid" => [GlassRefractionStrength = 0.8, GlassChromaticAberration = 0.4, GlassBubbleClarity = 1.2, GlassEdgeGlow = 0.8, GlassLiquidFlow = 1.8],
];

static FROST_PRESETS: &[Preset] = presets![
    "Light" => [FrostIntensity = 0.8, FrostCrystalSize = 1.3, FrostIceCoverage = 0.6, FrostTemperature = 0.7, FrostTexture = 0.8],
    "Default" => [FrostIntensity = 1.5, FrostCrystalSize = 1.0, FrostIceCoverage = 1.0, FrostTemperature = 1.0, FrostTexture = 1.0],
    "Heavy" => [FrostIntensity = 2.2, FrostCrystalSize = 0.7, FrostIceCoverage = 1.4, FrostTemperature = 1.5, FrostTexture = 1.3],
    "Arctic" => [FrostIntensity = 2.8, FrostCrystalSize = 0.5, FrostIceCoverage = 1.8, FrostTemperature = 2.0, FrostTexture = 1.6],
];

static RIPPLE_PRESETS: &[Preset] = presets![
    "Gentle" => [RippleFrequency = 15.0, RippleAmplitude = 0.05, RippleWaveSpeed = 0.7, RippleRippleCount = 0.8, RippleDecay = 1.2],
    "Default" => [RippleFrequency = 25.0, RippleAmplitude = 0.08, RippleWaveSpeed = 1.0, RippleRippleCount = 1.0, RippleDecay = 1.0],
    "Strong" => [RippleFrequency = 35.0, RippleAmplitude = 0.12, RippleWaveSpeed = 1.4, RippleRippleCount = 1.3, RippleDecay = 0.8],
    "Tsunami" => [RippleFrequency = 45.0, RippleAmplitude = 0.18, RippleWaveSpeed = 1.8, RippleRippleCount = 1.6, RippleDecay = 0.6],
];

static PLASMA_PRESETS: &[Preset] = presets![
    "Calm" => [PlasmaIntensity = 0.8, PlasmaSpeed = 0.5, PlasmaEnergyIntensity = 0.2, PlasmaContrastBoost = 0.1, PlasmaTurbulence = 0.6],
    "Default" => [PlasmaIntensity = 1.2, PlasmaSpeed = 0.8, PlasmaEnergyIntensity = 0.4, PlasmaContrastBoost = 0.3, PlasmaTurbulence = 1.0],
    "Storm" => [PlasmaIntensity = 1.8, PlasmaSpeed = 1.3, PlasmaEnergyIntensity = 0.7, PlasmaContrastBoost = 0.5, PlasmaTurbulence = 1.5],
    "Nuclear" => [PlasmaIntensity = 2.5, PlasmaSpeed = 1.8, PlasmaEnergyIntensity = 1.0, PlasmaContrastBoost = 0.8, PlasmaTurbulence = 2.0],
];

static TIMESHIFT_PRESETS: &[Preset] = presets![
    "Subtle" => [TimeshiftDistortion = 0.5, TimeshiftBlur = 0.6, TimeshiftFlow = 0.5, TimeshiftChromatic = 0.4, TimeshiftTurbulence = 0.6],
    "Default" => [TimeshiftDistortion = 1.6, TimeshiftBlur = 1.5, TimeshiftFlow = 1.4, TimeshiftChromatic = 1.5, TimeshiftTurbulence = 1.4],
    "Intense" => [TimeshiftDistortion = 2.2, TimeshiftBlur = 2.0, TimeshiftFlow = 2.0, TimeshiftChromatic = 2.2, TimeshiftTurbulence = 2.0],
    "Dreamlike" => [TimeshiftDistortion = 2.8, TimeshiftBlur = 2.5, TimeshiftFlow = 2.5, TimeshiftChromatic = 2.6, TimeshiftTurbulence = 2.5],
];

fn family_presets(family: EffectFamily) -> &'static [Preset] {
    match family {
        EffectFamily::Glass => GLASS_PRESETS,
        EffectFamily::Frost => FROST_PRESETS,
        EffectFamily::Ripple => RIPPLE_PRESETS,
        EffectFamily::Plasma => PLASMA_PRESETS,
        EffectFamily::Timeshift => TIMESHIFT_PRESETS,
    }
}

/// Preset names for one family; always ends with the `Custom` sentinel.
#[derive(Debug, Clone, Copy)]
pub struct PresetTable {
    family: EffectFamily,
    presets: &'static [Preset],
}

impl PresetTable {
    pub fn family(&self) -> EffectFamily {
        self.family
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.presets
            .iter()
            .map(|preset| preset.name)
            .chain(std::iter::once(CUSTOM_PRESET))
    }

    /// Stored presets; `Custom` has no stored values and is never returned.
    pub fn get(&self, name: &str) -> Option<&'static Preset> {
        self.presets.iter().find(|preset| preset.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        name == CUSTOM_PRESET || self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Preset> {
        self.presets.iter()
    }
}

/// Parameter schema of one family, or the shared global/timing schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub params: Vec<ParamSpec>,
}

impl Schema {
    fn from_keys(keys: &[ParamKey]) -> Self {
        Self {
            params: keys.iter().map(|key| spec(*key)).collect(),
        }
    }

    pub fn get(&self, key: ParamKey) -> Option<&ParamSpec> {
        self.params.iter().find(|spec| spec.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ParamKey> + '_ {
        self.params.iter().map(|spec| spec.key)
    }
}

/// Read-only view over the static effect tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectCatalog;

impl EffectCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn list_effects(&self) -> &'static [EffectFamily] {
        &EffectFamily::ALL
    }

    pub fn schema(&self, family: EffectFamily) -> Schema {
        Schema::from_keys(family.params())
    }

    pub fn schema_by_name(&self, family: &str) -> Result<Schema, NotFoundError> {
        Ok(self.schema(family.parse()?))
    }

    pub fn global_schema(&self) -> Schema {
        Schema::from_keys(&ParamKey::GLOBALS)
    }

    pub fn timing_schema(&self) -> Schema {
        Schema::from_keys(&ParamKey::TIMING)
    }

    pub fn spec(&self, key: ParamKey) -> ParamSpec {
        spec(key)
    }

    pub fn presets(&self, family: EffectFamily) -> PresetTable {
        PresetTable {
            family,
            presets: family_presets(family),
        }
    }

    pub fn presets_by_name(&self, family: &str) -> Result<PresetTable, NotFoundError> {
        Ok(self.presets(family.parse()?))
    }

    pub fn preset(&self, family: EffectFamily, name: &str) -> Result<&'static Preset, NotFoundError> {
        self.presets(family)
            .get(name)
            .ok_or_else(|| NotFoundError::Preset {
                effect: family,
                preset: name.to_string(),
            })
    }

    pub fn transition_function(&self, family: EffectFamily) -> TransitionFunction {
        TransitionFunction::for_family(family)
    }
}
