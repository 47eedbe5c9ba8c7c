use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotFoundError;
use crate::params::ParamKey;

/// The five transition algorithms multiplexed behind the slide material.
///
/// The declaration order is the catalog order: it drives the integer
/// selector handed to the shader and the index space used by the randomizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectFamily {
    Glass,
    Frost,
    Ripple,
    Plasma,
    Timeshift,
}

impl EffectFamily {
    pub const ALL: [EffectFamily; 5] = [
        EffectFamily::Glass,
        EffectFamily::Frost,
        EffectFamily::Ripple,
        EffectFamily::Plasma,
        EffectFamily::Timeshift,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectFamily::Glass => "glass",
            EffectFamily::Frost => "frost",
            EffectFamily::Ripple => "ripple",
            EffectFamily::Plasma => "plasma",
            EffectFamily::Timeshift => "timeshift",
        }
    }

    /// Integer written to `uEffectType`.
    pub fn selector(self) -> i32 {
        match self {
            EffectFamily::Glass => 0,
            EffectFamily::Frost => 1,
            EffectFamily::Ripple => 2,
            EffectFamily::Plasma => 3,
            EffectFamily::Timeshift => 4,
        }
    }

    pub fn from_selector(selector: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.selector() == selector)
    }

    /// Family-specific tunables, in display order.
    pub fn params(self) -> &'static [ParamKey] {
        match self {
            EffectFamily::Glass => &[
                ParamKey::GlassRefractionStrength,
                ParamKey::GlassChromaticAberration,
                ParamKey::GlassBubbleClarity,
                ParamKey::GlassEdgeGlow,
                ParamKey::GlassLiquidFlow,
            ],
            EffectFamily::Frost => &[
                ParamKey::FrostIntensity,
                ParamKey::FrostCrystalSize,
                ParamKey::FrostIceCoverage,
                ParamKey::FrostTemperature,
                ParamKey::FrostTexture,
            ],
            EffectFamily::Ripple => &[
                ParamKey::RippleFrequency,
                ParamKey::RippleAmplitude,
                ParamKey::RippleWaveSpeed,
                ParamKey::RippleRippleCount,
                ParamKey::RippleDecay,
            ],
            EffectFamily::Plasma => &[
                ParamKey::PlasmaIntensity,
                ParamKey::PlasmaSpeed,
                ParamKey::PlasmaEnergyIntensity,
                ParamKey::PlasmaContrastBoost,
                ParamKey::PlasmaTurbulence,
            ],
            EffectFamily::Timeshift => &[
                ParamKey::TimeshiftDistortion,
                ParamKey::TimeshiftBlur,
                ParamKey::TimeshiftFlow,
                ParamKey::TimeshiftChromatic,
                ParamKey::TimeshiftTurbulence,
            ],
        }
    }
}

impl fmt::Display for EffectFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectFamily {
    type Err = NotFoundError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|family| family.name() == normalized)
            .ok_or_else(|| NotFoundError::Effect(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_follow_catalog_order() {
        for (index, family) in EffectFamily::ALL.iter().enumerate() {
            assert_eq!(family.selector(), index as i32);
            assert_eq!(EffectFamily::from_selector(index as i32), Some(*family));
        }
        assert_eq!(EffectFamily::from_selector(9), None);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Frost".parse::<EffectFamily>().unwrap(), EffectFamily::Frost);
        assert_eq!(
            " timeshift ".parse::<EffectFamily>().unwrap(),
            EffectFamily::Timeshift
        );
        let err = "smoke".parse::<EffectFamily>().unwrap_err();
        assert_eq!(err, NotFoundError::Effect("smoke".into()));
    }
}
