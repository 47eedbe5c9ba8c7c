use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

pub const MIN_SLIDES: usize = 2;
pub const MAX_SLIDES: usize = 20;

pub const MIN_TRANSITION: Duration = Duration::from_millis(500);
pub const MAX_TRANSITION: Duration = Duration::from_secs(5);
pub const MIN_AUTO_SLIDE: Duration = Duration::from_secs(2);
pub const MAX_AUTO_SLIDE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeckConfig {
    pub version: u32,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub effect: EffectSection,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub slides: Vec<SlideConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Timing {
    #[serde(
        default = "default_transition",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub transition: Duration,
    #[serde(
        default = "default_auto_slide",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub auto_slide: Duration,
    #[serde(default = "default_true")]
    pub auto_play: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            transition: default_transition(),
            auto_slide: default_auto_slide(),
            auto_play: true,
        }
    }
}

/// Initial effect selection. Names are checked against the effect catalog
/// by the consumer, not here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EffectSection {
    pub name: Option<String>,
    pub preset: Option<String>,
    #[serde(default)]
    pub overrides: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Display {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SlideConfig {
    pub id: String,
    pub title: String,
    pub media: PathBuf,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: SlideMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SlideMetadata {
    pub author: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_transition() -> Duration {
    Duration::from_millis(2500)
}

fn default_auto_slide() -> Duration {
    Duration::from_secs(5)
}

fn default_true() -> bool {
    true
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

impl DeckConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: DeckConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn slide(&self, id: &str) -> Option<&SlideConfig> {
        self.slides.iter().find(|slide| slide.id == id)
    }

    /// Media paths with relative entries resolved against `base`
    /// (normally the directory holding the config file).
    pub fn media_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.slides
            .iter()
            .map(|slide| {
                if slide.media.is_absolute() {
                    slide.media.clone()
                } else {
                    base.join(&slide.media)
                }
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        let count = self.slides.len();
        if !(MIN_SLIDES..=MAX_SLIDES).contains(&count) {
            return Err(ConfigError::Invalid(format!(
                "deck must contain between {MIN_SLIDES} and {MAX_SLIDES} slides, found {count}"
            )));
        }

        let mut seen = HashSet::new();
        for (index, slide) in self.slides.iter().enumerate() {
            if slide.id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "slide #{index} has an empty id"
                )));
            }
            if !seen.insert(slide.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "slide id '{}' is used more than once",
                    slide.id
                )));
            }
            if slide.title.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "slide '{}' must have a title",
                    slide.id
                )));
            }
            if slide.media.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "slide '{}' must reference a media file",
                    slide.id
                )));
            }
        }

        if !(MIN_TRANSITION..=MAX_TRANSITION).contains(&self.timing.transition) {
            return Err(ConfigError::Invalid(format!(
                "timing.transition must be between {} and {}",
                humantime::format_duration(MIN_TRANSITION),
                humantime::format_duration(MAX_TRANSITION)
            )));
        }

        if !(MIN_AUTO_SLIDE..=MAX_AUTO_SLIDE).contains(&self.timing.auto_slide) {
            return Err(ConfigError::Invalid(format!(
                "timing.auto_slide must be between {} and {}",
                humantime::format_duration(MIN_AUTO_SLIDE),
                humantime::format_duration(MAX_AUTO_SLIDE)
            )));
        }

        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::Invalid(
                "display width and height must be greater than zero".into(),
            ));
        }

        if let Some(name) = &self.effect.name {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("effect.name may not be empty".into()));
            }
        }

        Ok(())
    }
}
