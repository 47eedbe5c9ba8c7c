use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use effects::{EffectConfig, EffectFamily, ParamKey, ParamValues};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub last_slide: Option<String>,
    pub effect: Option<SavedEffect>,
}

/// Last tuned effect configuration, keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEffect {
    pub name: String,
    pub preset: String,
    #[serde(default)]
    pub values: BTreeMap<String, f32>,
}

impl SavedEffect {
    pub fn from_config(config: &EffectConfig) -> Self {
        Self {
            name: config.current_effect.name().to_string(),
            preset: config.current_preset.clone(),
            values: config
                .values
                .iter()
                .map(|(key, value)| (key.name().to_string(), value))
                .collect(),
        }
    }

    /// Parameters missing from the file keep their defaults.
    pub fn to_config(&self) -> Result<EffectConfig> {
        let current_effect: EffectFamily = self
            .name
            .parse()
            .with_context(|| format!("saved effect '{}' is not a known family", self.name))?;
        let mut values = BTreeMap::new();
        for (name, value) in &self.values {
            let key: ParamKey = name
                .parse()
                .with_context(|| format!("saved parameter '{name}' is not recognised"))?;
            values.insert(key, *value);
        }
        Ok(EffectConfig {
            current_effect,
            current_preset: self.preset.clone(),
            values: ParamValues::from(values),
        })
    }
}

impl AppState {
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read state file at {}", path.display()))?;
            let state: Self = toml::from_str(&contents)
                .with_context(|| format!("failed to parse state file at {}", path.display()))?;
            Ok(state)
        } else {
            Ok(Self::default())
        }
    }

    pub fn persist(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("state path has no parent: {}", path.display()))?;
        fs::create_dir_all(dir).with_context(|| {
            format!(
                "failed to prepare directory for state file at {}",
                dir.display()
            )
        })?;
        let serialized = toml::to_string_pretty(self)
            .with_context(|| "failed to serialize state file to TOML".to_string())?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write state file to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effects::ParameterStore;
    use tempfile::TempDir;

    #[test]
    fn persists_and_restores_effect_configuration() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("nested/state.toml");

        let mut store = ParameterStore::new();
        store.apply_preset(EffectFamily::Ripple, "Tsunami").ok();
        store.set(ParamKey::RippleFrequency, 30.0).unwrap();
        let config = store.get_all();

        let state = AppState {
            last_slide: Some("ethereal-glow".into()),
            effect: Some(SavedEffect::from_config(&config)),
        };
        state.persist(&path).unwrap();

        let loaded = AppState::load_or_default(&path).unwrap();
        assert_eq!(loaded, state);
        let restored = loaded.effect.unwrap().to_config().unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn missing_file_yields_default_state() {
        let root = TempDir::new().unwrap();
        let state = AppState::load_or_default(&root.path().join("state.toml")).unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn unknown_parameter_is_reported() {
        let saved = SavedEffect {
            name: "glass".into(),
            preset: "Custom".into(),
            values: BTreeMap::from([("glassSparkle".to_string(), 1.0)]),
        };
        let err = saved.to_config().unwrap_err();
        assert!(format!("{err:#}").contains("glassSparkle"));
    }
}
