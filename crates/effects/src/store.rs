use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, EffectCatalog, Preset, CUSTOM_PRESET, DEFAULT_PRESET};
use crate::error::{NotFoundError, ParamError};
use crate::family::EffectFamily;
use crate::params::{ParamKey, ParamSpec, ParamValues};

/// Snapshot of the live effect configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectConfig {
    pub current_effect: EffectFamily,
    pub current_preset: String,
    pub values: ParamValues,
}

impl EffectConfig {
    pub fn defaults() -> Self {
        Self {
            current_effect: EffectFamily::Glass,
            current_preset: DEFAULT_PRESET.to_string(),
            values: ParamValues::defaults(),
        }
    }

    pub fn get(&self, key: ParamKey) -> f32 {
        self.values.get(key)
    }

    /// Global values followed by the active family's values.
    pub fn active_values(&self) -> Vec<(ParamKey, f32)> {
        ParamKey::GLOBALS
            .iter()
            .chain(self.current_effect.params())
            .map(|key| (*key, self.get(*key)))
            .collect()
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    pub key: ParamKey,
    pub old: f32,
    pub new: f32,
}

/// Change notifications published to every subscriber of a [`ParameterStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    ParametersChanged(Vec<ParamChange>),
    EffectChanged {
        previous: EffectFamily,
        current: EffectFamily,
    },
    PresetChanged {
        effect: EffectFamily,
        preset: String,
    },
    /// Every value may have changed (defaults restored or a saved state loaded).
    Reset,
}

/// Owner of the effect configuration. All writes go through this API so
/// bounds, preset tracking and notifications stay consistent.
#[derive(Debug)]
pub struct ParameterStore {
    config: EffectConfig,
    catalog: EffectCatalog,
    dirty: bool,
    observers: Vec<Sender<StoreEvent>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            config: EffectConfig::defaults(),
            catalog: EffectCatalog::new(),
            dirty: false,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.observers.push(tx);
        rx
    }

    pub fn get(&self, key: ParamKey) -> f32 {
        self.config.get(key)
    }

    pub fn get_by_name(&self, name: &str) -> Result<f32, ParamError> {
        Ok(self.get(name.parse()?))
    }

    pub fn current_effect(&self) -> EffectFamily {
        self.config.current_effect
    }

    pub fn current_preset(&self) -> &str {
        &self.config.current_preset
    }

    pub fn limits(&self, key: ParamKey) -> ParamSpec {
        catalog::spec(key)
    }

    /// Copy of the configuration; later mutations never show through it.
    pub fn get_all(&self) -> EffectConfig {
        self.config.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn set(&mut self, key: ParamKey, value: f32) -> Result<(), ParamError> {
        self.set_many([(key, value)])
    }

    pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<(), ParamError> {
        let key = name.parse()?;
        self.set(key, value)
    }

    /// Validates the whole patch before touching anything; the first
    /// out-of-bounds entry fails the call with no partial mutation.
    pub fn set_many<I>(&mut self, patch: I) -> Result<(), ParamError>
    where
        I: IntoIterator<Item = (ParamKey, f32)>,
    {
        let patch: Vec<(ParamKey, f32)> = patch.into_iter().collect();
        for (key, value) in &patch {
            catalog::spec(*key).validate(*value)?;
        }

        let diverged = patch
            .iter()
            .any(|(key, value)| self.diverges_from_preset(*key, *value));
        let changes = self.write_values(&patch);
        if changes.is_empty() {
            return Ok(());
        }

        self.dirty = true;
        self.emit(StoreEvent::ParametersChanged(changes));
        if diverged {
            self.mark_custom();
        }
        Ok(())
    }

    pub fn apply_preset(&mut self, family: EffectFamily, name: &str) -> Result<(), NotFoundError> {
        let table = self.catalog.presets(family);
        if !table.contains(name) {
            return Err(NotFoundError::Preset {
                effect: family,
                preset: name.to_string(),
            });
        }
        self.install_preset(family, table.get(name), name);
        Ok(())
    }

    pub fn apply_preset_by_name(&mut self, family: &str, name: &str) -> Result<(), NotFoundError> {
        self.apply_preset(family.parse()?, name)
    }

    /// Switches the active family and loads its `Default` preset.
    pub fn set_effect(&mut self, family: EffectFamily) {
        let preset = self.catalog.presets(family).get(DEFAULT_PRESET);
        self.install_preset(family, preset, DEFAULT_PRESET);
    }

    pub fn reset_to_defaults(&mut self) {
        self.config = EffectConfig::defaults();
        self.dirty = true;
        self.emit(StoreEvent::Reset);
    }

    /// Replaces the configuration with a previously saved snapshot.
    pub fn restore(&mut self, config: EffectConfig) -> Result<(), ParamError> {
        for (key, value) in config.values.iter() {
            catalog::spec(key).validate(value)?;
        }
        if !self
            .catalog
            .presets(config.current_effect)
            .contains(&config.current_preset)
        {
            return Err(NotFoundError::Preset {
                effect: config.current_effect,
                preset: config.current_preset,
            }
            .into());
        }
        self.config = config;
        self.dirty = false;
        self.emit(StoreEvent::Reset);
        Ok(())
    }

    /// Installs a randomized vector. Values are clamped to their schema
    /// bounds whatever the sampling window produced.
    pub(crate) fn apply_randomized(&mut self, family: EffectFamily, values: &[(ParamKey, f32)]) {
        let clamped: Vec<(ParamKey, f32)> = values
            .iter()
            .map(|(key, value)| (*key, catalog::spec(*key).clamp(*value)))
            .collect();
        self.switch_effect(family);
        let changes = self.write_values(&clamped);
        self.dirty = true;
        if !changes.is_empty() {
            self.emit(StoreEvent::ParametersChanged(changes));
        }
        self.mark_custom();
    }

    fn install_preset(&mut self, family: EffectFamily, preset: Option<&Preset>, name: &str) {
        self.switch_effect(family);
        let changes = preset
            .map(|preset| self.write_values(preset.values))
            .unwrap_or_default();
        self.config.current_preset = name.to_string();
        self.dirty = true;
        tracing::debug!(effect = %family, preset = name, changed = changes.len(), "applied preset");
        if !changes.is_empty() {
            self.emit(StoreEvent::ParametersChanged(changes));
        }
        self.emit(StoreEvent::PresetChanged {
            effect: family,
            preset: name.to_string(),
        });
    }

    fn switch_effect(&mut self, family: EffectFamily) {
        let previous = self.config.current_effect;
        if previous == family {
            return;
        }
        self.config.current_effect = family;
        self.dirty = true;
        self.emit(StoreEvent::EffectChanged {
            previous,
            current: family,
        });
    }

    fn diverges_from_preset(&self, key: ParamKey, value: f32) -> bool {
        if key.family().is_none() || self.config.current_preset == CUSTOM_PRESET {
            return false;
        }
        match self
            .catalog
            .preset(self.config.current_effect, &self.config.current_preset)
        {
            Ok(preset) => preset.value(key) != Some(value),
            Err(_) => true,
        }
    }

    fn mark_custom(&mut self) {
        if self.config.current_preset == CUSTOM_PRESET {
            return;
        }
        self.config.current_preset = CUSTOM_PRESET.to_string();
        self.emit(StoreEvent::PresetChanged {
            effect: self.config.current_effect,
            preset: CUSTOM_PRESET.to_string(),
        });
    }

    fn write_values(&mut self, patch: &[(ParamKey, f32)]) -> Vec<ParamChange> {
        let mut changes = Vec::new();
        for (key, value) in patch {
            let old = self.config.values.get(*key);
            if old != *value {
                self.config.values.set(*key, *value);
                changes.push(ParamChange {
                    key: *key,
                    old,
                    new: *value,
                });
            }
        }
        changes
    }

    fn emit(&mut self, event: StoreEvent) {
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &Receiver<StoreEvent>) -> Vec<StoreEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn set_accepts_exactly_the_schema_range() {
        for key in ParamKey::ALL {
            let spec = catalog::spec(key);
            let mut store = ParameterStore::new();
            assert!(store.set(key, spec.min).is_ok(), "{key} min");
            assert!(store.set(key, spec.max).is_ok(), "{key} max");

            let before = store.get(key);
            let below = spec.min - spec.step;
            assert!(matches!(
                store.set(key, below),
                Err(ParamError::Validation { .. })
            ));
            let above = spec.max + spec.step;
            assert!(store.set(key, above).is_err());
            assert!(store.set(key, f32::NAN).is_err());
            assert_eq!(store.get(key), before, "{key} changed after rejection");
        }
    }

    #[test]
    fn ripple_frequency_below_minimum_is_rejected() {
        let mut store = ParameterStore::new();
        store.set(ParamKey::RippleFrequency, 30.0).unwrap();
        let err = store.set(ParamKey::RippleFrequency, 5.0).unwrap_err();
        assert_eq!(
            err,
            ParamError::Validation {
                key: ParamKey::RippleFrequency,
                value: 5.0,
                min: 10.0,
                max: 50.0,
            }
        );
        assert_eq!(store.get(ParamKey::RippleFrequency), 30.0);
        assert!(err.to_string().contains("rippleFrequency"));
    }

    #[test]
    fn set_many_is_atomic() {
        let mut store = ParameterStore::new();
        let before = store.get_all();
        let result = store.set_many([
            (ParamKey::GlobalIntensity, 1.5),
            (ParamKey::FrostIntensity, 2.0),
            (ParamKey::RippleAmplitude, 0.5),
        ]);
        assert!(result.is_err());
        assert_eq!(store.get_all(), before);
        assert!(!store.is_dirty());
    }

    #[test]
    fn arctic_preset_installs_documented_values() {
        let mut store = ParameterStore::new();
        store.apply_preset(EffectFamily::Frost, "Arctic").unwrap();
        assert_eq!(store.get(ParamKey::FrostIntensity), 2.8);
        assert_eq!(store.current_preset(), "Arctic");
        assert_eq!(store.current_effect(), EffectFamily::Frost);
    }

    #[test]
    fn every_preset_round_trips_through_get_all() {
        let catalog = EffectCatalog::new();
        for family in EffectFamily::ALL {
            for preset in catalog.presets(family).iter() {
                let mut store = ParameterStore::new();
                store.apply_preset(family, preset.name).unwrap();
                let snapshot = store.get_all();
                for (key, value) in preset.values {
                    assert_eq!(snapshot.get(*key), *value);
                }
                assert_eq!(snapshot.current_preset, preset.name);
            }
        }
    }

    #[test]
    fn unknown_preset_is_not_found() {
        let mut store = ParameterStore::new();
        let err = store.apply_preset(EffectFamily::Glass, "Arctic").unwrap_err();
        assert!(matches!(err, NotFoundError::Preset { .. }));
        assert!(matches!(
            store.apply_preset_by_name("smoke", "Default"),
            Err(NotFoundError::Effect(_))
        ));
        assert_eq!(store.current_preset(), DEFAULT_PRESET);
    }

    #[test]
    fn custom_preset_keeps_values() {
        let mut store = ParameterStore::new();
        store.apply_preset(EffectFamily::Ripple, "Strong").unwrap();
        store.apply_preset(EffectFamily::Ripple, CUSTOM_PRESET).unwrap();
        assert_eq!(store.current_preset(), CUSTOM_PRESET);
        assert_eq!(store.get(ParamKey::RippleFrequency), 35.0);
    }

    #[test]
    fn diverging_family_edit_marks_custom() {
        let mut store = ParameterStore::new();
        store.apply_preset(EffectFamily::Frost, "Heavy").unwrap();
        store.set(ParamKey::FrostIntensity, 2.2).unwrap();
        assert_eq!(store.current_preset(), "Heavy");

        store.set(ParamKey::FrostIntensity, 2.3).unwrap();
        assert_eq!(store.current_preset(), CUSTOM_PRESET);
    }

    #[test]
    fn global_and_timing_edits_keep_preset() {
        let mut store = ParameterStore::new();
        store.apply_preset(EffectFamily::Plasma, "Storm").unwrap();
        store.set(ParamKey::GlobalIntensity, 1.7).unwrap();
        store.set(ParamKey::TransitionDuration, 1.0).unwrap();
        store.set(ParamKey::AutoSlideSpeed, 8000.0).unwrap();
        assert_eq!(store.current_preset(), "Storm");
    }

    #[test]
    fn set_effect_loads_default_preset() {
        let mut store = ParameterStore::new();
        store.set(ParamKey::TimeshiftBlur, 2.9).unwrap();
        store.set_effect(EffectFamily::Timeshift);
        assert_eq!(store.current_effect(), EffectFamily::Timeshift);
        assert_eq!(store.current_preset(), DEFAULT_PRESET);
        assert_eq!(store.get(ParamKey::TimeshiftBlur), 1.5);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut store = ParameterStore::new();
        let mut snapshot = store.get_all();
        snapshot.values.set(ParamKey::GlassEdgeGlow, 0.0);
        snapshot.current_preset = "Hacked".into();
        assert_eq!(store.get(ParamKey::GlassEdgeGlow), 1.0);
        assert_eq!(store.current_preset(), DEFAULT_PRESET);

        store.set(ParamKey::GlassEdgeGlow, 1.5).unwrap();
        assert_eq!(snapshot.get(ParamKey::GlassEdgeGlow), 0.0);
    }

    #[test]
    fn notifications_carry_old_and_new_values() {
        let mut store = ParameterStore::new();
        let rx = store.subscribe();
        store.set(ParamKey::GlassEdgeGlow, 1.5).unwrap();
        let events = drain(&rx);
        assert_eq!(
            events,
            vec![
                StoreEvent::ParametersChanged(vec![ParamChange {
                    key: ParamKey::GlassEdgeGlow,
                    old: 1.0,
                    new: 1.5,
                }]),
                StoreEvent::PresetChanged {
                    effect: EffectFamily::Glass,
                    preset: CUSTOM_PRESET.into(),
                },
            ]
        );

        store.set(ParamKey::GlassEdgeGlow, 1.5).unwrap();
        assert!(drain(&rx).is_empty(), "unchanged value must not notify");
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut store = ParameterStore::new();
        let rx = store.subscribe();
        drop(rx);
        store.set(ParamKey::SpeedMultiplier, 2.0).unwrap();
        assert!(store.observers.is_empty());
    }

    #[test]
    fn restore_validates_snapshot() {
        let mut store = ParameterStore::new();
        let mut saved = EffectConfig::defaults();
        saved.current_effect = EffectFamily::Ripple;
        saved.current_preset = "Tsunami".into();
        saved.values.set(ParamKey::RippleFrequency, 45.0);
        store.restore(saved.clone()).unwrap();
        assert_eq!(store.get_all(), saved);
        assert!(!store.is_dirty());

        let mut broken = saved;
        broken.values.set(ParamKey::RippleFrequency, 99.0);
        assert!(store.restore(broken).is_err());
        assert_eq!(store.get(ParamKey::RippleFrequency), 45.0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = ParameterStore::new();
        store.apply_preset(EffectFamily::Plasma, "Nuclear").unwrap();
        store.reset_to_defaults();
        assert_eq!(store.get_all(), EffectConfig::defaults());
        assert!(store.is_dirty());
        store.mark_saved();
        assert!(!store.is_dirty());
    }
}
