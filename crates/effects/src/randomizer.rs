use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::{self, EffectCatalog};
use crate::family::EffectFamily;
use crate::params::ParamKey;
use crate::store::ParameterStore;

/// Picks a random family and samples its parameters plus the globals from
/// the randomization windows. Seeded construction makes runs reproducible.
pub struct Randomizer {
    rng: StdRng,
    catalog: EffectCatalog,
}

impl Randomizer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            catalog: EffectCatalog::new(),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            catalog: EffectCatalog::new(),
        }
    }

    /// Replaces the store's effect with a random family and values and
    /// marks the preset `Custom`. Returns the chosen family.
    pub fn randomize(&mut self, store: &mut ParameterStore) -> EffectFamily {
        let effects = self.catalog.list_effects();
        let family = effects[self.rng.gen_range(0..effects.len())];

        let values: Vec<(ParamKey, f32)> = ParamKey::GLOBALS
            .iter()
            .chain(family.params())
            .map(|key| (*key, self.sample(*key)))
            .collect();

        tracing::debug!(effect = %family, "randomized effect parameters");
        store.apply_randomized(family, &values);
        family
    }

    fn sample(&mut self, key: ParamKey) -> f32 {
        let spec = catalog::spec(key);
        let Some(range) = catalog::random_range(key) else {
            return spec.default;
        };
        let lo = range.min.max(spec.min);
        let hi = range.max.min(spec.max);
        let value = if lo >= hi {
            lo
        } else {
            self.rng.gen_range(lo..=hi)
        };
        spec.clamp(value)
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::catalog::CUSTOM_PRESET;

    #[test]
    fn randomized_values_stay_in_schema_bounds() {
        let mut randomizer = Randomizer::new(7);
        let mut store = ParameterStore::new();
        for _ in 0..200 {
            let family = randomizer.randomize(&mut store);
            assert_eq!(store.current_effect(), family);
            assert_eq!(store.current_preset(), CUSTOM_PRESET);
            for key in ParamKey::ALL {
                let spec = catalog::spec(key);
                assert!(spec.contains(store.get(key)), "{key} = {}", store.get(key));
            }
        }
    }

    #[test]
    fn samples_come_from_randomization_windows() {
        let mut randomizer = Randomizer::new(11);
        let mut store = ParameterStore::new();
        for _ in 0..100 {
            let family = randomizer.randomize(&mut store);
            for key in ParamKey::GLOBALS.iter().chain(family.params()) {
                let range = catalog::random_range(*key).unwrap();
                let value = store.get(*key);
                assert!(value >= range.min && value <= range.max, "{key} = {value}");
            }
        }
    }

    #[test]
    fn timing_is_left_alone() {
        let mut randomizer = Randomizer::new(3);
        let mut store = ParameterStore::new();
        store.set(ParamKey::TransitionDuration, 1.2).unwrap();
        randomizer.randomize(&mut store);
        assert_eq!(store.get(ParamKey::TransitionDuration), 1.2);
        assert_eq!(store.get(ParamKey::AutoSlideSpeed), 5000.0);
    }

    #[test]
    fn same_seed_reproduces_sequence() {
        let mut a = Randomizer::new(42);
        let mut b = Randomizer::new(42);
        let mut store_a = ParameterStore::new();
        let mut store_b = ParameterStore::new();
        for _ in 0..10 {
            assert_eq!(a.randomize(&mut store_a), b.randomize(&mut store_b));
            assert_eq!(store_a.get_all(), store_b.get_all());
        }
    }

    #[test]
    fn every_family_gets_picked() {
        let mut randomizer = Randomizer::new(5);
        let mut store = ParameterStore::new();
        let picked: HashSet<_> = (0..200).map(|_| randomizer.randomize(&mut store)).collect();
        assert_eq!(picked.len(), EffectFamily::ALL.len());
    }
}
